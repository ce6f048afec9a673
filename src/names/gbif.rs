//! GBIF species API client
//!
//! Resolves a scientific name to a backbone key, then fetches its vernacular
//! names and keeps the preferred-language ones.

use super::vernacular::pick_first_alphabetical;
use super::CommonNameLookup;
use crate::config::CommonNameConfig;
use crate::error::LookupError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str = concat!("phenology-report/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpeciesMatch {
    usage_key: Option<u64>,
    match_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VernacularPage {
    #[serde(default)]
    results: Vec<VernacularName>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VernacularName {
    vernacular_name: String,
    language: Option<String>,
}

/// Blocking GBIF client
pub struct GbifNameClient {
    http_client: reqwest::blocking::Client,
    base_url: String,
    language: String,
}

impl GbifNameClient {
    pub fn new(config: &CommonNameConfig) -> Result<Self, LookupError> {
        let http_client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
        })
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, LookupError> {
        tracing::debug!(url = %url, "Querying GBIF species API");

        let response = self
            .http_client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().unwrap_or_default();
            return Err(LookupError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .map_err(|e| LookupError::Parse(e.to_string()))
    }

    fn match_key(&self, scientific_name: &str) -> Result<Option<u64>, LookupError> {
        let url = format!("{}/species/match", self.base_url);
        let matched: SpeciesMatch =
            self.get_json(&url, &[("name", scientific_name), ("strict", "true")])?;

        if matched.match_type.as_deref() == Some("NONE") {
            return Ok(None);
        }
        Ok(matched.usage_key)
    }
}

impl CommonNameLookup for GbifNameClient {
    fn lookup(&self, scientific_name: &str) -> Result<Option<String>, LookupError> {
        let Some(key) = self.match_key(scientific_name)? else {
            return Ok(None);
        };

        let url = format!("{}/species/{}/vernacularNames", self.base_url, key);
        let page: VernacularPage = self.get_json(&url, &[("limit", "200")])?;

        Ok(preferred_name(&page.results, &self.language))
    }
}

/// First alphabetical name in the preferred language
fn preferred_name(names: &[VernacularName], language: &str) -> Option<String> {
    pick_first_alphabetical(
        names
            .iter()
            .filter(|n| {
                n.language
                    .as_deref()
                    .map_or(false, |l| l.eq_ignore_ascii_case(language))
            })
            .map(|n| n.vernacular_name.as_str()),
    )
}
