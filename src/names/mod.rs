//! Common-name resolution
//!
//! Optional. The cache is consulted before any lookup, each success is
//! written to the cache at once, and a failed lookup only leaves the name
//! blank.

pub mod cache;
pub mod gbif;
pub mod vernacular;

pub use cache::NameCache;
pub use gbif::GbifNameClient;

use crate::config::CommonNameConfig;
use crate::error::LookupError;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::thread;
use std::time::Duration;

/// A source of common names
pub trait CommonNameLookup {
    /// `Ok(None)` when the service knows no common name
    fn lookup(&self, scientific_name: &str) -> Result<Option<String>, LookupError>;
}

/// Outcome counts for one resolution pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NameReport {
    pub from_cache: usize,
    pub resolved: usize,
    pub not_found: usize,
    /// Species whose lookup failed after every attempt, sorted
    pub failed: Vec<String>,
}

/// Resolve common names for every species, cache first
///
/// Returns scientific name → common name for the species that have one.
pub fn resolve_common_names<'a, I>(
    species: I,
    cache: &mut NameCache,
    lookup: &dyn CommonNameLookup,
    config: &CommonNameConfig,
) -> (FxHashMap<String, String>, NameReport)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut names = FxHashMap::default();
    let mut report = NameReport::default();

    for name in species {
        if let Some(cached) = cache.get(name) {
            names.insert(name.to_string(), cached.to_string());
            report.from_cache += 1;
            continue;
        }

        match lookup_with_retry(name, lookup, config) {
            Ok(Some(common)) => {
                if let Err(e) = cache.insert(name, &common) {
                    tracing::warn!("Could not cache common name for {}: {:#}", name, e);
                }
                names.insert(name.to_string(), common);
                report.resolved += 1;
            }
            Ok(None) => {
                tracing::debug!("No common name for {}", name);
                report.not_found += 1;
            }
            Err(e) => {
                tracing::warn!("Common name lookup failed for {}: {}", name, e);
                report.failed.push(name.to_string());
            }
        }
    }

    report.failed.sort();
    tracing::info!(
        from_cache = report.from_cache,
        resolved = report.resolved,
        not_found = report.not_found,
        failed = report.failed.len(),
        "Common names resolved"
    );
    (names, report)
}

fn lookup_with_retry(
    name: &str,
    lookup: &dyn CommonNameLookup,
    config: &CommonNameConfig,
) -> Result<Option<String>, LookupError> {
    let attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match lookup.lookup(name) {
            Ok(found) => return Ok(found),
            Err(e) if attempt < attempts => {
                tracing::debug!("Lookup attempt {}/{} for {} failed: {}", attempt, attempts, name, e);
                if config.retry_delay_ms > 0 {
                    thread::sleep(Duration::from_millis(config.retry_delay_ms));
                }
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
