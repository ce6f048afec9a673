//! Run configuration
//!
//! Every threshold, page size and column name the pipeline uses lives here and
//! is passed down explicitly. Loaded from JSON; any omitted field takes its
//! default.

use crate::error::ConfigError;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub date_range: DateRange,
    pub regions: RegionScopes,
    pub thresholds: AbundanceThresholds,
    pub page_sizes: PageSizes,
    pub window: PercentileWindow,
    pub quality: QualityThresholds,
    pub columns: ColumnMapping,
    pub checklist: ChecklistColumns,
    pub flowering: FloweringVocabulary,
    pub common_names: CommonNameConfig,
}

impl PipelineConfig {
    /// Load configuration from a JSON file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: PipelineConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.date_range.validate()?;
        self.regions.validate()?;
        self.thresholds.validate()?;
        self.window.validate()?;
        self.quality.validate()?;
        Ok(())
    }
}

/// Inclusive observation date window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for DateRange {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(2100, 12, 31).unwrap_or(NaiveDate::MAX),
        }
    }
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.start > self.end {
            return Err(ConfigError::DateRange {
                start: self.start.to_string(),
                end: self.end.to_string(),
            });
        }
        Ok(())
    }
}

/// Region codes for the narrow (focal) and broad (surrounding) scopes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionScopes {
    pub narrow: Vec<String>,
    pub broad: Vec<String>,
}

impl Default for RegionScopes {
    fn default() -> Self {
        Self {
            narrow: vec!["Connecticut".to_string()],
            broad: [
                "Connecticut",
                "Maine",
                "Massachusetts",
                "New Hampshire",
                "Rhode Island",
                "Vermont",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl RegionScopes {
    pub fn is_narrow(&self, region: &str) -> bool {
        contains_code(&self.narrow, region)
    }

    pub fn is_broad(&self, region: &str) -> bool {
        contains_code(&self.broad, region)
    }

    /// Region falls in either scope
    pub fn is_retained(&self, region: &str) -> bool {
        self.is_narrow(region) || self.is_broad(region)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.narrow.is_empty() && self.broad.is_empty() {
            return Err(ConfigError::NoRegions);
        }
        Ok(())
    }
}

fn contains_code(codes: &[String], region: &str) -> bool {
    let region = region.trim();
    codes.iter().any(|c| c.trim().eq_ignore_ascii_case(region))
}

/// Upper bounds for the abundance classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbundanceThresholds {
    /// Narrow-region counts in 1..=rare_max are `ct_rare`
    pub rare_max: u32,
    /// Narrow-region counts above this are `ct_common`
    pub uncommon_max: u32,
    /// Broad-only counts in 1..=ne_rare_max are `ne_rare`
    pub ne_rare_max: u32,
}

impl Default for AbundanceThresholds {
    fn default() -> Self {
        Self {
            rare_max: 10,
            uncommon_max: 50,
            ne_rare_max: 10,
        }
    }
}

impl AbundanceThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rare_max >= self.uncommon_max {
            return Err(ConfigError::ThresholdOrder {
                rare_max: self.rare_max,
                uncommon_max: self.uncommon_max,
            });
        }
        Ok(())
    }
}

/// Species (or rows) per page for each output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSizes {
    pub bar_chart: usize,
    pub ridge: usize,
    pub rare_table: usize,
    pub abundance_table: usize,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            bar_chart: 9,
            ridge: 25,
            rare_table: 40,
            abundance_table: 40,
        }
    }
}

/// Percentile bounds of the duration window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileWindow {
    pub lower: f64,
    pub upper: f64,
}

impl Default for PercentileWindow {
    fn default() -> Self {
        Self {
            lower: 10.0,
            upper: 90.0,
        }
    }
}

impl PercentileWindow {
    fn validate(&self) -> Result<(), ConfigError> {
        let ok = self.lower >= 0.0 && self.upper <= 100.0 && self.lower < self.upper;
        if !ok {
            return Err(ConfigError::WindowBounds {
                lower: self.lower,
                upper: self.upper,
            });
        }
        Ok(())
    }
}

/// Minimum flowering observations per data-quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityThresholds {
    pub light_min: u32,
    pub solid_min: u32,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            light_min: 5,
            solid_min: 15,
        }
    }
}

impl QualityThresholds {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.light_min == 0 || self.light_min > self.solid_min {
            return Err(ConfigError::QualityTiers {
                light_min: self.light_min,
                solid_min: self.solid_min,
            });
        }
        Ok(())
    }
}

/// Occurrence table column names (Darwin Core terms by default)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub record_id: String,
    pub scientific_name: String,
    pub species: String,
    pub family: String,
    pub event_date: String,
    pub year: String,
    pub month: String,
    pub day: String,
    pub region: String,
    pub annotation: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            record_id: "gbifID".to_string(),
            scientific_name: "scientificName".to_string(),
            species: "species".to_string(),
            family: "family".to_string(),
            event_date: "eventDate".to_string(),
            year: "year".to_string(),
            month: "month".to_string(),
            day: "day".to_string(),
            region: "stateProvince".to_string(),
            annotation: "reproductiveCondition".to_string(),
        }
    }
}

/// Native checklist column names and the code marking native rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecklistColumns {
    pub name: String,
    pub status: String,
    pub native_code: String,
}

impl Default for ChecklistColumns {
    fn default() -> Self {
        Self {
            name: "scientific_name".to_string(),
            status: "status".to_string(),
            native_code: "N".to_string(),
        }
    }
}

/// Tokens that mark an annotation as flowering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloweringVocabulary {
    pub include: Vec<String>,
    /// Checked first; a match here means not flowering
    pub exclude: Vec<String>,
}

impl Default for FloweringVocabulary {
    fn default() -> Self {
        Self {
            include: ["flowering", "flower budding", "flower buds", "flowers"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude: ["no flowers", "not flowering", "no evidence of flowering"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Optional common-name lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonNameConfig {
    pub enabled: bool,
    pub cache_path: Option<PathBuf>,
    pub base_url: String,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub timeout_secs: u64,
    /// Vernacular language code preferred by the lookup
    pub language: String,
}

impl Default for CommonNameConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cache_path: None,
            base_url: "https://api.gbif.org/v1".to_string(),
            max_attempts: 3,
            retry_delay_ms: 500,
            timeout_secs: 20,
            language: "eng".to_string(),
        }
    }
}
