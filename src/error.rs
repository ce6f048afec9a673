//! Typed errors for configuration validation and common-name lookups
//!
//! Loader and pipeline failures use `anyhow` with context; these enums cover
//! the cases callers match on.

use thiserror::Error;

/// Invalid run configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("rare_max ({rare_max}) must be below uncommon_max ({uncommon_max})")]
    ThresholdOrder { rare_max: u32, uncommon_max: u32 },

    #[error("percentile window must satisfy 0 <= lower < upper <= 100 (got {lower}..{upper})")]
    WindowBounds { lower: f64, upper: f64 },

    #[error("quality tiers must satisfy 0 < light_min <= solid_min (got {light_min}/{solid_min})")]
    QualityTiers { light_min: u32, solid_min: u32 },

    #[error("date range start {start} is after end {end}")]
    DateRange { start: String, end: String },

    #[error("no narrow or broad region codes configured")]
    NoRegions,
}

/// Common-name lookup failure for one species
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}
