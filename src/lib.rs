//! Flowering Phenology Report
//!
//! Batch pipeline turning citizen-science occurrence records into paged
//! flowering-phenology reports for a focal region.
//!
//! Module layout:
//! - `data`: Occurrence and checklist loading with Polars
//! - `taxonomy`: Species-level name normalization
//! - `phenology`: Flowering detection, weekly bins, peak/window statistics
//! - `abundance`: Narrow/broad scope counts and abundance classes
//! - `native`: Checklist join
//! - `names`: Optional common-name lookup with a persistent cache
//! - `pagination`: Page plans for the four report products
//! - `report`: Markdown and JSON renderers
//! - `pipeline`: Stage orchestration and run summary

pub mod abundance;
pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod names;
pub mod native;
pub mod pagination;
pub mod phenology;
pub mod pipeline;
pub mod report;
pub mod taxonomy;
pub mod utils;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use error::{ConfigError, LookupError};
pub use model::{
    AbundanceCategory, DataQualityTier, Occurrence, PhenologyEntry, PhenologySummary, Species,
    SpeciesRecord, WeeklyBin,
};
pub use pagination::{Page, ReportPages};
pub use pipeline::{analyze, plan_report, run, Analysis, RunPaths, RunSummary};
pub use report::OutputFormat;
