//! Flowering phenology
//!
//! - `flowering`: annotation parsing
//! - `weeks`: fixed 52-bin calendar
//! - `bins`: per-species weekly aggregation
//! - `stats`: peak week, duration window, quality tier

pub mod bins;
pub mod flowering;
pub mod stats;
pub mod weeks;

pub use bins::build_weekly_bins;
pub use flowering::is_flowering;
pub use stats::{earliest_flowering, peak_week, percentile_window, quality_tier, summarize};
pub use weeks::{week_label, week_of_year};
