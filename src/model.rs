//! Core record types shared by every pipeline stage
//!
//! Every value here is produced once by one stage and handed forward by value.
//! Nothing is mutated after construction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of fixed calendar bins per year
pub const WEEKS_PER_YEAR: u8 = 52;

/// One observation record after loading and normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Source record id (`gbifID` when present, otherwise row order)
    pub record_id: u64,
    /// Species-level scientific name
    pub species: String,
    pub family: String,
    pub genus: String,
    pub date: NaiveDate,
    /// Region code as read (e.g. `stateProvince`)
    pub region: String,
    pub flowering: bool,
}

/// Species identity and join results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub scientific_name: String,
    pub family: String,
    pub genus: String,
    pub native: bool,
    pub common_name: Option<String>,
}

impl Species {
    /// "Scientific name (Common name)" or just the scientific name
    pub fn display_name(&self) -> String {
        crate::names::vernacular::get_display_name(
            &self.scientific_name,
            self.common_name.as_deref(),
        )
    }
}

/// Flowering and total observation counts for one calendar bin, all years summed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyBin {
    /// Week of year in 1..=52
    pub week: u8,
    pub flowering: u32,
    pub total: u32,
}

/// Ordinal abundance class
///
/// Declaration order is the report order (most to least observed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbundanceCategory {
    CtCommon,
    CtUncommon,
    CtRare,
    NeOnly,
    NeRare,
}

impl AbundanceCategory {
    pub const ALL: [AbundanceCategory; 5] = [
        AbundanceCategory::CtCommon,
        AbundanceCategory::CtUncommon,
        AbundanceCategory::CtRare,
        AbundanceCategory::NeOnly,
        AbundanceCategory::NeRare,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AbundanceCategory::CtCommon => "ct_common",
            AbundanceCategory::CtUncommon => "ct_uncommon",
            AbundanceCategory::CtRare => "ct_rare",
            AbundanceCategory::NeOnly => "ne_only",
            AbundanceCategory::NeRare => "ne_rare",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AbundanceCategory::CtCommon => "Common in region",
            AbundanceCategory::CtUncommon => "Uncommon in region",
            AbundanceCategory::CtRare => "Rare in region",
            AbundanceCategory::NeOnly => "Outside region only",
            AbundanceCategory::NeRare => "Rare outside region only",
        }
    }
}

/// How much flowering data backs a species' phenology
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataQualityTier {
    Solid,
    Light,
    PointsOnly,
}

impl DataQualityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataQualityTier::Solid => "solid",
            DataQualityTier::Light => "light",
            DataQualityTier::PointsOnly => "points-only",
        }
    }
}

/// Per-species flowering statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhenologySummary {
    /// Flowering-weighted mean week
    pub peak_week: f64,
    pub window_start_week: f64,
    pub window_end_week: f64,
    pub earliest_date: NaiveDate,
    pub earliest_record_id: u64,
    pub total_flowering_obs: u32,
    pub narrow_region_obs: u32,
    pub tier: DataQualityTier,
    /// Flowering recorded at both ends of the year; the window is computed on
    /// a linear week axis and may overstate the duration.
    pub spans_year_boundary: bool,
}

/// Observation counts in the two geographic scopes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeCounts {
    pub narrow: u32,
    pub broad: u32,
}

/// Fully resolved species row handed to the planner and renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub species: Species,
    pub category: AbundanceCategory,
    pub counts: ScopeCounts,
    pub total_obs: u32,
    /// Non-empty weeks only, ascending
    pub bins: Vec<WeeklyBin>,
    pub phenology: Option<PhenologySummary>,
}

impl SpeciesRecord {
    pub fn name(&self) -> &str {
        &self.species.scientific_name
    }

    /// Flowering counts expanded to all 52 weeks (index 0 = week 1)
    pub fn flowering_by_week(&self) -> [u32; WEEKS_PER_YEAR as usize] {
        let mut out = [0u32; WEEKS_PER_YEAR as usize];
        for bin in &self.bins {
            if (1..=WEEKS_PER_YEAR).contains(&bin.week) {
                out[(bin.week - 1) as usize] += bin.flowering;
            }
        }
        out
    }
}

/// A species record whose phenology is known to be present
///
/// Ridge and rare-table pages carry this type so renderers never see a
/// missing peak week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhenologyEntry {
    pub record: SpeciesRecord,
    pub summary: PhenologySummary,
}

impl PhenologyEntry {
    pub fn from_record(record: &SpeciesRecord) -> Option<Self> {
        record.phenology.clone().map(|summary| PhenologyEntry {
            record: record.clone(),
            summary,
        })
    }
}
