//! Abundance classification
//!
//! Counts observations per species in the narrow and broad scopes and maps
//! the pair onto five ordinal classes.

use crate::config::{AbundanceThresholds, RegionScopes};
use crate::model::{AbundanceCategory, Occurrence, ScopeCounts};
use rustc_hash::FxHashMap;

/// Result of classifying one (narrow, broad) count pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Classified(AbundanceCategory),
    /// No observations in either scope; excluded from every output
    Unclassified,
}

impl Classification {
    pub fn category(&self) -> Option<AbundanceCategory> {
        match self {
            Classification::Classified(category) => Some(*category),
            Classification::Unclassified => None,
        }
    }
}

/// Classify a species from its narrow-region count `c` and broad-region count `n`
///
/// | Condition                         | Class        |
/// |-----------------------------------|--------------|
/// | c > uncommon_max                  | ct_common    |
/// | rare_max < c <= uncommon_max      | ct_uncommon  |
/// | 1 <= c <= rare_max                | ct_rare      |
/// | c = 0, n > ne_rare_max            | ne_only      |
/// | c = 0, 1 <= n <= ne_rare_max      | ne_rare      |
/// | c = 0, n = 0                      | unclassified |
pub fn classify(c: u32, n: u32, thresholds: &AbundanceThresholds) -> Classification {
    use AbundanceCategory::*;

    let category = match c {
        0 => match n {
            0 => return Classification::Unclassified,
            n if n > thresholds.ne_rare_max => NeOnly,
            _ => NeRare,
        },
        c if c > thresholds.uncommon_max => CtCommon,
        c if c > thresholds.rare_max => CtUncommon,
        _ => CtRare,
    };

    Classification::Classified(category)
}

/// Per-species observation counts in each scope
pub fn count_by_scope(
    occurrences: &[Occurrence],
    regions: &RegionScopes,
) -> FxHashMap<String, ScopeCounts> {
    let mut counts: FxHashMap<String, ScopeCounts> = FxHashMap::default();

    for occ in occurrences {
        let entry = counts.entry(occ.species.clone()).or_default();
        if regions.is_narrow(&occ.region) {
            entry.narrow += 1;
        }
        if regions.is_broad(&occ.region) {
            entry.broad += 1;
        }
    }

    counts
}
