//! Weekly bin aggregation
//!
//! Sums flowering and total observations per species and week across every
//! year in the retained window.

use super::weeks::week_of_year;
use crate::model::{Occurrence, WeeklyBin, WEEKS_PER_YEAR};
use rustc_hash::FxHashMap;

type WeekCounts = [(u32, u32); WEEKS_PER_YEAR as usize];

/// Species name → non-empty weekly bins, ascending by week
pub fn build_weekly_bins(occurrences: &[Occurrence]) -> FxHashMap<String, Vec<WeeklyBin>> {
    let mut counts: FxHashMap<&str, WeekCounts> = FxHashMap::default();

    for occ in occurrences {
        let weeks = counts
            .entry(occ.species.as_str())
            .or_insert([(0, 0); WEEKS_PER_YEAR as usize]);
        let slot = &mut weeks[(week_of_year(occ.date) - 1) as usize];
        slot.1 += 1;
        if occ.flowering {
            slot.0 += 1;
        }
    }

    counts
        .into_iter()
        .map(|(species, weeks)| (species.to_string(), to_bins(&weeks)))
        .collect()
}

fn to_bins(weeks: &WeekCounts) -> Vec<WeeklyBin> {
    weeks
        .iter()
        .enumerate()
        .filter(|(_, (_, total))| *total > 0)
        .map(|(idx, &(flowering, total))| WeeklyBin {
            week: idx as u8 + 1,
            flowering,
            total,
        })
        .collect()
}
