//! Phenology statistics
//!
//! Peak week, duration window, earliest flowering date and data-quality tier
//! for one species, all derived from its weekly bins.

use crate::config::{PercentileWindow, QualityThresholds};
use crate::model::{DataQualityTier, Occurrence, PhenologySummary, WeeklyBin, WEEKS_PER_YEAR};
use chrono::NaiveDate;

/// Weeks at each end of the year checked for boundary-straddling distributions
const YEAR_EDGE_WEEKS: u8 = 4;

/// Flowering count per week (index 0 = week 1)
///
/// Accepts sparse or dense input; duplicate weeks are summed and weeks outside
/// 1..=52 ignored.
fn flowering_weights(bins: &[WeeklyBin]) -> [u32; WEEKS_PER_YEAR as usize] {
    let mut weights = [0u32; WEEKS_PER_YEAR as usize];
    for bin in bins {
        if (1..=WEEKS_PER_YEAR).contains(&bin.week) {
            weights[(bin.week - 1) as usize] += bin.flowering;
        }
    }
    weights
}

/// Total flowering observations across all bins
pub fn total_flowering(bins: &[WeeklyBin]) -> u32 {
    flowering_weights(bins).iter().sum()
}

/// Flowering-weighted mean week, `None` without flowering data
pub fn peak_week(bins: &[WeeklyBin]) -> Option<f64> {
    let weights = flowering_weights(bins);
    let total: u64 = weights.iter().map(|&w| w as u64).sum();
    if total == 0 {
        return None;
    }

    let weighted: u64 = weights
        .iter()
        .enumerate()
        .map(|(idx, &w)| (idx as u64 + 1) * w as u64)
        .sum();

    Some(weighted as f64 / total as f64)
}

/// Weeks bounding the central mass between two percentiles (0-100)
///
/// Each bin's mass is centered on its week: the cumulative fraction at week k
/// is (C(k-1) + w(k)/2) / W. Percentiles between two non-empty bins are
/// linearly interpolated; percentiles outside the first/last centers clamp to
/// the first/last flowering week. Weeks are treated as a linear axis.
///
/// A uniform distribution over 1..=52 gives [5.7, 47.3] for 10/90.
pub fn percentile_window(bins: &[WeeklyBin], window: &PercentileWindow) -> Option<(f64, f64)> {
    let weights = flowering_weights(bins);
    let points: Vec<(f64, f64)> = weights
        .iter()
        .enumerate()
        .filter(|(_, w)| **w > 0)
        .map(|(idx, &w)| (idx as f64 + 1.0, w as f64))
        .collect();

    if points.is_empty() {
        return None;
    }

    let total: f64 = points.iter().map(|(_, w)| w).sum();
    let mut centers = Vec::with_capacity(points.len());
    let mut cumulative = 0.0;
    for &(week, w) in &points {
        centers.push((week, (cumulative + w / 2.0) / total));
        cumulative += w;
    }

    Some((
        interpolate_crossing(&centers, window.lower / 100.0),
        interpolate_crossing(&centers, window.upper / 100.0),
    ))
}

/// Week at which the cumulative fraction reaches `target`
fn interpolate_crossing(centers: &[(f64, f64)], target: f64) -> f64 {
    let (first_week, first_frac) = centers[0];
    let (last_week, last_frac) = centers[centers.len() - 1];

    if target <= first_frac {
        return first_week;
    }
    if target >= last_frac {
        return last_week;
    }

    for pair in centers.windows(2) {
        let (w0, f0) = pair[0];
        let (w1, f1) = pair[1];
        if f0 <= target && target <= f1 {
            let fraction = if f1 - f0 > 0.0 {
                (target - f0) / (f1 - f0)
            } else {
                0.0
            };
            return w0 + fraction * (w1 - w0);
        }
    }

    last_week
}

/// Flowering recorded in both the first and last weeks of the year
pub fn spans_year_boundary(bins: &[WeeklyBin]) -> bool {
    let weights = flowering_weights(bins);
    let edge = YEAR_EDGE_WEEKS as usize;
    let early = weights[..edge].iter().any(|&w| w > 0);
    let late = weights[weights.len() - edge..].iter().any(|&w| w > 0);
    early && late
}

/// Earliest flowering observation as (date, record id)
///
/// Ties on date go to the lowest record id.
pub fn earliest_flowering<'a, I>(occurrences: I) -> Option<(NaiveDate, u64)>
where
    I: IntoIterator<Item = &'a Occurrence>,
{
    occurrences
        .into_iter()
        .filter(|o| o.flowering)
        .map(|o| (o.date, o.record_id))
        .min()
}

/// Data-quality tier from the flowering observation count
pub fn quality_tier(flowering_obs: u32, thresholds: &QualityThresholds) -> DataQualityTier {
    if flowering_obs >= thresholds.solid_min {
        DataQualityTier::Solid
    } else if flowering_obs >= thresholds.light_min {
        DataQualityTier::Light
    } else {
        DataQualityTier::PointsOnly
    }
}

/// Full phenology summary, `None` when the species has no flowering data
pub fn summarize(
    bins: &[WeeklyBin],
    earliest: Option<(NaiveDate, u64)>,
    narrow_region_obs: u32,
    window: &PercentileWindow,
    quality: &QualityThresholds,
) -> Option<PhenologySummary> {
    let peak = peak_week(bins)?;
    let (start, end) = percentile_window(bins, window)?;
    let (earliest_date, earliest_record_id) = earliest?;
    let total = total_flowering(bins);

    Some(PhenologySummary {
        peak_week: peak,
        window_start_week: start,
        window_end_week: end,
        earliest_date,
        earliest_record_id,
        total_flowering_obs: total,
        narrow_region_obs,
        tier: quality_tier(total, quality),
        spans_year_boundary: spans_year_boundary(bins),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bin(week: u8, flowering: u32) -> WeeklyBin {
        WeeklyBin { week, flowering, total: flowering }
    }

    fn uniform() -> Vec<WeeklyBin> {
        (1..=52).map(|w| bin(w, 10)).collect()
    }

    #[test]
    fn test_peak_week_single_bin_is_exact() {
        let bins = vec![bin(26, 37)];
        assert_eq!(peak_week(&bins), Some(26.0));
    }

    #[test]
    fn test_peak_week_weighted_mean() {
        let bins = vec![bin(10, 1), bin(20, 3)];
        assert_relative_eq!(peak_week(&bins).unwrap(), 17.5, epsilon = 1e-12);
    }

    #[test]
    fn test_peak_week_undefined_without_flowering() {
        let bins = vec![WeeklyBin { week: 12, flowering: 0, total: 40 }];
        assert_eq!(peak_week(&bins), None);
        assert_eq!(peak_week(&[]), None);
    }

    #[test]
    fn test_sparse_and_dense_bins_agree() {
        let sparse = vec![bin(14, 3), bin(18, 5)];
        let mut dense: Vec<WeeklyBin> = (1..=52).map(|w| bin(w, 0)).collect();
        dense[13].flowering = 3;
        dense[17].flowering = 5;

        assert_eq!(peak_week(&sparse), peak_week(&dense));
        let window = PercentileWindow::default();
        assert_eq!(percentile_window(&sparse, &window), percentile_window(&dense, &window));
    }

    #[test]
    fn test_duplicate_weeks_are_summed() {
        let bins = vec![bin(30, 2), bin(30, 2), bin(10, 4)];
        assert_relative_eq!(peak_week(&bins).unwrap(), 20.0, epsilon = 1e-12);
        assert_eq!(total_flowering(&bins), 8);
    }

    #[test]
    fn test_uniform_window_within_tolerance() {
        let (start, end) = percentile_window(&uniform(), &PercentileWindow::default()).unwrap();
        assert_relative_eq!(start, 5.7, epsilon = 1e-9);
        assert_relative_eq!(end, 47.3, epsilon = 1e-9);
        assert!((start - 5.8).abs() <= 0.5);
        assert!((end - 47.2).abs() <= 0.5);
    }

    #[test]
    fn test_single_week_window_collapses() {
        let window = percentile_window(&[bin(26, 9)], &PercentileWindow::default());
        assert_eq!(window, Some((26.0, 26.0)));
    }

    #[test]
    fn test_window_interpolates_between_bins() {
        // Centers at 0.25 (week 10) and 0.75 (week 20)
        let bins = vec![bin(10, 5), bin(20, 5)];
        let window = PercentileWindow { lower: 50.0, upper: 90.0 };
        let (start, end) = percentile_window(&bins, &window).unwrap();
        assert_relative_eq!(start, 15.0, epsilon = 1e-9);
        assert_relative_eq!(end, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_year_boundary_flag() {
        assert!(spans_year_boundary(&[bin(1, 2), bin(51, 3)]));
        assert!(!spans_year_boundary(&[bin(20, 2), bin(51, 3)]));
        assert!(!spans_year_boundary(&[bin(2, 2)]));
    }

    #[test]
    fn test_quality_tiers() {
        let thresholds = QualityThresholds::default();
        assert_eq!(quality_tier(15, &thresholds), DataQualityTier::Solid);
        assert_eq!(quality_tier(14, &thresholds), DataQualityTier::Light);
        assert_eq!(quality_tier(5, &thresholds), DataQualityTier::Light);
        assert_eq!(quality_tier(4, &thresholds), DataQualityTier::PointsOnly);
        assert_eq!(quality_tier(0, &thresholds), DataQualityTier::PointsOnly);
    }

    #[test]
    fn test_earliest_flowering_tie_break() {
        let make = |id: u64, d: u32, flowering: bool| Occurrence {
            record_id: id,
            species: "Viola sororia".to_string(),
            family: "Violaceae".to_string(),
            genus: "Viola".to_string(),
            date: NaiveDate::from_ymd_opt(2020, 4, d).unwrap(),
            region: "Connecticut".to_string(),
            flowering,
        };
        let occurrences = vec![make(9, 5, true), make(3, 5, true), make(1, 2, false), make(7, 8, true)];

        let earliest = earliest_flowering(&occurrences);
        assert_eq!(earliest, Some((NaiveDate::from_ymd_opt(2020, 4, 5).unwrap(), 3)));
    }

    #[test]
    fn test_summarize_requires_flowering() {
        let window = PercentileWindow::default();
        let quality = QualityThresholds::default();
        let bins = vec![WeeklyBin { week: 20, flowering: 0, total: 40 }];
        assert!(summarize(&bins, None, 40, &window, &quality).is_none());

        let date = NaiveDate::from_ymd_opt(2020, 5, 14).unwrap();
        let summary = summarize(&uniform(), Some((date, 1)), 12, &window, &quality).unwrap();
        assert_relative_eq!(summary.peak_week, 26.5, epsilon = 1e-12);
        assert_eq!(summary.total_flowering_obs, 520);
        assert_eq!(summary.narrow_region_obs, 12);
        assert_eq!(summary.tier, DataQualityTier::Solid);
        assert!(summary.spans_year_boundary);
    }
}
