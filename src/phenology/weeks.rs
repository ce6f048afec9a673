//! Calendar week bins
//!
//! Week = day-of-year split into 52 fixed seven-day bins; the final bin also
//! takes day 365 (and 366 in leap years). ISO weeks are never used, so a
//! given date maps to the same bin boundaries every year.

use crate::model::WEEKS_PER_YEAR;
use chrono::{Datelike, NaiveDate};

/// Week bin (1..=52) for a date
pub fn week_of_year(date: NaiveDate) -> u8 {
    week_of_day(date.ordinal())
}

/// Week bin (1..=52) for a 1-based day of year
pub fn week_of_day(day_of_year: u32) -> u8 {
    let week = (day_of_year.max(1) - 1) / 7 + 1;
    week.min(WEEKS_PER_YEAR as u32) as u8
}

/// Approximate calendar label for a (possibly fractional) week, e.g. "May 14"
pub fn week_label(week: f64) -> String {
    let day = ((week - 1.0) * 7.0 + 1.0).round().clamp(1.0, 365.0) as u32;
    // Labels use a non-leap reference year
    NaiveDate::from_yo_opt(2023, day)
        .map(|d| d.format("%b %d").to_string())
        .unwrap_or_default()
}
