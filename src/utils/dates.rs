//! Event date parsing
//!
//! Darwin Core `eventDate` may be a date, a date-time, or an interval
//! (`start/end`). Intervals use their start date.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parse an `eventDate` value
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    let start = value.split('/').next()?.trim();
    if start.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(start, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(start) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(start, fmt) {
            return Some(dt.date());
        }
    }

    // Offsets without a colon (e.g. "2020-05-01T10:00:00-0400"): keep the date part
    start
        .get(..10)
        .filter(|_| start.len() > 10 && start.as_bytes()[10] == b'T')
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Date from separate year/month/day fields
pub fn date_from_parts(year: Option<&str>, month: Option<&str>, day: Option<&str>) -> Option<NaiveDate> {
    let parse = |v: Option<&str>| v.and_then(|s| s.trim().parse::<u32>().ok());
    let year = year.and_then(|s| s.trim().parse::<i32>().ok())?;
    NaiveDate::from_ymd_opt(year, parse(month)?, parse(day)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_plain_and_timestamped_dates() {
        assert_eq!(parse_event_date("2021-05-03"), Some(date(2021, 5, 3)));
        assert_eq!(parse_event_date(" 2021-05-03T14:22:00 "), Some(date(2021, 5, 3)));
        assert_eq!(parse_event_date("2021-05-03T14:22:00-04:00"), Some(date(2021, 5, 3)));
        assert_eq!(parse_event_date("2021-05-03T14:22:00-0400"), Some(date(2021, 5, 3)));
        assert_eq!(parse_event_date("2021-05-03T14:22"), Some(date(2021, 5, 3)));
    }

    #[test]
    fn test_interval_uses_start() {
        assert_eq!(parse_event_date("2019-06-01/2019-06-05"), Some(date(2019, 6, 1)));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_event_date(""), None);
        assert_eq!(parse_event_date("2019-06"), None);
        assert_eq!(parse_event_date("June 2019"), None);
        assert_eq!(parse_event_date("2019-02-30"), None);
    }

    #[test]
    fn test_date_from_parts() {
        assert_eq!(date_from_parts(Some("2018"), Some("7"), Some("04")), Some(date(2018, 7, 4)));
        assert_eq!(date_from_parts(Some("2018"), Some("7"), None), None);
        assert_eq!(date_from_parts(None, Some("7"), Some("4")), None);
    }
}
