// 📅 Date Utilities - Day and calendar-month arithmetic
//
// Record dates arrive as strings and are parsed on demand. Anything that
// does not parse is simply left out of date-based computations.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// PARSING
// ============================================================================

/// Parse a record date at day granularity.
///
/// Accepted: `YYYY-MM-DD`, RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS`
/// timestamps (optional fraction) and `MM/DD/YYYY`. Time-of-day is dropped.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }

    NaiveDate::parse_from_str(raw, "%m/%d/%Y").ok()
}

/// Same calendar day, ignoring time-of-day.
pub fn is_same_day(raw: &str, reference: NaiveDate) -> bool {
    parse_record_date(raw) == Some(reference)
}

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

// ============================================================================
// CALENDAR MONTH
// ============================================================================

/// A calendar month, used as the bucket key for monthly totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        // month is always 1..=12 when built through `of` / `shift`
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first_day()
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Inclusive of every day in the month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Whether a raw record date falls in this month. Unparsable dates never do.
    pub fn contains_raw(&self, raw: &str) -> bool {
        parse_record_date(raw).map_or(false, |date| self.contains(date))
    }

    /// Move by `months` (negative goes back in time).
    pub fn shift(&self, months: i32) -> Self {
        let index = (self.year * 12 + (self.month as i32 - 1)).saturating_add(months);
        YearMonth {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Short month label, e.g. "Mar".
    pub fn short_label(&self) -> String {
        self.first_day().format("%b").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// `count` consecutive months ending with the month of `reference`, oldest first.
pub fn months_ending_at(reference: NaiveDate, count: usize) -> Vec<YearMonth> {
    let last = YearMonth::of(reference);
    (0..count)
        .rev()
        .map(|back| last.shift(-i32::try_from(back).unwrap_or(i32::MAX)))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_supported_formats() {
        assert_eq!(parse_record_date("2024-03-10"), Some(ymd(2024, 3, 10)));
        assert_eq!(parse_record_date("2024-03-10T23:59:00Z"), Some(ymd(2024, 3, 10)));
        assert_eq!(parse_record_date("2024-03-10T08:15:00+05:00"), Some(ymd(2024, 3, 10)));
        assert_eq!(parse_record_date("2024-03-10T08:15:00.250"), Some(ymd(2024, 3, 10)));
        assert_eq!(parse_record_date("03/10/2024"), Some(ymd(2024, 3, 10)));
        assert_eq!(parse_record_date("  2024-03-10 "), Some(ymd(2024, 3, 10)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_record_date(""), None);
        assert_eq!(parse_record_date("not-a-date"), None);
        assert_eq!(parse_record_date("2024-13-40"), None);
    }

    #[test]
    fn test_same_day_ignores_time() {
        assert!(is_same_day("2024-03-15T18:30:00", ymd(2024, 3, 15)));
        assert!(!is_same_day("2024-03-14T23:59:59", ymd(2024, 3, 15)));
        assert!(!is_same_day("garbage", ymd(2024, 3, 15)));
    }

    #[test]
    fn test_month_bounds() {
        let feb = YearMonth::of(ymd(2024, 2, 10));
        assert_eq!(feb.first_day(), ymd(2024, 2, 1));
        assert_eq!(feb.last_day(), ymd(2024, 2, 29));
        assert!(feb.contains(ymd(2024, 2, 29)));
        assert!(!feb.contains(ymd(2023, 2, 10)));
        assert!(feb.contains_raw("2024-02-01"));
        assert!(!feb.contains_raw("bad"));

        let dec = YearMonth::of(ymd(2023, 12, 5));
        assert_eq!(dec.last_day(), ymd(2023, 12, 31));
    }

    #[test]
    fn test_shift_across_years() {
        let jan = YearMonth { year: 2024, month: 1 };
        assert_eq!(jan.shift(-1), YearMonth { year: 2023, month: 12 });
        assert_eq!(jan.shift(-13), YearMonth { year: 2022, month: 12 });
        assert_eq!(jan.shift(11), YearMonth { year: 2024, month: 12 });
        assert_eq!(jan.shift(12), YearMonth { year: 2025, month: 1 });
    }

    #[test]
    fn test_months_ending_at() {
        let months = months_ending_at(ymd(2024, 3, 15), 6);
        let labels: Vec<String> = months.iter().map(|m| m.to_string()).collect();
        assert_eq!(
            labels,
            vec!["2023-10", "2023-11", "2023-12", "2024-01", "2024-02", "2024-03"]
        );
        assert_eq!(months[5].short_label(), "Mar");
        assert!(months_ending_at(ymd(2024, 3, 15), 0).is_empty());
    }

    #[test]
    fn test_days_between() {
        assert_eq!(days_between(ymd(2024, 3, 1), ymd(2024, 3, 11)), 10);
        assert_eq!(days_between(ymd(2024, 3, 11), ymd(2024, 3, 1)), -10);
    }
}
