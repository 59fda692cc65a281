use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::PickerError;

/// A selected interval of days. `from <= to` always holds for values built
/// through [`DateRange::new`] or [`DateRange::single`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Build a range from two endpoints in either order.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if b < a {
            DateRange { from: b, to: a }
        } else {
            DateRange { from: a, to: b }
        }
    }

    pub fn single(day: NaiveDate) -> Self {
        DateRange { from: day, to: day }
    }

    /// From the first of January of `today`'s year up to `today`.
    pub fn year_to_date(today: NaiveDate) -> Self {
        let jan_first = today.with_ordinal(1).unwrap_or(today);
        DateRange::new(jan_first, today)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from <= day && day <= self.to
    }

    pub fn is_single_day(&self) -> bool {
        self.from == self.to
    }
}

/// Whether a second day click closes a range or each click stands alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarMode {
    Single,
    Range,
}

impl CalendarMode {
    /// Two visible months means a range picker, one means a single date.
    pub fn from_months(number_of_months: u8) -> Self {
        if number_of_months >= 2 {
            CalendarMode::Range
        } else {
            CalendarMode::Single
        }
    }
}

/// Closed interval of selectable years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearBounds {
    pub min_year: i32,
    pub max_year: i32,
}

impl Default for YearBounds {
    fn default() -> Self {
        YearBounds {
            min_year: 1900,
            max_year: 2100,
        }
    }
}

impl YearBounds {
    pub fn new(min_year: i32, max_year: i32) -> Self {
        YearBounds {
            min_year: min_year.min(max_year),
            max_year: min_year.max(max_year),
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.min_year <= year && year <= self.max_year
    }

    pub fn clamp(&self, year: i32) -> i32 {
        year.clamp(self.min_year, self.max_year)
    }

    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.min_year..=self.max_year
    }
}

/// Same shape as JavaScript's `Date.prototype.toDateString`, e.g. "Mon Jan 01 2024".
pub fn to_date_string(day: NaiveDate) -> String {
    day.format("%a %b %d %Y").to_string()
}

/// Parse a form value in `YYYY-MM-DD` form.
pub fn parse_iso_date(input: &str) -> Result<NaiveDate, PickerError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| PickerError::InvalidDateInput {
        input: trimmed.to_string(),
    })
}

pub fn to_iso(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_orders_endpoints() {
        let range = DateRange::new(ymd(2024, 1, 5), ymd(2024, 1, 1));
        assert_eq!(range.from, ymd(2024, 1, 1));
        assert_eq!(range.to, ymd(2024, 1, 5));
        assert!(range.contains(ymd(2024, 1, 3)));
        assert!(!range.contains(ymd(2024, 1, 6)));
    }

    #[test]
    fn test_year_to_date() {
        let range = DateRange::year_to_date(ymd(2026, 10, 19));
        assert_eq!(range.from, ymd(2026, 1, 1));
        assert_eq!(range.to, ymd(2026, 10, 19));
    }

    #[test]
    fn test_mode_from_months() {
        assert_eq!(CalendarMode::from_months(1), CalendarMode::Single);
        assert_eq!(CalendarMode::from_months(2), CalendarMode::Range);
    }

    #[test]
    fn test_bounds_normalize_and_clamp() {
        let bounds = YearBounds::new(2100, 1900);
        assert_eq!(bounds.min_year, 1900);
        assert_eq!(bounds.max_year, 2100);
        assert_eq!(bounds.clamp(1850), 1900);
        assert_eq!(bounds.clamp(2200), 2100);
        assert_eq!(bounds.clamp(2024), 2024);
        assert!(bounds.contains(2100));
        assert!(!bounds.contains(2101));
    }

    #[test]
    fn test_to_date_string() {
        assert_eq!(to_date_string(ymd(2024, 1, 1)), "Mon Jan 01 2024");
        assert_eq!(to_date_string(ymd(2024, 12, 31)), "Tue Dec 31 2024");
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_iso_date(" 2024-02-29 ").unwrap(), ymd(2024, 2, 29));
        assert_eq!(
            parse_iso_date("2023-02-29"),
            Err(PickerError::InvalidDateInput {
                input: "2023-02-29".to_string()
            })
        );
        assert!(parse_iso_date("").is_err());
    }
}
