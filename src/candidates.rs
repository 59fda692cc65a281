//! Autocomplete candidates for the month and year inputs.
//!
//! Candidate lists are never stored. Every keystroke asks for a fresh
//! iterator, and out-of-range input simply yields fewer (or no) candidates.

use chrono::Month;

use crate::range::YearBounds;

/// All twelve months in calendar order.
pub fn all_months() -> impl Iterator<Item = Month> {
    (1..=12u8).filter_map(|n| Month::try_from(n).ok())
}

/// Months whose English name starts with `query`, ignoring case.
pub fn month_candidates(query: &str) -> impl Iterator<Item = Month> + '_ {
    let query = query.trim();
    all_months().filter(move |month| starts_with_ignore_case(month.name(), query))
}

/// The month whose full name is `query`, ignoring case and surrounding space.
pub fn exact_month(query: &str) -> Option<Month> {
    let query = query.trim();
    all_months().find(|month| month.name().eq_ignore_ascii_case(query))
}

/// Years within `bounds` whose decimal form starts with `query`, ascending.
///
/// An empty query yields the whole bounded range. Anything that is not a run
/// of ASCII digits yields nothing.
pub fn year_candidates(query: &str, bounds: YearBounds) -> impl Iterator<Item = i32> {
    let query = query.trim().to_string();
    let numeric = query.chars().all(|c| c.is_ascii_digit());

    bounds
        .years()
        .filter(move |year| numeric && year.to_string().starts_with(&query))
}

/// Resolve a typed year for the confirm key. Out-of-bounds years are clamped.
pub fn exact_year(query: &str, bounds: YearBounds) -> Option<i32> {
    let query = query.trim();
    if query.is_empty() || !query.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    query.parse::<i32>().ok().map(|year| bounds.clamp(year))
}

fn starts_with_ignore_case(name: &str, prefix: &str) -> bool {
    name.len() >= prefix.len()
        && name
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_prefix_is_case_insensitive() {
        let found: Vec<Month> = month_candidates("ju").collect();
        assert_eq!(found, vec![Month::June, Month::July]);

        let found: Vec<Month> = month_candidates("MA").collect();
        assert_eq!(found, vec![Month::March, Month::May]);
    }

    #[test]
    fn test_month_empty_query_lists_all_in_order() {
        let found: Vec<Month> = month_candidates("  ").collect();
        assert_eq!(found.len(), 12);
        assert_eq!(found.first(), Some(&Month::January));
        assert_eq!(found.last(), Some(&Month::December));
    }

    #[test]
    fn test_month_no_match() {
        assert_eq!(month_candidates("xyz").count(), 0);
        assert_eq!(month_candidates("januaryy").count(), 0);
        assert_eq!(month_candidates("é").count(), 0);
    }

    #[test]
    fn test_exact_month() {
        assert_eq!(exact_month(" september "), Some(Month::September));
        assert_eq!(exact_month("sept"), None);
    }

    #[test]
    fn test_year_prefix_19() {
        let bounds = YearBounds::new(1900, 2100);
        let found: Vec<i32> = year_candidates("19", bounds).collect();
        assert_eq!(found.len(), 100);
        assert_eq!(found, (1900..=1999).collect::<Vec<_>>());
    }

    #[test]
    fn test_year_empty_query_is_full_range() {
        let bounds = YearBounds::new(2000, 2010);
        let found: Vec<i32> = year_candidates("", bounds).collect();
        assert_eq!(found, (2000..=2010).collect::<Vec<_>>());
    }

    #[test]
    fn test_full_year_contains_exact_match() {
        let bounds = YearBounds::new(1900, 2100);
        for year in [1900, 1955, 2024, 2100] {
            let found: Vec<i32> = year_candidates(&year.to_string(), bounds).collect();
            assert!(found.contains(&year), "missing {year}");
        }
    }

    #[test]
    fn test_non_numeric_year_is_empty() {
        let bounds = YearBounds::default();
        for query in ["abc", "19a", "-19", "20 24", "٢٠٢٤"] {
            assert_eq!(year_candidates(query, bounds).count(), 0, "query {query:?}");
        }
    }

    #[test]
    fn test_year_outside_bounds_is_clamped_out() {
        let bounds = YearBounds::new(1950, 2050);
        assert_eq!(year_candidates("18", bounds).count(), 0);
        let found: Vec<i32> = year_candidates("19", bounds).collect();
        assert_eq!(found, (1950..=1999).collect::<Vec<_>>());
    }

    #[test]
    fn test_exact_year_clamps() {
        let bounds = YearBounds::new(1900, 2100);
        assert_eq!(exact_year("2024", bounds), Some(2024));
        assert_eq!(exact_year("1800", bounds), Some(1900));
        assert_eq!(exact_year("9999", bounds), Some(2100));
        assert_eq!(exact_year("twenty", bounds), None);
        assert_eq!(exact_year("", bounds), None);
    }
}
