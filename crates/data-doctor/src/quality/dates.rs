//! Date pattern recognition for format-consistency checks.
//!
//! Each pattern pairs a cheap shape regex with a chrono format string; a value
//! matches a pattern only when both accept it. Patterns are tried in order and
//! the first match wins, so `04/05/2024` counts as US month-first.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical format suggested when a column mixes date patterns.
pub const CANONICAL_DATE_FORMAT: &str = "YYYY-MM-DD";

const FULL_MONTHS: &str =
    "January|February|March|April|May|June|July|August|September|October|November|December";
const SHORT_MONTHS: &str = "Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec";

#[derive(Debug)]
pub struct DatePattern {
    /// Human-readable label, e.g. `MM/DD/YYYY`.
    pub label: &'static str,
    format: &'static str,
    has_time: bool,
    shape: Regex,
}

impl DatePattern {
    fn new(label: &'static str, format: &'static str, has_time: bool, shape: &str) -> Self {
        Self {
            label,
            format,
            has_time,
            shape: Regex::new(shape).expect("Invalid date shape regex"),
        }
    }

    fn matches(&self, value: &str) -> bool {
        if !self.shape.is_match(value) {
            return false;
        }
        if self.has_time {
            NaiveDateTime::parse_from_str(value, self.format).is_ok()
        } else {
            NaiveDate::parse_from_str(value, self.format).is_ok()
        }
    }
}

// Compiled once at startup
static DATE_PATTERNS: Lazy<Vec<DatePattern>> = Lazy::new(|| {
    vec![
        DatePattern::new("YYYY-MM-DD", "%Y-%m-%d", false, r"^\d{4}-\d{1,2}-\d{1,2}$"),
        DatePattern::new("MM/DD/YYYY", "%m/%d/%Y", false, r"^\d{1,2}/\d{1,2}/\d{4}$"),
        DatePattern::new("DD/MM/YYYY", "%d/%m/%Y", false, r"^\d{1,2}/\d{1,2}/\d{4}$"),
        DatePattern::new(
            "YYYY-MM-DD HH:MM:SS",
            "%Y-%m-%d %H:%M:%S",
            true,
            r"^\d{4}-\d{1,2}-\d{1,2} \d{1,2}:\d{1,2}:\d{1,2}$",
        ),
        DatePattern::new(
            "MM/DD/YYYY HH:MM:SS",
            "%m/%d/%Y %H:%M:%S",
            true,
            r"^\d{1,2}/\d{1,2}/\d{4} \d{1,2}:\d{1,2}:\d{1,2}$",
        ),
        DatePattern::new(
            "DD/MM/YYYY HH:MM:SS",
            "%d/%m/%Y %H:%M:%S",
            true,
            r"^\d{1,2}/\d{1,2}/\d{4} \d{1,2}:\d{1,2}:\d{1,2}$",
        ),
        DatePattern::new(
            "YYYY-MM-DDTHH:MM:SS",
            "%Y-%m-%dT%H:%M:%S",
            true,
            r"^\d{4}-\d{1,2}-\d{1,2}T\d{1,2}:\d{1,2}:\d{1,2}$",
        ),
        DatePattern::new(
            "Month DD, YYYY",
            "%B %d, %Y",
            false,
            &format!(r"^({FULL_MONTHS}) \d{{1,2}}, \d{{4}}$"),
        ),
        DatePattern::new(
            "Mon DD, YYYY",
            "%b %d, %Y",
            false,
            &format!(r"^({SHORT_MONTHS}) \d{{1,2}}, \d{{4}}$"),
        ),
        DatePattern::new("DD-MM-YYYY", "%d-%m-%Y", false, r"^\d{1,2}-\d{1,2}-\d{4}$"),
        DatePattern::new("YYYY/MM/DD", "%Y/%m/%d", false, r"^\d{4}/\d{1,2}/\d{1,2}$"),
    ]
});

/// Label of the first recognized date pattern `value` matches.
pub fn match_date_pattern(value: &str) -> Option<&'static str> {
    DATE_PATTERNS
        .iter()
        .find(|pattern| pattern.matches(value))
        .map(|pattern| pattern.label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_and_us_dates() {
        assert_eq!(match_date_pattern("2024-01-15"), Some("YYYY-MM-DD"));
        assert_eq!(match_date_pattern("01/15/2024"), Some("MM/DD/YYYY"));
    }

    #[test]
    fn test_day_first_when_month_is_impossible() {
        assert_eq!(match_date_pattern("25/12/2024"), Some("DD/MM/YYYY"));
        assert_eq!(match_date_pattern("25-12-2024"), Some("DD-MM-YYYY"));
    }

    #[test]
    fn test_textual_months_are_distinguished() {
        assert_eq!(match_date_pattern("January 5, 2024"), Some("Month DD, YYYY"));
        assert_eq!(match_date_pattern("Jan 5, 2024"), Some("Mon DD, YYYY"));
    }

    #[test]
    fn test_datetime_variants() {
        assert_eq!(
            match_date_pattern("2024-01-15 10:30:00"),
            Some("YYYY-MM-DD HH:MM:SS")
        );
        assert_eq!(
            match_date_pattern("2024-01-15T10:30:00"),
            Some("YYYY-MM-DDTHH:MM:SS")
        );
    }

    #[test]
    fn test_non_dates() {
        assert_eq!(match_date_pattern("hello"), None);
        assert_eq!(match_date_pattern("2024-13-45"), None);
        assert_eq!(match_date_pattern("12345"), None);
        assert_eq!(match_date_pattern(" 2024-01-15"), None);
    }
}
