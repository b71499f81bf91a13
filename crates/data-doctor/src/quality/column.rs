//! Typed column views used by the issue detector.
//!
//! A [`Column`] is built once per dataset column from its polars dtype. Each
//! variant implements [`ColumnChecks`]; checks that do not apply to a variant
//! keep the no-op default.

use crate::pipeline::outliers::OutlierHandler;
use crate::quality::dates::{CANONICAL_DATE_FORMAT, match_date_pattern};
use crate::types::{Issue, IssueType, Severity};
use crate::utils::{
    DtypeCategory, get_dtype_category, null_row_indices, numeric_values, parse_numeric_string,
    text_values,
};
use polars::prelude::*;
use std::collections::HashSet;

/// Number of non-null values sampled for date-format detection.
pub const DATE_SAMPLE_SIZE: usize = 100;

/// Minimum non-null values before outlier detection runs.
pub const MIN_OUTLIER_VALUES: usize = 10;

/// Share of values that must parse as numbers to flag a text column.
pub const NUMERIC_TEXT_RATIO: f64 = 0.8;

/// Per-column detection capabilities.
pub trait ColumnChecks {
    fn name(&self) -> &str;

    /// Number of rows in the column, nulls included.
    fn len(&self) -> usize;

    fn null_rows(&self) -> Vec<usize>;

    fn missing_fix_hint(&self) -> &'static str {
        "Fill with appropriate default value"
    }

    fn detect_missing(&self) -> Option<Issue> {
        let rows = self.null_rows();
        if rows.is_empty() || self.len() == 0 {
            return None;
        }

        let pct = rows.len() as f64 / self.len() as f64 * 100.0;
        let severity = if pct > 50.0 {
            Severity::Critical
        } else if pct > 20.0 {
            Severity::High
        } else if pct > 5.0 {
            Severity::Medium
        } else {
            Severity::Low
        };

        Some(
            Issue::new(
                IssueType::MissingValues,
                self.name(),
                format!("{} missing values ({:.1}%)", rows.len(), pct),
                severity,
                0.95,
            )
            .with_rows(rows)
            .with_suggested_fix(self.missing_fix_hint()),
        )
    }

    /// Format and consistency checks, in order: date patterns, case
    /// variation, whitespace.
    fn detect_format_issues(&self) -> Vec<Issue> {
        Vec::new()
    }

    fn detect_type_mismatch(&self) -> Option<Issue> {
        None
    }

    fn detect_outliers(&self) -> Option<Issue> {
        None
    }
}

/// Integer or float column.
#[derive(Debug, Clone)]
pub struct NumericColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl ColumnChecks for NumericColumn {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn null_rows(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(idx, v)| v.is_none().then_some(idx))
            .collect()
    }

    fn missing_fix_hint(&self) -> &'static str {
        "Fill with median value"
    }

    fn detect_outliers(&self) -> Option<Issue> {
        let usable = self.values.iter().flatten().filter(|v| !v.is_nan()).count();
        if usable <= MIN_OUTLIER_VALUES {
            return None;
        }

        let (_, rows) = OutlierHandler::find_outliers(&self.values)?;
        if rows.is_empty() {
            return None;
        }

        let severity = if (rows.len() as f64) < self.len() as f64 * 0.05 {
            Severity::Medium
        } else {
            Severity::High
        };

        Some(
            Issue::new(
                IssueType::Outliers,
                &self.name,
                format!("{} statistical outliers detected", rows.len()),
                severity,
                0.7,
            )
            .with_rows(rows)
            .with_suggested_fix("Review outliers for data entry errors"),
        )
    }
}

/// String column.
#[derive(Debug, Clone)]
pub struct TextColumn {
    pub name: String,
    pub values: Vec<Option<String>>,
}

impl TextColumn {
    fn non_null(&self) -> impl Iterator<Item = &str> {
        self.values.iter().flatten().map(String::as_str)
    }

    fn check_date_formats(&self) -> Option<Issue> {
        let sample: Vec<&str> = self.non_null().take(DATE_SAMPLE_SIZE).collect();
        if sample.is_empty() {
            return None;
        }

        let matched: Vec<&'static str> =
            sample.iter().filter_map(|v| match_date_pattern(v)).collect();
        if matched.len() * 2 < sample.len() {
            return None;
        }

        let mut formats: Vec<&'static str> = Vec::new();
        for label in matched {
            if !formats.contains(&label) {
                formats.push(label);
            }
        }
        if formats.len() <= 1 {
            return None;
        }

        Some(
            Issue::new(
                IssueType::FormatErrors,
                &self.name,
                format!("Multiple date formats detected: {:?}", formats),
                Severity::Medium,
                0.85,
            )
            .with_suggested_fix(format!("Standardize to {CANONICAL_DATE_FORMAT} format")),
        )
    }

    fn check_case_consistency(&self) -> Option<Issue> {
        let distinct: HashSet<&str> = self.non_null().collect();
        let lowered: HashSet<String> = distinct.iter().map(|v| v.to_lowercase()).collect();
        if distinct.len() == lowered.len() {
            return None;
        }

        Some(
            Issue::new(
                IssueType::Inconsistencies,
                &self.name,
                "Case inconsistencies detected in text data",
                Severity::Low,
                0.8,
            )
            .with_suggested_fix("Standardize case (e.g., title case or lowercase)"),
        )
    }

    fn check_whitespace(&self) -> Option<Issue> {
        let rows: Vec<usize> = self
            .values
            .iter()
            .enumerate()
            .filter_map(|(idx, v)| match v {
                Some(val) if val.trim() != val => Some(idx),
                _ => None,
            })
            .collect();
        if rows.is_empty() {
            return None;
        }

        Some(
            Issue::new(
                IssueType::FormatErrors,
                &self.name,
                "Leading or trailing whitespace detected",
                Severity::Low,
                0.9,
            )
            .with_rows(rows)
            .with_suggested_fix("Trim whitespace from text values"),
        )
    }
}

impl ColumnChecks for TextColumn {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn null_rows(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(idx, v)| v.is_none().then_some(idx))
            .collect()
    }

    fn missing_fix_hint(&self) -> &'static str {
        "Fill with most frequent value"
    }

    fn detect_format_issues(&self) -> Vec<Issue> {
        [
            self.check_date_formats(),
            self.check_case_consistency(),
            self.check_whitespace(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn detect_type_mismatch(&self) -> Option<Issue> {
        let mut total = 0usize;
        let mut numeric = 0usize;
        for val in self.non_null() {
            total += 1;
            if parse_numeric_string(val).is_some() {
                numeric += 1;
            }
        }

        if total == 0 || (numeric as f64 / total as f64) <= NUMERIC_TEXT_RATIO {
            return None;
        }

        Some(
            Issue::new(
                IssueType::DataTypeMismatch,
                &self.name,
                "Numeric values stored as text",
                Severity::Medium,
                0.85,
            )
            .with_suggested_fix("Convert to numeric data type"),
        )
    }
}

/// Column whose values the detector does not inspect beyond nulls
/// (temporal, boolean and nested types).
#[derive(Debug, Clone)]
pub struct OpaqueColumn {
    pub name: String,
    pub len: usize,
    pub nulls: Vec<usize>,
}

impl ColumnChecks for OpaqueColumn {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.len
    }

    fn null_rows(&self) -> Vec<usize> {
        self.nulls.clone()
    }
}

/// A dataset column tagged by inferred type.
#[derive(Debug, Clone)]
pub enum Column {
    Numeric(NumericColumn),
    Text(TextColumn),
    Temporal(OpaqueColumn),
    Other(OpaqueColumn),
}

impl Column {
    pub fn from_series(series: &Series) -> PolarsResult<Self> {
        let name = series.name().to_string();
        let column = match get_dtype_category(series.dtype()) {
            DtypeCategory::Numeric => Column::Numeric(NumericColumn {
                name,
                values: numeric_values(series)?,
            }),
            DtypeCategory::String => Column::Text(TextColumn {
                name,
                values: text_values(series)?,
            }),
            DtypeCategory::Datetime => Column::Temporal(OpaqueColumn {
                name,
                len: series.len(),
                nulls: null_row_indices(series),
            }),
            DtypeCategory::Boolean | DtypeCategory::Other => Column::Other(OpaqueColumn {
                name,
                len: series.len(),
                nulls: null_row_indices(series),
            }),
        };
        Ok(column)
    }

    pub fn checks(&self) -> &dyn ColumnChecks {
        match self {
            Column::Numeric(c) => c,
            Column::Text(c) => c,
            Column::Temporal(c) | Column::Other(c) => c,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Column::Numeric(_) => "numeric",
            Column::Text(_) => "text",
            Column::Temporal(_) => "temporal",
            Column::Other(_) => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(values: &[Option<&str>]) -> TextColumn {
        TextColumn {
            name: "t".to_string(),
            values: values.iter().map(|v| v.map(str::to_string)).collect(),
        }
    }

    #[test]
    fn test_missing_severity_thresholds() {
        let col = NumericColumn {
            name: "n".to_string(),
            values: vec![None, None, None, Some(1.0), Some(2.0)],
        };
        let issue = col.detect_missing().unwrap();
        assert_eq!(issue.severity, Severity::Critical);
        assert_eq!(issue.affected_rows, vec![0, 1, 2]);
        assert_eq!(issue.description, "3 missing values (60.0%)");
        assert_eq!(issue.suggested_fix.as_deref(), Some("Fill with median value"));

        let mut values = vec![Some(1.0); 19];
        values.push(None);
        let col = NumericColumn {
            name: "n".to_string(),
            values,
        };
        assert_eq!(col.detect_missing().unwrap().severity, Severity::Low);
    }

    #[test]
    fn test_missing_hint_by_variant() {
        let col = text(&[None, Some("a")]);
        assert_eq!(
            col.detect_missing().unwrap().suggested_fix.as_deref(),
            Some("Fill with most frequent value")
        );

        let opaque = OpaqueColumn {
            name: "d".to_string(),
            len: 2,
            nulls: vec![1],
        };
        assert_eq!(
            opaque.detect_missing().unwrap().suggested_fix.as_deref(),
            Some("Fill with appropriate default value")
        );
    }

    #[test]
    fn test_mixed_date_formats() {
        let col = text(&[
            Some("2024-01-15"),
            Some("01/16/2024"),
            Some("2024-01-17"),
            Some("not a date"),
        ]);
        let issues = col.detect_format_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, IssueType::FormatErrors);
        assert_eq!(issues[0].severity, Severity::Medium);
        assert!(issues[0].affected_rows.is_empty());
    }

    #[test]
    fn test_single_date_format_is_fine() {
        let col = text(&[Some("2024-01-15"), Some("2024-02-15"), Some("2024-03-15")]);
        assert!(col.detect_format_issues().is_empty());
    }

    #[test]
    fn test_mostly_non_dates_are_ignored() {
        let col = text(&[
            Some("2024-01-15"),
            Some("01/16/2024"),
            Some("apple"),
            Some("pear"),
            Some("plum"),
        ]);
        assert!(col.check_date_formats().is_none());
    }

    #[test]
    fn test_half_dates_are_checked() {
        let col = text(&[
            Some("2024-01-15"),
            Some("01/16/2024"),
            Some("apple"),
            Some("pear"),
        ]);
        let issue = col.check_date_formats().unwrap();
        assert_eq!(issue.issue_type, IssueType::FormatErrors);
    }

    #[test]
    fn test_case_and_whitespace() {
        let col = text(&[Some("Paris"), Some("paris"), Some(" London"), None]);
        let issues = col.detect_format_issues();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].issue_type, IssueType::Inconsistencies);
        assert_eq!(issues[1].issue_type, IssueType::FormatErrors);
        assert_eq!(issues[1].affected_rows, vec![2]);
    }

    #[test]
    fn test_type_mismatch() {
        let col = text(&[
            Some("$1,200"),
            Some("300"),
            Some("45.5"),
            Some("1,000"),
            Some("12"),
            Some("n/a"),
        ]);
        // 5 of 6 parse, 83% > 80%
        let issue = col.detect_type_mismatch().unwrap();
        assert_eq!(issue.issue_type, IssueType::DataTypeMismatch);

        let col = text(&[Some("1"), Some("2"), Some("x"), Some("y")]);
        assert!(col.detect_type_mismatch().is_none());
    }

    #[test]
    fn test_outliers_need_more_than_ten_values() {
        let col = NumericColumn {
            name: "n".to_string(),
            values: [1.0, 2.0, 3.0, 4.0, 5.0, 100.0].into_iter().map(Some).collect(),
        };
        assert!(col.detect_outliers().is_none());

        let mut values: Vec<Option<f64>> = (1..=20).map(|v| Some(v as f64)).collect();
        values.push(Some(1000.0));
        let col = NumericColumn {
            name: "n".to_string(),
            values,
        };
        let issue = col.detect_outliers().unwrap();
        assert_eq!(issue.affected_rows, vec![20]);
        assert_eq!(issue.severity, Severity::Medium);
    }

    #[test]
    fn test_outlier_severity_at_five_percent() {
        let mut values: Vec<Option<f64>> = (1..=19).map(|v| Some(v as f64)).collect();
        values.push(Some(1000.0));
        let col = NumericColumn {
            name: "n".to_string(),
            values,
        };

        // 1 of 20 is exactly 5%
        let issue = col.detect_outliers().unwrap();
        assert_eq!(issue.affected_rows, vec![19]);
        assert_eq!(issue.severity, Severity::High);
    }

    #[test]
    fn test_column_from_series() {
        let s = Series::new("n".into(), &[1i64, 2, 3]);
        assert_eq!(Column::from_series(&s).unwrap().kind(), "numeric");

        let s = Series::new("t".into(), &["a", "b"]);
        assert_eq!(Column::from_series(&s).unwrap().kind(), "text");

        let s = Series::new("b".into(), &[true, false]);
        assert_eq!(Column::from_series(&s).unwrap().kind(), "other");
    }
}
