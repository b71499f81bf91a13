//! Statistical imputation methods.
//!
//! Median fill for numeric columns and most-frequent-value fill for text
//! columns. Each fill returns the [`DataFix`] it applied, or `None` when the
//! column had no nulls.

use crate::types::{DataFix, FixType};
use crate::utils::{
    fill_numeric_nulls, fill_string_nulls, null_row_indices, string_mode, text_values,
};
use polars::prelude::*;
use serde_json::{Value, json};
use tracing::debug;

/// Fallback fill value for text columns with no non-null values.
pub const TEXT_FALLBACK: &str = "Unknown";

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill nulls of a numeric column with its median. The column becomes
    /// `Float64`.
    pub fn fill_median(df: &mut DataFrame, column: &str) -> PolarsResult<Option<DataFix>> {
        let series = df.column(column)?.as_materialized_series().clone();
        let rows = null_row_indices(&series);
        if rows.is_empty() {
            return Ok(None);
        }
        let Some(median) = series.median() else {
            debug!("Column '{}' has no values to take a median from", column);
            return Ok(None);
        };

        df.replace(column, fill_numeric_nulls(&series, median)?)?;
        debug!("Filled {} nulls in '{}' with median {}", rows.len(), column, median);

        Ok(Some(DataFix {
            fix_type: FixType::FillMissing,
            column: column.to_string(),
            description: format!("Filled {} missing values with median: {}", rows.len(), median),
            old_values: vec![Value::Null; rows.len()],
            new_values: vec![json!(median); rows.len()],
            rows_affected: rows,
            confidence: 0.8,
            uncertainty_reason: None,
        }))
    }

    /// Fill nulls of a text column with its most frequent value, or
    /// [`TEXT_FALLBACK`] when every value is null.
    pub fn fill_mode(df: &mut DataFrame, column: &str) -> PolarsResult<Option<DataFix>> {
        let series = df.column(column)?.as_materialized_series().clone();
        let rows = null_row_indices(&series);
        if rows.is_empty() {
            return Ok(None);
        }

        let values = text_values(&series)?;
        let fill = string_mode(values.iter().flatten().map(String::as_str))
            .unwrap_or_else(|| TEXT_FALLBACK.to_string());

        df.replace(column, fill_string_nulls(&series, &fill)?)?;
        debug!("Filled {} nulls in '{}' with '{}'", rows.len(), column, fill);

        Ok(Some(DataFix {
            fix_type: FixType::FillMissing,
            column: column.to_string(),
            description: format!(
                "Filled {} missing values with most frequent: {}",
                rows.len(),
                fill
            ),
            old_values: vec![Value::Null; rows.len()],
            new_values: vec![json!(fill); rows.len()],
            rows_affected: rows,
            confidence: 0.7,
            uncertainty_reason: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fill_median() {
        let mut df = df![
            "x" => [Some(1i64), None, Some(3), None, Some(5)],
        ]
        .unwrap();

        let fix = StatisticalImputer::fill_median(&mut df, "x").unwrap().unwrap();

        assert_eq!(fix.rows_affected, vec![1, 3]);
        assert_eq!(fix.old_values, vec![Value::Null, Value::Null]);
        assert_eq!(fix.new_values, vec![json!(3.0), json!(3.0)]);
        assert_eq!(fix.confidence, 0.8);

        let filled: Vec<Option<f64>> = df
            .column("x")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(filled, vec![Some(1.0), Some(3.0), Some(3.0), Some(3.0), Some(5.0)]);
    }

    #[test]
    fn test_fill_median_without_nulls() {
        let mut df = df!["x" => [1.0, 2.0]].unwrap();
        assert!(StatisticalImputer::fill_median(&mut df, "x").unwrap().is_none());
    }

    #[test]
    fn test_fill_mode() {
        let mut df = df![
            "city" => [Some("Rome"), None, Some("Oslo"), Some("Rome")],
        ]
        .unwrap();

        let fix = StatisticalImputer::fill_mode(&mut df, "city").unwrap().unwrap();
        assert_eq!(fix.new_values, vec![json!("Rome")]);
        assert_eq!(fix.confidence, 0.7);
        assert_eq!(fix.description, "Filled 1 missing values with most frequent: Rome");
    }

    #[test]
    fn test_fill_mode_all_null_falls_back() {
        let mut df = df![
            "city" => [None::<&str>, None],
        ]
        .unwrap();

        let fix = StatisticalImputer::fill_mode(&mut df, "city").unwrap().unwrap();
        assert_eq!(fix.new_values, vec![json!(TEXT_FALLBACK), json!(TEXT_FALLBACK)]);
    }
}
