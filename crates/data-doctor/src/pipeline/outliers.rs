//! Outlier handling module.
//!
//! Contains the IQR computation shared by outlier detection and outlier
//! capping. Quartiles use linear interpolation between closest ranks.

use crate::types::{DataFix, FixType};
use crate::utils::numeric_values;
use polars::prelude::*;
use serde_json::json;
use tracing::debug;

/// Multiplier applied to the IQR to get the fences.
pub const IQR_FENCE: f64 = 1.5;

/// Upper bound on clip-and-recompute passes in [`OutlierHandler::cap_outliers`].
pub const MAX_CAP_PASSES: usize = 256;

/// Quantile `q` of already sorted values, by linear interpolation.
///
/// Returns `None` for an empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Interquartile range fences of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// Compute fences over the finite values. Returns `None` when there are
    /// none.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile(&sorted, 0.25)?;
        let q3 = quantile(&sorted, 0.75)?;
        let iqr = q3 - q1;
        Some(Self {
            q1,
            q3,
            iqr,
            lower: q1 - IQR_FENCE * iqr,
            upper: q3 + IQR_FENCE * iqr,
        })
    }

    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }
}

/// Detects and caps outliers in numeric columns.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Row indices whose value lies outside the IQR fences, along with the
    /// fences themselves.
    pub fn find_outliers(values: &[Option<f64>]) -> Option<(IqrBounds, Vec<usize>)> {
        let bounds = IqrBounds::from_values(values.iter().flatten().copied())?;
        let rows = values
            .iter()
            .enumerate()
            .filter_map(|(idx, v)| match v {
                Some(val) if bounds.is_outlier(*val) => Some(idx),
                _ => None,
            })
            .collect();
        Some((bounds, rows))
    }

    /// Clip out-of-range values of `column` to the IQR fences.
    ///
    /// Clipping pulls in the quartiles when outliers sit at a quartile
    /// position, so fences are recomputed and values clipped again until no
    /// value lies outside them. Values are capped, never removed. The
    /// resulting column is `Float64`. Returns `None` when nothing changed.
    pub fn cap_outliers(df: &mut DataFrame, column: &str) -> PolarsResult<Option<DataFix>> {
        let series = df.column(column)?.as_materialized_series().clone();
        let original = numeric_values(&series)?;

        let mut capped = original.clone();
        let mut touched = vec![false; capped.len()];
        let mut last_bounds = None;
        for _ in 0..MAX_CAP_PASSES {
            let Some((bounds, rows)) = Self::find_outliers(&capped) else {
                break;
            };
            if rows.is_empty() {
                break;
            }
            for row in rows {
                if let Some(value) = capped[row] {
                    capped[row] = Some(bounds.clamp(value));
                    touched[row] = true;
                }
            }
            last_bounds = Some(bounds);
        }
        let Some(bounds) = last_bounds else {
            return Ok(None);
        };

        let rows: Vec<usize> = touched
            .iter()
            .enumerate()
            .filter_map(|(idx, t)| t.then_some(idx))
            .collect();
        let old_values = rows.iter().map(|&r| json!(original[r])).collect();
        let new_values = rows.iter().map(|&r| json!(capped[r])).collect();

        df.replace(column, Series::new(series.name().clone(), capped))?;
        debug!(
            "Capped {} outliers in '{}' to [{:.2}, {:.2}]",
            rows.len(),
            column,
            bounds.lower,
            bounds.upper
        );

        Ok(Some(DataFix {
            fix_type: FixType::CorrectOutlier,
            column: column.to_string(),
            description: format!(
                "Capped outliers to range [{:.2}, {:.2}]",
                bounds.lower, bounds.upper
            ),
            rows_affected: rows,
            old_values,
            new_values,
            confidence: 0.6,
            uncertainty_reason: Some(
                "Statistical capping may not reflect true data values".to_string(),
            ),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        assert_eq!(quantile(&sorted, 0.25), Some(2.25));
        assert_eq!(quantile(&sorted, 0.75), Some(4.75));
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[7.0], 0.25), Some(7.0));
    }

    #[test]
    fn test_iqr_bounds_flag_only_extreme_value() {
        let values = vec![
            Some(1.0),
            Some(2.0),
            Some(3.0),
            Some(4.0),
            Some(5.0),
            Some(100.0),
        ];
        let (bounds, rows) = OutlierHandler::find_outliers(&values).unwrap();

        assert_eq!(bounds.q1, 2.25);
        assert_eq!(bounds.q3, 4.75);
        assert_eq!(bounds.iqr, 2.5);
        assert_eq!(bounds.upper, 8.5);
        assert_eq!(rows, vec![5]);
    }

    #[test]
    fn test_find_outliers_skips_nulls() {
        let values = vec![None, Some(1.0), Some(2.0), None];
        let (_, rows) = OutlierHandler::find_outliers(&values).unwrap();
        assert!(rows.is_empty());
        assert!(OutlierHandler::find_outliers(&[None, None]).is_none());
    }

    #[test]
    fn test_cap_outliers_clips_and_records() {
        let mut df = df![
            "value" => [1.0, 2.0, 3.0, 4.0, 5.0, 100.0],
        ]
        .unwrap();

        let fix = OutlierHandler::cap_outliers(&mut df, "value").unwrap().unwrap();

        assert_eq!(df.height(), 6);
        assert_eq!(fix.fix_type, FixType::CorrectOutlier);
        assert_eq!(fix.rows_affected, vec![5]);
        assert_eq!(fix.old_values, vec![json!(100.0)]);
        assert_eq!(fix.new_values, vec![json!(8.5)]);
        assert_eq!(fix.confidence, 0.6);
        assert!(fix.uncertainty_reason.is_some());

        let capped: Vec<Option<f64>> = df
            .column("value")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(capped[5], Some(8.5));
        assert_eq!(capped[0], Some(1.0));
    }

    #[test]
    fn test_cap_outliers_is_idempotent() {
        let mut df = df![
            "value" => [1.0, 2.0, 3.0, 4.0, 5.0, 100.0],
        ]
        .unwrap();

        assert!(OutlierHandler::cap_outliers(&mut df, "value").unwrap().is_some());
        assert!(OutlierHandler::cap_outliers(&mut df, "value").unwrap().is_none());
    }

    #[test]
    fn test_cap_outliers_settles_when_quartile_moves() {
        // Q3 interpolates into the outlier block, so one clip is not enough
        let values: Vec<f64> = (1..=9)
            .map(f64::from)
            .chain([100.0, 101.0, 102.0])
            .collect();
        let mut df = df!["value" => values].unwrap();

        let fix = OutlierHandler::cap_outliers(&mut df, "value").unwrap().unwrap();
        assert_eq!(fix.rows_affected, vec![9, 10, 11]);
        assert_eq!(
            fix.old_values,
            vec![json!(100.0), json!(101.0), json!(102.0)]
        );
        for new in &fix.new_values {
            let new = new.as_f64().unwrap();
            assert!((new - 30.0).abs() < 1e-6, "capped to {new}");
        }

        assert!(OutlierHandler::cap_outliers(&mut df, "value").unwrap().is_none());
        let column = df.column("value").unwrap().as_materialized_series().clone();
        let (_, rows) = OutlierHandler::find_outliers(&numeric_values(&column).unwrap()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_cap_outliers_without_outliers() {
        let mut df = df![
            "value" => [10, 11, 12, 13, 14],
        ]
        .unwrap();
        assert!(OutlierHandler::cap_outliers(&mut df, "value").unwrap().is_none());
    }
}
