use crate::types::{ComparisonSummary, DataComparison};
use crate::utils::{duplicate_row_count, total_null_count};
use polars::prelude::*;

/// Before/after summary of a fix pass.
pub fn generate_comparison(
    original: &DataFrame,
    fixed: &DataFrame,
) -> PolarsResult<DataComparison> {
    Ok(DataComparison {
        original_shape: original.shape(),
        fixed_shape: fixed.shape(),
        rows_removed: original.height().saturating_sub(fixed.height()),
        columns_compared: original
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect(),
        summary: ComparisonSummary {
            original_missing_values: total_null_count(original),
            fixed_missing_values: total_null_count(fixed),
            original_duplicates: duplicate_row_count(original)?,
            fixed_duplicates: duplicate_row_count(fixed)?,
        },
    })
}
