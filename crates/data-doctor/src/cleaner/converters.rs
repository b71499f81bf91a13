//! Type conversion functions for data cleaning.

use crate::types::{DataFix, FixType};
use crate::utils::{parse_numeric_string, text_values};
use polars::prelude::*;
use serde_json::{Value, json};
use tracing::debug;

/// Convert a text column holding formatted numbers to `Float64`.
///
/// Thousands separators and currency symbols are stripped before parsing.
/// Values that still do not parse become null and are reported with a null
/// new value.
pub(crate) fn convert_to_numeric(
    df: &mut DataFrame,
    column: &str,
) -> PolarsResult<Option<DataFix>> {
    let series = df.column(column)?.as_materialized_series().clone();
    let values = text_values(&series)?;

    let mut converted: Vec<Option<f64>> = Vec::with_capacity(values.len());
    let mut rows_affected = Vec::new();
    let mut old_values = Vec::new();
    let mut new_values = Vec::new();
    let mut unparsed = 0usize;

    for (idx, value) in values.iter().enumerate() {
        let Some(raw) = value else {
            converted.push(None);
            continue;
        };
        let parsed = parse_numeric_string(raw);
        if parsed.is_none() {
            unparsed += 1;
        }
        rows_affected.push(idx);
        old_values.push(json!(raw));
        new_values.push(parsed.map_or(Value::Null, |v| json!(v)));
        converted.push(parsed);
    }

    if rows_affected.is_empty() {
        return Ok(None);
    }

    df.replace(column, Series::new(series.name().clone(), converted))?;
    debug!(
        "Converted '{}' to Float64 ({} values could not be parsed)",
        column, unparsed
    );

    Ok(Some(DataFix {
        fix_type: FixType::ConvertType,
        column: column.to_string(),
        description: "Converted numeric text to Float64".to_string(),
        rows_affected,
        old_values,
        new_values,
        confidence: 0.85,
        uncertainty_reason: (unparsed > 0)
            .then(|| format!("{unparsed} values could not be parsed and were set to null")),
    }))
}
