//! Shared utilities for the data quality pipeline.
//!
//! This module contains common helper functions used across the detector,
//! the fix engine and the comparison report.

use polars::prelude::*;
use std::collections::{HashMap, HashSet};

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for quality analysis purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date, datetime or time types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Thousands separators and currency symbols stripped before numeric parsing.
pub const NUMERIC_FORMAT_CHARS: [char; 5] = [',', '$', '€', '£', '¥'];

/// Clean a string for numeric parsing by removing formatting characters.
///
/// ```rust,ignore
/// assert_eq!(clean_numeric_string("$1,234.56"), "1234.56");
/// ```
pub fn clean_numeric_string(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !NUMERIC_FORMAT_CHARS.contains(c))
        .collect()
}

/// Try to parse a string as a numeric value (f64).
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

// =============================================================================
// Series Utilities
// =============================================================================

/// Indices of null entries in a Series.
pub fn null_row_indices(series: &Series) -> Vec<usize> {
    series
        .is_null()
        .into_iter()
        .enumerate()
        .filter_map(|(idx, is_null)| is_null.unwrap_or(false).then_some(idx))
        .collect()
}

/// Values of a Series as optional floats.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    Ok(float_series.f64()?.into_iter().collect())
}

/// Values of a Series as optional owned strings.
pub fn text_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let str_series = if series.dtype() == &DataType::String {
        series.clone()
    } else {
        series.cast(&DataType::String)?
    };
    Ok(str_series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Most frequent non-null value. Ties resolve to the lexicographically
/// smallest value so the result does not depend on hashing order.
pub fn string_mode<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut value_counts: HashMap<&str, usize> = HashMap::new();
    for val in values {
        *value_counts.entry(val).or_insert(0) += 1;
    }

    value_counts
        .into_iter()
        .max_by(|(a_val, a_count), (b_val, b_count)| {
            a_count.cmp(b_count).then_with(|| b_val.cmp(a_val))
        })
        .map(|(val, _)| val.to_string())
}

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always `Float64`.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let filled: Vec<Option<f64>> = numeric_values(series)?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a string Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let filled: Vec<Option<String>> = text_values(series)?
        .into_iter()
        .map(|v| Some(v.unwrap_or_else(|| fill_value.to_string())))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// DataFrame Utilities
// =============================================================================

/// Keep-first mask over the rows of a DataFrame: `true` for the first
/// occurrence of each distinct row, `false` for exact repeats.
pub fn first_occurrence_mask(df: &DataFrame) -> PolarsResult<Vec<bool>> {
    let height = df.height();
    let mut keys = vec![String::new(); height];

    for col in df.get_columns() {
        let series = col.as_materialized_series();
        for (idx, key) in keys.iter_mut().enumerate() {
            let value = series.get(idx)?;
            key.push_str(&format!("{value:?}"));
            key.push('\u{1f}');
        }
    }

    let mut seen = HashSet::with_capacity(height);
    Ok(keys.into_iter().map(|key| seen.insert(key)).collect())
}

/// Number of rows that repeat an earlier row exactly.
pub fn duplicate_row_count(df: &DataFrame) -> PolarsResult<usize> {
    Ok(first_occurrence_mask(df)?.iter().filter(|keep| !**keep).count())
}

/// Total number of null cells in a DataFrame.
pub fn total_null_count(df: &DataFrame) -> usize {
    df.get_columns().iter().map(|col| col.null_count()).sum()
}

// =============================================================================
// Tests
// =============================================================================
