//! Fix engine for repairing detected data quality issues.
//!
//! This module provides functionality for:
//! - Filling missing values (median for numbers, most frequent value for text)
//! - Removing duplicate rows
//! - Trimming whitespace from text columns
//! - Capping outliers to the IQR fences
//! - Optionally converting numeric text and standardizing case
//!
//! The engine always works on a copy of the caller's dataset and returns one
//! [`DataFix`] per remediation that changed something.

mod converters;
mod sanitizers;

use crate::config::PipelineConfig;
use crate::error::{Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::pipeline::outliers::OutlierHandler;
use crate::types::{ALL_COLUMNS, DataFix, FixRequest, FixType, IssueType};
use crate::utils::{DtypeCategory, first_occurrence_mask, get_dtype_category};
use polars::prelude::*;
use tracing::{debug, info};

/// Applies fix requests to a dataset.
#[derive(Debug, Clone, Default)]
pub struct FixEngine {
    convert_numeric_text: bool,
    standardize_case: bool,
}

impl FixEngine {
    /// Engine with the optional remediations disabled.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            convert_numeric_text: config.convert_numeric_text,
            standardize_case: config.standardize_case,
        }
    }

    /// Apply `requests` to a copy of `df`.
    ///
    /// Column-level requests run in the given order; duplicate removal runs
    /// last, since filling, trimming or capping can turn distinct rows into
    /// repeats. Requests whose type has no remediation, or that name a missing
    /// column or one of the wrong type, are skipped. Running the same requests
    /// on the returned dataset yields no further fixes.
    pub fn apply_fixes(
        &self,
        df: &DataFrame,
        requests: &[FixRequest],
    ) -> Result<(DataFrame, Vec<DataFix>)> {
        let mut fixed = df.clone();
        let mut fixes = Vec::new();

        let (dedupe, per_column): (Vec<&FixRequest>, Vec<&FixRequest>) = requests
            .iter()
            .partition(|r| r.issue_type == IssueType::Duplicates);

        for request in per_column.into_iter().chain(dedupe) {
            let applied = self
                .apply_one(&mut fixed, request)
                .context(format!("Fixing {} in '{}'", request.issue_type, request.column))?;
            if let Some(fix) = applied {
                fixes.push(fix);
            }
        }

        info!(
            "Applied {} of {} requested fixes ({} -> {} rows)",
            fixes.len(),
            requests.len(),
            df.height(),
            fixed.height()
        );
        Ok((fixed, fixes))
    }

    fn apply_one(&self, df: &mut DataFrame, request: &FixRequest) -> PolarsResult<Option<DataFix>> {
        if request.issue_type == IssueType::Duplicates {
            return remove_duplicates(df);
        }

        let column = request.column.as_str();
        let Some(category) = df
            .column(column)
            .ok()
            .map(|col| get_dtype_category(col.dtype()))
        else {
            debug!(
                "Skipping {} fix: column '{}' not in dataset",
                request.issue_type, column
            );
            return Ok(None);
        };

        match (request.issue_type, category) {
            (IssueType::MissingValues, DtypeCategory::Numeric) => {
                StatisticalImputer::fill_median(df, column)
            }
            (IssueType::MissingValues, DtypeCategory::String) => {
                StatisticalImputer::fill_mode(df, column)
            }
            (IssueType::FormatErrors, DtypeCategory::String) => {
                sanitizers::trim_whitespace(df, column)
            }
            (IssueType::Outliers, DtypeCategory::Numeric) => {
                OutlierHandler::cap_outliers(df, column)
            }
            (IssueType::DataTypeMismatch, DtypeCategory::String) if self.convert_numeric_text => {
                converters::convert_to_numeric(df, column)
            }
            (IssueType::Inconsistencies, DtypeCategory::String) if self.standardize_case => {
                sanitizers::standardize_case(df, column)
            }
            (issue_type, category) => {
                debug!(
                    "No remediation for {} on '{}' ({:?})",
                    issue_type, column, category
                );
                Ok(None)
            }
        }
    }
}

/// Drop exact repeats of earlier rows, keeping row order.
fn remove_duplicates(df: &mut DataFrame) -> PolarsResult<Option<DataFix>> {
    let mask = first_occurrence_mask(df)?;
    let removed = mask.iter().filter(|keep| !**keep).count();
    if removed == 0 {
        return Ok(None);
    }

    *df = df.filter(&BooleanChunked::from_slice("mask".into(), &mask))?;
    debug!("Removed {} duplicate rows", removed);

    Ok(Some(DataFix {
        fix_type: FixType::RemoveDuplicates,
        column: ALL_COLUMNS.to_string(),
        description: format!("Removed {removed} duplicate rows"),
        rows_affected: Vec::new(),
        old_values: Vec::new(),
        new_values: Vec::new(),
        confidence: 0.99,
        uncertainty_reason: None,
    }))
}
