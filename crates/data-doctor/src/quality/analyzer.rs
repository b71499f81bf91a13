use crate::error::Result;
use crate::quality::column::{Column, ColumnChecks};
use crate::quality::recommendations::{RecommendationGenerator, RecommendationScope};
use crate::quality::scoring::calculate_quality_score;
use crate::types::{ALL_COLUMNS, Issue, IssueType, QualityReport, Severity};
use crate::utils::first_occurrence_mask;
use polars::prelude::*;
use tracing::debug;

pub struct DataQualityAnalyzer;

impl DataQualityAnalyzer {
    /// Detect issues, score them and derive recommendations.
    pub fn analyze_quality(df: &DataFrame) -> Result<QualityReport> {
        let issues = Self::identify_issues(df)?;
        let quality_score = calculate_quality_score(&issues, df.height());
        let recommendations =
            RecommendationGenerator::generate(&issues, RecommendationScope::Dataset);

        debug!(
            "Analyzed {} rows x {} columns: {} issues, score {:.3}",
            df.height(),
            df.width(),
            issues.len(),
            quality_score
        );

        Ok(QualityReport {
            quality_score,
            total_rows: df.height(),
            total_columns: df.width(),
            issues,
            recommendations,
        })
    }

    /// Run every detector in fixed order: missing values, duplicates, format
    /// and consistency, type mismatch, outliers.
    pub fn identify_issues(df: &DataFrame) -> Result<Vec<Issue>> {
        let columns = df
            .get_columns()
            .iter()
            .map(|col| Column::from_series(col.as_materialized_series()))
            .collect::<PolarsResult<Vec<_>>>()?;
        debug!(
            "Checking columns: {}",
            columns
                .iter()
                .map(|c| format!("{} ({})", c.checks().name(), c.kind()))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut issues = Vec::new();

        issues.extend(columns.iter().filter_map(|c| c.checks().detect_missing()));

        if let Some(issue) = Self::detect_duplicates(df)? {
            issues.push(issue);
        }

        for column in &columns {
            issues.extend(column.checks().detect_format_issues());
        }

        issues.extend(
            columns
                .iter()
                .filter_map(|c| c.checks().detect_type_mismatch()),
        );

        issues.extend(columns.iter().filter_map(|c| c.checks().detect_outliers()));

        Ok(issues)
    }

    /// Exact full-row duplicates; the first occurrence is canonical and the
    /// later ones are reported.
    fn detect_duplicates(df: &DataFrame) -> Result<Option<Issue>> {
        if df.height() == 0 || df.width() == 0 {
            return Ok(None);
        }

        let rows: Vec<usize> = first_occurrence_mask(df)?
            .into_iter()
            .enumerate()
            .filter_map(|(idx, keep)| (!keep).then_some(idx))
            .collect();
        if rows.is_empty() {
            return Ok(None);
        }

        let severity = if rows.len() as f64 > df.height() as f64 * 0.1 {
            Severity::High
        } else {
            Severity::Medium
        };

        Ok(Some(
            Issue::new(
                IssueType::Duplicates,
                ALL_COLUMNS,
                format!("{} duplicate rows found", rows.len()),
                severity,
                0.99,
            )
            .with_rows(rows)
            .with_suggested_fix("Remove duplicate rows, keeping first occurrence"),
        ))
    }
}
