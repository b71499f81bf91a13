//! Shared record types: detected issues, applied fixes, reports and chunk
//! envelopes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column name used by issues and fixes that span every column.
pub const ALL_COLUMNS: &str = "all_columns";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    MissingValues,
    Duplicates,
    FormatErrors,
    Outliers,
    Inconsistencies,
    DataTypeMismatch,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingValues => "missing_values",
            Self::Duplicates => "duplicates",
            Self::FormatErrors => "format_errors",
            Self::Outliers => "outliers",
            Self::Inconsistencies => "inconsistencies",
            Self::DataTypeMismatch => "data_type_mismatch",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Penalty weight used by the quality score.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Low => 0.1,
            Self::Medium => 0.3,
            Self::High => 0.6,
            Self::Critical => 1.0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single detected data-quality problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub issue_type: IssueType,
    /// Column name, or [`ALL_COLUMNS`] for dataset-wide issues.
    pub column: String,
    pub description: String,
    /// Row indices showing the problem. Empty when enumerating them is not
    /// meaningful (e.g. mixed date formats).
    pub affected_rows: Vec<usize>,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
    /// Detection confidence in [0, 1].
    pub confidence: f64,
}

impl Issue {
    pub fn new(
        issue_type: IssueType,
        column: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        confidence: f64,
    ) -> Self {
        Self {
            issue_type,
            column: column.into(),
            description: description.into(),
            affected_rows: Vec::new(),
            severity,
            suggested_fix: None,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn with_rows(mut self, rows: Vec<usize>) -> Self {
        self.affected_rows = rows;
        self
    }

    pub fn with_suggested_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }

    /// Shift every affected row by `offset`, turning chunk-local indices into
    /// indices of the full source.
    pub(crate) fn rebase(mut self, offset: usize) -> Self {
        if offset > 0 {
            for row in &mut self.affected_rows {
                *row += offset;
            }
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixType {
    FillMissing,
    RemoveDuplicates,
    StandardizeFormat,
    CorrectOutlier,
    ConvertType,
    StandardizeCase,
}

/// A recorded, applied remediation.
///
/// `old_values` and `new_values` are parallel to `rows_affected`. Row indices
/// refer to the dataset as it was when this fix ran; fixes that remove rows
/// report a count in the description instead of indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFix {
    pub fix_type: FixType,
    pub column: String,
    pub description: String,
    pub rows_affected: Vec<usize>,
    pub old_values: Vec<serde_json::Value>,
    pub new_values: Vec<serde_json::Value>,
    /// How mechanically certain the remediation is, in [0, 1].
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncertainty_reason: Option<String>,
}

/// The part of an issue the fix engine needs: what kind of problem, where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixRequest {
    pub issue_type: IssueType,
    pub column: String,
}

impl FixRequest {
    pub fn new(issue_type: IssueType, column: impl Into<String>) -> Self {
        Self {
            issue_type,
            column: column.into(),
        }
    }

    pub fn from_issues(issues: &[Issue]) -> Vec<FixRequest> {
        issues.iter().map(FixRequest::from).collect()
    }
}

impl From<&Issue> for FixRequest {
    fn from(issue: &Issue) -> Self {
        Self::new(issue.issue_type, issue.column.clone())
    }
}

/// Result of a whole-dataset quality analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub quality_score: f64,
    pub total_rows: usize,
    pub total_columns: usize,
    pub issues: Vec<Issue>,
    pub recommendations: Vec<String>,
}

/// Before/after comparison of a fix pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataComparison {
    pub original_shape: (usize, usize),
    pub fixed_shape: (usize, usize),
    pub rows_removed: usize,
    pub columns_compared: Vec<String>,
    pub summary: ComparisonSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub original_missing_values: usize,
    pub fixed_missing_values: usize,
    pub original_duplicates: usize,
    pub fixed_duplicates: usize,
}

/// Half-open row range `[start, end)` covered by one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRange {
    pub start: usize,
    pub end: usize,
}

impl ChunkRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for ChunkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// What a chunk processor hands back for one chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkOutput {
    /// Issues found in the chunk, with chunk-local row indices.
    pub issues: Vec<Issue>,
    /// Processor-specific payload.
    pub payload: serde_json::Value,
}

impl ChunkOutput {
    pub fn new(issues: Vec<Issue>, payload: serde_json::Value) -> Self {
        Self { issues, payload }
    }
}

/// Envelope for one processed chunk.
///
/// `result` is present when the chunk succeeded. Failed chunks carry the
/// error text instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkResult {
    pub chunk_index: usize,
    pub row_range: ChunkRange,
    pub rows_processed: usize,
    pub result: Option<serde_json::Value>,
    pub issues: Vec<Issue>,
    /// Processing time in seconds.
    pub processing_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChunkResult {
    pub fn succeeded(&self) -> bool {
        self.result.is_some()
    }

    pub(crate) fn failed(
        chunk_index: usize,
        row_range: ChunkRange,
        error: impl Into<String>,
    ) -> Self {
        Self {
            chunk_index,
            row_range,
            rows_processed: 0,
            result: None,
            issues: Vec::new(),
            processing_time: 0.0,
            error: Some(error.into()),
        }
    }
}

/// Merged outcome of every chunk of one large-file run.
///
/// When no chunk succeeded, `success` is false, `error` is set and the
/// aggregate fields are left at their zero values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateResult {
    pub success: bool,
    pub total_chunks: usize,
    pub successful_chunks: usize,
    pub failed_chunks: usize,
    pub total_rows_processed: usize,
    pub issues: Vec<Issue>,
    pub quality_score: f64,
    pub recommendations: Vec<String>,
    /// Sum of per-chunk processing time, in seconds.
    pub total_processing_time: f64,
    pub average_chunk_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Error text of each failed chunk, in chunk order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chunk_errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_type_serializes_snake_case() {
        let json = serde_json::to_string(&IssueType::DataTypeMismatch).unwrap();
        assert_eq!(json, "\"data_type_mismatch\"");
        assert_eq!(IssueType::MissingValues.to_string(), "missing_values");
    }

    #[test]
    fn test_severity_ordering_and_weights() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Medium > Severity::Low);
        assert_eq!(Severity::High.weight(), 0.6);
    }

    #[test]
    fn test_issue_rebase_shifts_rows() {
        let issue = Issue::new(IssueType::MissingValues, "a", "2 missing", Severity::Low, 0.95)
            .with_rows(vec![0, 3]);
        assert_eq!(issue.rebase(10).affected_rows, vec![10, 13]);
    }

    #[test]
    fn test_fix_request_from_json_descriptor() {
        let json = r#"[{"issue_type": "outliers", "column": "price"}]"#;
        let requests: Vec<FixRequest> = serde_json::from_str(json).unwrap();
        assert_eq!(requests, vec![FixRequest::new(IssueType::Outliers, "price")]);
    }

    #[test]
    fn test_chunk_range_len() {
        let range = ChunkRange { start: 20, end: 25 };
        assert_eq!(range.len(), 5);
        assert_eq!(range.to_string(), "[20, 25)");
    }
}
