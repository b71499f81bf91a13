//! Human-readable guidance derived from the issue types present.

use crate::types::{Issue, IssueType};

/// Closing lines appended to every recommendation list.
pub const GENERAL_RECOMMENDATIONS: [&str; 2] = [
    "Consider implementing data validation rules for future uploads",
    "Document data quality standards and expected formats",
];

/// Whether recommendations describe one dataset or merged chunk results.
///
/// Only the missing-value wording differs between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationScope {
    Dataset,
    Chunked,
}

pub struct RecommendationGenerator;

impl RecommendationGenerator {
    /// One line per distinct issue type in first-discovery order, followed by
    /// [`GENERAL_RECOMMENDATIONS`].
    pub fn generate(issues: &[Issue], scope: RecommendationScope) -> Vec<String> {
        let mut seen: Vec<IssueType> = Vec::new();
        for issue in issues {
            if !seen.contains(&issue.issue_type) {
                seen.push(issue.issue_type);
            }
        }

        let mut recommendations: Vec<String> = seen
            .into_iter()
            .map(|issue_type| Self::for_type(issue_type, issues, scope))
            .collect();
        recommendations.extend(GENERAL_RECOMMENDATIONS.iter().map(|s| s.to_string()));
        recommendations
    }

    fn for_type(issue_type: IssueType, issues: &[Issue], scope: RecommendationScope) -> String {
        match issue_type {
            IssueType::MissingValues => {
                let count = issues
                    .iter()
                    .filter(|i| i.issue_type == IssueType::MissingValues)
                    .count();
                match scope {
                    RecommendationScope::Dataset => {
                        format!("Address {count} columns with missing values")
                    }
                    RecommendationScope::Chunked => {
                        format!("Address {count} missing value issues across chunks")
                    }
                }
            }
            IssueType::Duplicates => "Remove duplicate rows to ensure data uniqueness".to_string(),
            IssueType::FormatErrors => {
                "Standardize date and text formats across columns".to_string()
            }
            IssueType::Outliers => "Review and validate outlier values for accuracy".to_string(),
            IssueType::Inconsistencies => {
                "Standardize inconsistent capitalization of categorical values".to_string()
            }
            IssueType::DataTypeMismatch => {
                "Convert numeric values stored as text to numeric columns".to_string()
            }
        }
    }
}
