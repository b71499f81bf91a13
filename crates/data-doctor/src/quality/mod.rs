//! Data quality analysis module.
//!
//! This module finds data quality issues (missing values, duplicates, format
//! errors, case inconsistencies, numeric text and outliers), scores them and
//! turns them into recommendations.

mod analyzer;
pub mod column;
pub mod dates;
pub mod recommendations;
pub mod scoring;

pub use analyzer::DataQualityAnalyzer;
pub use column::{Column, ColumnChecks};
pub use recommendations::{RecommendationGenerator, RecommendationScope};
pub use scoring::calculate_quality_score;
