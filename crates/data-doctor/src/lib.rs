//! Data Quality Analysis Library
//!
//! Detects data quality problems in tabular datasets, scores them, and
//! repairs them, either on a whole in-memory table or chunk by chunk on a
//! worker pool. Built with Rust and Polars.
//!
//! # Overview
//!
//! - **Issue Detection**: missing values, duplicate rows, mixed date formats,
//!   stray whitespace, inconsistent capitalization, numbers stored as text and
//!   IQR outliers
//! - **Quality Scoring**: a single `[0, 1]` score weighted by severity
//! - **Fixes**: median/mode imputation, duplicate removal, whitespace trimming,
//!   case standardization and numeric conversion, each recorded as a
//!   [`DataFix`] with before/after values
//! - **Chunked Processing**: row-range reads dispatched to a bounded worker
//!   pool, with per-chunk failure isolation, progress reporting and
//!   cancellation
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use data_doctor::{DataQualityAnalyzer, FixEngine, FixRequest, FileReader, DatasetReader};
//!
//! let df = FileReader::new().load("data.csv".as_ref())?;
//! let report = DataQualityAnalyzer::analyze_quality(&df)?;
//! println!("Quality score: {:.2}", report.quality_score);
//!
//! let requests = FixRequest::from_issues(&report.issues);
//! let (fixed, fixes) = FixEngine::new().apply_fixes(&df, &requests)?;
//! ```
//!
//! # Chunked Processing
//!
//! ```rust,ignore
//! use data_doctor::{AnalyzeChunk, CancellationToken, ChunkedProcessor, PipelineConfig};
//! use std::sync::Arc;
//!
//! let config = PipelineConfig::builder()
//!     .chunk_size(50_000)
//!     .max_workers(4)
//!     .build()?;
//!
//! let token = CancellationToken::new();
//! let processor = ChunkedProcessor::builder()
//!     .config(config)
//!     .cancellation_token(token.clone())
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.percent, update.message);
//!     })
//!     .build()?;
//!
//! let aggregate = processor.process_large_file("big.csv", Arc::new(AnalyzeChunk))?;
//! match aggregate.success {
//!     true => println!("{} issues", aggregate.issues.len()),
//!     false => println!("failed: {:?}", aggregate.error),
//! }
//! ```
//!
//! Any `Fn(&DataFrame) -> Result<ChunkOutput>` closure can stand in for
//! [`AnalyzeChunk`]; see [`ChunkProcessor`].

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod io;
pub mod pipeline;
pub mod quality;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::FixEngine;
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{QualityError, Result as QualityResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use io::{DataFormat, DatasetReader, FileReader};
pub use pipeline::{
    AnalyzeChunk, CancellationToken, ChunkProcessor, ChunkedProcessor, ChunkedProcessorBuilder,
    ClosureProgressReporter, FixChunk, OutlierHandler, ProgressReporter, ProgressUpdate,
    WorkerPool, combine_chunk_results,
};
pub use quality::{DataQualityAnalyzer, calculate_quality_score};
pub use reporting::{FixReport, generate_comparison};
pub use types::{
    AggregateResult, ChunkOutput, ChunkRange, ChunkResult, DataComparison, DataFix, FixRequest,
    FixType, Issue, IssueType, QualityReport, Severity,
};
pub use utils::{DtypeCategory, get_dtype_category, parse_numeric_string};
