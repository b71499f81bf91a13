//! Per-chunk work units.
//!
//! A [`ChunkProcessor`] turns one chunk into a [`ChunkOutput`]. Any
//! `Fn(&DataFrame) -> Result<ChunkOutput>` closure qualifies, and two
//! built-ins cover the common jobs: [`AnalyzeChunk`] and [`FixChunk`].

use crate::cleaner::FixEngine;
use crate::error::Result;
use crate::quality::DataQualityAnalyzer;
use crate::reporting::{FixReport, generate_comparison};
use crate::types::{ChunkOutput, FixRequest};
use polars::prelude::*;

/// Work run against each chunk. Shared by every worker thread.
pub trait ChunkProcessor: Send + Sync {
    /// Process one chunk. Issue row indices are chunk-local; the orchestrator
    /// rebases them onto the full source.
    fn process(&self, chunk: &DataFrame) -> Result<ChunkOutput>;
}

impl<F> ChunkProcessor for F
where
    F: Fn(&DataFrame) -> Result<ChunkOutput> + Send + Sync,
{
    fn process(&self, chunk: &DataFrame) -> Result<ChunkOutput> {
        self(chunk)
    }
}

/// Runs issue detection on each chunk. The payload is the chunk's
/// [`QualityReport`](crate::types::QualityReport).
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeChunk;

impl ChunkProcessor for AnalyzeChunk {
    fn process(&self, chunk: &DataFrame) -> Result<ChunkOutput> {
        let report = DataQualityAnalyzer::analyze_quality(chunk)?;
        let payload = serde_json::to_value(&report)?;
        Ok(ChunkOutput::new(report.issues, payload))
    }
}

/// Applies fixes to each chunk. The payload is a [`FixReport`].
#[derive(Debug, Clone)]
pub struct FixChunk {
    engine: FixEngine,
    requests: Vec<FixRequest>,
    detect_first: bool,
}

impl FixChunk {
    /// Apply the same `requests` to every chunk.
    pub fn new(engine: FixEngine, requests: Vec<FixRequest>) -> Self {
        Self {
            engine,
            requests,
            detect_first: false,
        }
    }

    /// Detect issues in each chunk and fix everything found. The detected
    /// issues are reported as the chunk's issues.
    pub fn detect_first(engine: FixEngine) -> Self {
        Self {
            engine,
            requests: Vec::new(),
            detect_first: true,
        }
    }
}

impl ChunkProcessor for FixChunk {
    fn process(&self, chunk: &DataFrame) -> Result<ChunkOutput> {
        let (issues, requests) = if self.detect_first {
            let issues = DataQualityAnalyzer::identify_issues(chunk)?;
            let requests = FixRequest::from_issues(&issues);
            (issues, requests)
        } else {
            (Vec::new(), self.requests.clone())
        };

        let (fixed, fixes_applied) = self.engine.apply_fixes(chunk, &requests)?;
        let report = FixReport {
            fixes_applied,
            comparison: generate_comparison(chunk, &fixed)?,
        };
        Ok(ChunkOutput::new(issues, serde_json::to_value(&report)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IssueType;

    #[test]
    fn test_analyze_chunk_payload_is_report() {
        let df = df!["a" => [Some(1.0), None]].unwrap();
        let output = AnalyzeChunk.process(&df).unwrap();

        assert_eq!(output.issues.len(), 1);
        assert_eq!(output.payload["total_rows"], 2);
        assert!(output.payload["quality_score"].is_number());
    }

    #[test]
    fn test_fix_chunk_with_requests() {
        let df = df!["a" => [1, 1, 2]].unwrap();
        let processor = FixChunk::new(
            FixEngine::new(),
            vec![FixRequest::new(IssueType::Duplicates, "all_columns")],
        );

        let output = processor.process(&df).unwrap();
        assert!(output.issues.is_empty());
        assert_eq!(output.payload["fixes_applied"].as_array().unwrap().len(), 1);
        assert_eq!(output.payload["comparison"]["rows_removed"], 1);
    }

    #[test]
    fn test_fix_chunk_detect_first() {
        let df = df!["name" => [Some(" x"), None, Some("y")]].unwrap();
        let output = FixChunk::detect_first(FixEngine::new()).process(&df).unwrap();

        assert_eq!(output.issues.len(), 2);
        assert_eq!(output.payload["fixes_applied"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_closure_is_a_processor() {
        let processor = |chunk: &DataFrame| -> Result<ChunkOutput> {
            Ok(ChunkOutput::new(Vec::new(), serde_json::json!(chunk.height())))
        };
        let df = df!["a" => [1, 2, 3]].unwrap();
        assert_eq!(processor.process(&df).unwrap().payload, 3);
    }
}
