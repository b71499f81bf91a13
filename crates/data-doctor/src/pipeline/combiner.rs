use crate::quality::{RecommendationGenerator, RecommendationScope, calculate_quality_score};
use crate::types::{AggregateResult, ChunkResult};

/// Error text when no chunk produced a result.
pub const ALL_CHUNKS_FAILED: &str = "All chunks failed to process";

/// Merge per-chunk results into one aggregate.
///
/// Chunks are considered in index order regardless of completion order. A
/// chunk succeeded when it carries a result. Issues of successful chunks are
/// concatenated and rescored against the rows those chunks processed;
/// failed chunks only contribute their error text.
pub fn combine_chunk_results(mut results: Vec<ChunkResult>) -> AggregateResult {
    results.sort_by_key(|r| r.chunk_index);

    let total_chunks = results.len();
    let (successful, failed): (Vec<ChunkResult>, Vec<ChunkResult>) =
        results.into_iter().partition(ChunkResult::succeeded);

    let chunk_errors: Vec<String> = failed
        .iter()
        .map(|r| {
            format!(
                "chunk {} {}: {}",
                r.chunk_index,
                r.row_range,
                r.error.as_deref().unwrap_or("no result")
            )
        })
        .collect();

    if successful.is_empty() {
        return AggregateResult {
            success: false,
            total_chunks,
            failed_chunks: failed.len(),
            error: Some(ALL_CHUNKS_FAILED.to_string()),
            chunk_errors,
            ..AggregateResult::default()
        };
    }

    let total_rows_processed: usize = successful.iter().map(|r| r.rows_processed).sum();
    let total_processing_time: f64 = successful.iter().map(|r| r.processing_time).sum();
    let average_chunk_time = total_processing_time / successful.len() as f64;
    let successful_chunks = successful.len();

    let issues: Vec<_> = successful.into_iter().flat_map(|r| r.issues).collect();
    let quality_score = calculate_quality_score(&issues, total_rows_processed);
    let recommendations = RecommendationGenerator::generate(&issues, RecommendationScope::Chunked);

    AggregateResult {
        success: true,
        total_chunks,
        successful_chunks,
        failed_chunks: failed.len(),
        total_rows_processed,
        issues,
        quality_score,
        recommendations,
        total_processing_time,
        average_chunk_time,
        error: None,
        chunk_errors,
    }
}
