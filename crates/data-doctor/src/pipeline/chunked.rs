//! Chunk orchestrator for large datasets.
//!
//! This module provides the `ChunkedProcessor` and its builder. A run splits
//! the source into fixed-size row ranges, queues one unit per range on the
//! worker pool, reports progress as units finish and merges the results.

use crate::config::PipelineConfig;
use crate::error::{QualityError, Result, ResultExt};
use crate::io::{DatasetReader, FileReader};
use crate::pipeline::combiner::combine_chunk_results;
use crate::pipeline::pool::WorkerPool;
use crate::pipeline::processors::ChunkProcessor;
use crate::pipeline::progress::{
    CancellationToken, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::types::{AggregateResult, ChunkRange, ChunkResult};
use polars::prelude::SchemaRef;
use serde_json::json;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Splits large datasets into chunks and processes them on a worker pool.
///
/// Use [`ChunkedProcessor::builder()`] to create one. The pool is created
/// once and reused by every call to
/// [`process_large_file`](Self::process_large_file), including concurrent
/// calls from several threads.
///
/// # Example
///
/// ```rust,ignore
/// use data_doctor::{AnalyzeChunk, ChunkedProcessor, PipelineConfig};
/// use std::sync::Arc;
///
/// let processor = ChunkedProcessor::builder()
///     .config(PipelineConfig::builder().chunk_size(50_000).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.percent, update.message);
///     })
///     .build()?;
///
/// let result = processor.process_large_file("events.csv", Arc::new(AnalyzeChunk))?;
/// println!("score {:.2} over {} rows", result.quality_score, result.total_rows_processed);
/// ```
pub struct ChunkedProcessor {
    config: PipelineConfig,
    reader: Arc<dyn DatasetReader>,
    pool: WorkerPool,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cancellation_token: CancellationToken,
}

// Shared between caller threads
static_assertions::assert_impl_all!(ChunkedProcessor: Send, Sync);

impl ChunkedProcessor {
    /// Create a new processor builder.
    pub fn builder() -> ChunkedProcessorBuilder {
        ChunkedProcessorBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn worker_count(&self) -> usize {
        self.pool.size()
    }

    /// Half-open ranges covering `total_rows` rows, `chunk_size` rows each
    /// except possibly the last.
    pub fn chunk_ranges(total_rows: usize, chunk_size: usize) -> Vec<ChunkRange> {
        if chunk_size == 0 {
            return Vec::new();
        }
        (0..total_rows.div_ceil(chunk_size))
            .map(|idx| ChunkRange {
                start: idx * chunk_size,
                end: ((idx + 1) * chunk_size).min(total_rows),
            })
            .collect()
    }

    /// Process `path` chunk by chunk with `processor`.
    ///
    /// Per-chunk failures are recorded in the aggregate and do not abort the
    /// run. Failing to count rows or to queue work does, as does
    /// cancellation, which is reported once every queued unit has drained.
    ///
    /// # Errors
    ///
    /// Returns `Err(QualityError::Cancelled)` if the token was cancelled
    /// during the run.
    pub fn process_large_file(
        &self,
        path: impl AsRef<Path>,
        processor: Arc<dyn ChunkProcessor>,
    ) -> Result<AggregateResult> {
        let path = path.as_ref();
        let started = Instant::now();
        self.check_cancelled()?;

        let total_rows = self
            .reader
            .count_rows(path)
            .context(format!("Counting rows of {}", path.display()))?;
        let ranges = Self::chunk_ranges(total_rows, self.config.chunk_size);
        let total_chunks = ranges.len();
        let schema = if total_chunks > 0 {
            self.reader
                .schema(path)
                .context(format!("Inferring schema of {}", path.display()))?
        } else {
            None
        };

        info!(
            "Processing {} ({} rows) in {} chunks of {} rows on {} workers",
            path.display(),
            total_rows,
            total_chunks,
            self.config.chunk_size,
            self.pool.size()
        );

        let (results_tx, results_rx) = mpsc::channel::<ChunkResult>();
        for (chunk_index, range) in ranges.into_iter().enumerate() {
            let unit = ChunkUnit {
                chunk_index,
                range,
                path: path.to_path_buf(),
                schema: schema.clone(),
                reader: Arc::clone(&self.reader),
                processor: Arc::clone(&processor),
                cancellation_token: self.cancellation_token.clone(),
            };
            let results_tx = results_tx.clone();
            self.pool.submit(move || {
                // Receiver gone means the run already failed
                let _ = results_tx.send(unit.run());
            })?;
        }
        drop(results_tx);

        let mut results = Vec::with_capacity(total_chunks);
        for chunks_done in 1..=total_chunks {
            let result = results_rx.recv().map_err(|_| {
                QualityError::WorkerPool(format!(
                    "result channel closed after {} of {} chunks",
                    chunks_done - 1,
                    total_chunks
                ))
            })?;

            let message = match &result.error {
                None => format!(
                    "Chunk {} {} done in {:.3}s",
                    result.chunk_index, result.row_range, result.processing_time
                ),
                Some(err) => format!(
                    "Chunk {} {} failed: {}",
                    result.chunk_index, result.row_range, err
                ),
            };
            info!(
                "Completed chunk {}/{} ({:.1}%)",
                chunks_done,
                total_chunks,
                chunks_done as f64 / total_chunks as f64 * 100.0
            );
            self.report_progress(ProgressUpdate::chunk_finished(
                chunks_done,
                total_chunks,
                result.chunk_index,
                message,
            ));
            results.push(result);
        }

        self.check_cancelled()?;

        let aggregate = combine_chunk_results(results);
        if aggregate.success {
            info!(
                "Finished {} in {:.2}s: {}/{} chunks succeeded, score {:.3}",
                path.display(),
                started.elapsed().as_secs_f64(),
                aggregate.successful_chunks,
                aggregate.total_chunks,
                aggregate.quality_score
            );
        } else {
            error!(
                "Processing {} failed: {}",
                path.display(),
                aggregate.error.as_deref().unwrap_or("unknown error")
            );
        }
        Ok(aggregate)
    }

    /// Stop the worker pool. Further runs fail with a worker pool error.
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancellation_token.is_cancelled() {
            return Err(QualityError::Cancelled);
        }
        Ok(())
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }
}

/// Everything one chunk needs, moved onto a worker.
struct ChunkUnit {
    chunk_index: usize,
    range: ChunkRange,
    path: PathBuf,
    schema: Option<SchemaRef>,
    reader: Arc<dyn DatasetReader>,
    processor: Arc<dyn ChunkProcessor>,
    cancellation_token: CancellationToken,
}

impl ChunkUnit {
    fn run(self) -> ChunkResult {
        if self.cancellation_token.is_cancelled() {
            return ChunkResult::failed(
                self.chunk_index,
                self.range,
                QualityError::Cancelled.to_string(),
            );
        }

        let started = Instant::now();
        if self.range.is_empty() {
            return ChunkResult {
                chunk_index: self.chunk_index,
                row_range: self.range,
                rows_processed: 0,
                result: Some(json!({})),
                issues: Vec::new(),
                processing_time: 0.0,
                error: None,
            };
        }

        let chunk = match self.reader.read_range(
            &self.path,
            self.range.start,
            self.range.end,
            self.schema.as_ref(),
        ) {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!("Chunk {} {}: read failed: {}", self.chunk_index, self.range, e);
                return self.failed(e.to_string(), started);
            }
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.processor.process(&chunk)));
        match outcome {
            Ok(Ok(output)) => {
                debug!(
                    "Chunk {} {}: {} rows, {} issues",
                    self.chunk_index,
                    self.range,
                    chunk.height(),
                    output.issues.len()
                );
                let start = self.range.start;
                ChunkResult {
                    chunk_index: self.chunk_index,
                    row_range: self.range,
                    rows_processed: chunk.height(),
                    result: Some(output.payload),
                    issues: output.issues.into_iter().map(|i| i.rebase(start)).collect(),
                    processing_time: started.elapsed().as_secs_f64(),
                    error: None,
                }
            }
            Ok(Err(e)) => {
                let err = QualityError::ChunkFailed {
                    index: self.chunk_index,
                    reason: e.to_string(),
                };
                warn!("{}", err);
                self.failed(err.to_string(), started)
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                warn!("Chunk {} {} panicked: {}", self.chunk_index, self.range, reason);
                self.failed(format!("processor panicked: {reason}"), started)
            }
        }
    }

    fn failed(&self, error: String, started: Instant) -> ChunkResult {
        ChunkResult {
            processing_time: started.elapsed().as_secs_f64(),
            ..ChunkResult::failed(self.chunk_index, self.range, error)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Builder for creating a [`ChunkedProcessor`] with custom configuration.
#[derive(Default)]
pub struct ChunkedProcessorBuilder {
    config: Option<PipelineConfig>,
    reader: Option<Arc<dyn DatasetReader>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cancellation_token: Option<CancellationToken>,
}

static_assertions::assert_impl_all!(ChunkedProcessorBuilder: Send);

impl ChunkedProcessorBuilder {
    /// Set the pipeline configuration. Defaults to [`PipelineConfig::default()`].
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the dataset reader. Defaults to [`FileReader`].
    pub fn reader(mut self, reader: Arc<dyn DatasetReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Set a progress reporter for receiving one update per finished chunk.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Set a cancellation token for stopping runs from another thread.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Validate the configuration and start the worker pool.
    pub fn build(self) -> Result<ChunkedProcessor> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let pool = WorkerPool::new(config.effective_workers())?;

        Ok(ChunkedProcessor {
            config,
            reader: self.reader.unwrap_or_else(|| Arc::new(FileReader::new())),
            pool,
            progress_reporter: self.progress_reporter,
            cancellation_token: self.cancellation_token.unwrap_or_default(),
        })
    }
}
