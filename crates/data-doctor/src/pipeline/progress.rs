//! Progress reporting and cancellation support for chunked processing.
//!
//! This module provides types for tracking chunk completion and supporting
//! cancellation from external threads (e.g., a Ctrl-C handler or UI button).
//!
//! # Example
//!
//! ```rust,ignore
//! use data_doctor::{AnalyzeChunk, CancellationToken, ChunkedProcessor};
//! use std::sync::Arc;
//!
//! let token = CancellationToken::new();
//! let token_clone = token.clone();
//!
//! // In another thread
//! std::thread::spawn(move || {
//!     std::thread::sleep(std::time::Duration::from_secs(5));
//!     token_clone.cancel();
//! });
//!
//! let processor = ChunkedProcessor::builder()
//!     .cancellation_token(token)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.percent, update.message);
//!     })
//!     .build()?;
//! let result = processor.process_large_file("big.csv", Arc::new(AnalyzeChunk));
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Progress of a chunked run, emitted once per finished chunk in completion
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// `chunks_done / total_chunks * 100`
    pub percent: f64,

    /// Chunks finished so far, failed ones included.
    pub chunks_done: usize,

    pub total_chunks: usize,

    /// Index of the chunk that just finished.
    pub chunk_index: usize,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Update for a finished chunk.
    pub fn chunk_finished(
        chunks_done: usize,
        total_chunks: usize,
        chunk_index: usize,
        message: impl Into<String>,
    ) -> Self {
        let percent = if total_chunks > 0 {
            chunks_done as f64 / total_chunks as f64 * 100.0
        } else {
            100.0
        };
        Self {
            percent: percent.clamp(0.0, 100.0),
            chunks_done,
            total_chunks,
            chunk_index,
            message: message.into(),
        }
    }
}

/// Trait for receiving progress updates during chunked processing.
///
/// Implementations must be `Send + Sync`: updates are emitted from the thread
/// draining chunk results, which is usually not the thread that built the
/// processor.
pub trait ProgressReporter: Send + Sync {
    /// Called once per finished chunk. Implementations should be cheap and
    /// non-blocking.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

/// Token for cancelling a running chunked job.
///
/// This token uses an atomic boolean internally, making it safe to clone
/// and share across threads. Every chunk unit checks it before reading its
/// range; once set, remaining units fail fast and the run returns
/// [`QualityError::Cancelled`](crate::error::QualityError::Cancelled).
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

// Tokens and updates cross into worker threads
static_assertions::assert_impl_all!(CancellationToken: Send, Sync);
static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

impl CancellationToken {
    /// Creates a new cancellation token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. Thread-safe; may be called from any thread.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` if [`cancel()`](Self::cancel) has been called on this
    /// token or any of its clones.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can be reused for another run.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_cancellation_token_default_not_cancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancellation_token_clone_shares_state() {
        let token1 = CancellationToken::new();
        let token2 = token1.clone();

        token1.cancel();

        assert!(token1.is_cancelled());
        assert!(token2.is_cancelled());
    }

    #[test]
    fn test_cancellation_token_reset() {
        let token = CancellationToken::new();
        token.cancel();
        token.reset();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_chunk_finished_percent() {
        let update = ProgressUpdate::chunk_finished(1, 3, 2, "Chunk 2 done");
        assert!((update.percent - 33.333).abs() < 0.01);
        assert_eq!(update.chunk_index, 2);

        let update = ProgressUpdate::chunk_finished(3, 3, 0, "Chunk 0 done");
        assert_eq!(update.percent, 100.0);
    }

    #[test]
    fn test_progress_update_json_serialization() {
        let update = ProgressUpdate::chunk_finished(2, 4, 1, "Chunk 1 done");
        let json = serde_json::to_string(&update).expect("Should serialize");

        assert!(json.contains("\"percent\":50.0"));
        assert!(json.contains("\"chunks_done\":2"));
        assert!(json.contains("\"chunk_index\":1"));
    }

    #[test]
    fn test_progress_reporter_across_threads() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let reporter = Arc::new(ClosureProgressReporter::new(move |_update| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        }));

        let reporter_clone = reporter.clone();
        let handle = std::thread::spawn(move || {
            reporter_clone.report(ProgressUpdate::chunk_finished(1, 1, 0, "Done"));
        });

        handle.join().expect("Thread should not panic");
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancellation_across_threads() {
        let token = CancellationToken::new();
        let token_clone = token.clone();

        let handle = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(50));
            token_clone.is_cancelled()
        });

        token.cancel();

        let was_cancelled = handle.join().expect("Thread should not panic");
        assert!(was_cancelled);
    }
}
