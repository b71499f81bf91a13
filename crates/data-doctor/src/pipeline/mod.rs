//! Pipeline module.
//!
//! This module provides the chunk orchestrator and the pieces it is built
//! from: the worker pool, per-chunk processors, the result combiner, and
//! progress and cancellation support.

mod chunked;
pub mod combiner;
pub mod outliers;
pub mod pool;
pub mod processors;
pub mod progress;

pub use chunked::{ChunkedProcessor, ChunkedProcessorBuilder};
pub use combiner::combine_chunk_results;
pub use outliers::{IqrBounds, OutlierHandler};
pub use pool::WorkerPool;
pub use processors::{AnalyzeChunk, ChunkProcessor, FixChunk};
pub use progress::{CancellationToken, ClosureProgressReporter, ProgressReporter, ProgressUpdate};
