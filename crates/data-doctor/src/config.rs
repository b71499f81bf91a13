//! Configuration types for the data quality pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};

/// Default number of rows per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Hard upper bound on worker threads, regardless of configuration.
pub const MAX_WORKER_LIMIT: usize = 32;

/// Default worker count: available parallelism, capped at 4.
pub fn default_max_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(4)
}

/// Configuration for the data quality pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use data_doctor::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .chunk_size(5_000)
///     .max_workers(2)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of rows in each chunk handed to a worker.
    /// Default: 10 000
    pub chunk_size: usize,

    /// Number of worker threads in the chunk pool.
    /// Values above [`MAX_WORKER_LIMIT`] are clamped.
    /// Default: min(available parallelism, 4)
    pub max_workers: usize,

    /// Whether `data_type_mismatch` issues are repaired by converting the
    /// column to a numeric type.
    /// Default: false
    pub convert_numeric_text: bool,

    /// Whether `inconsistencies` issues are repaired by rewriting case
    /// variants to their most frequent spelling.
    /// Default: false
    pub standardize_case: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_workers: default_max_workers(),
            convert_numeric_text: false,
            standardize_case: false,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.chunk_size == 0 {
            return Err(ConfigValidationError::InvalidChunkSize(self.chunk_size));
        }

        if self.max_workers == 0 {
            return Err(ConfigValidationError::InvalidWorkerCount(self.max_workers));
        }

        Ok(())
    }

    /// Worker count actually used for the pool.
    pub fn effective_workers(&self) -> usize {
        self.max_workers.clamp(1, MAX_WORKER_LIMIT)
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid chunk size: {0} (must be at least 1)")]
    InvalidChunkSize(usize),

    #[error("Invalid worker count: {0} (must be at least 1)")]
    InvalidWorkerCount(usize),
}

impl From<ConfigValidationError> for crate::error::QualityError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::QualityError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    chunk_size: Option<usize>,
    max_workers: Option<usize>,
    convert_numeric_text: Option<bool>,
    standardize_case: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the number of rows per chunk.
    pub fn chunk_size(mut self, rows: usize) -> Self {
        self.chunk_size = Some(rows);
        self
    }

    /// Set the number of worker threads.
    ///
    /// Values above [`MAX_WORKER_LIMIT`] are accepted but clamped when the
    /// pool is created.
    pub fn max_workers(mut self, workers: usize) -> Self {
        self.max_workers = Some(workers);
        self
    }

    /// Enable or disable numeric conversion of text columns holding numbers.
    pub fn convert_numeric_text(mut self, enable: bool) -> Self {
        self.convert_numeric_text = Some(enable);
        self
    }

    /// Enable or disable case standardization of categorical text.
    pub fn standardize_case(mut self, enable: bool) -> Self {
        self.standardize_case = Some(enable);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            chunk_size: self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
            max_workers: self.max_workers.unwrap_or_else(default_max_workers),
            convert_numeric_text: self.convert_numeric_text.unwrap_or(false),
            standardize_case: self.standardize_case.unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }
}
