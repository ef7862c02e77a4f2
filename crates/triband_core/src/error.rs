//! Core Error Types

use thiserror::Error;

/// Errors that can occur while preparing the processing pipeline
///
/// Everything here is a prepare-time failure; the running audio path
/// never returns errors.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid block size: {0} (must be 1-8192)")]
    InvalidBlockSize(usize),

    #[error("Analyzer configuration error: {0}")]
    ConfigError(String),

    #[error("DSP error: {0}")]
    DspError(#[from] triband_dsp::DspError),
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
