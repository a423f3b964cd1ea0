//! Error types for the taskmaster pipeline

use thiserror::Error;

/// Result type alias for taskmaster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running the pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Camera device could not be acquired
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),

    /// Frame grab or frame write failed after the device was acquired
    #[error("capture error: {0}")]
    Capture(String),

    /// Frame file stayed lock-contended past the retry deadline
    #[error("frame read timed out: {0}")]
    LockTimeout(String),

    /// Vision inference error
    #[error("inference error: {0}")]
    Inference(String),

    /// Speech synthesis error
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
