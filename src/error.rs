//! Error types for the driver monitoring core.

use thiserror::Error;

/// Main error type for the library
///
/// Errors are reserved for construction and configuration problems.
/// Per-frame anomalies (missing detections, degenerate geometry, pose
/// solver failures) degrade to default values instead of failing.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
