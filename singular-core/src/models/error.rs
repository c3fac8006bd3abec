use thiserror::Error;

use super::video_format::VideoFormat;

/// Errors raised by sensor sessions, backends, and storage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SensorError {
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("frame mismatch: expected {expected}, got {actual}")]
    FrameMismatch {
        expected: VideoFormat,
        actual: VideoFormat,
    },

    #[error("device not available")]
    DeviceNotAvailable,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}
