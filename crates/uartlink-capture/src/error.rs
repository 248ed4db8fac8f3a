//! Capture-side error types.

use thiserror::Error;

/// Errors raised by the capture controller and its log sink.
///
/// Only [`CaptureError::HardwareBind`] is fatal (to the `start` call that
/// raised it). Log failures degrade to capture-without-logging and are
/// reported through `tracing` by the capture loop.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The hardware line could not be opened.
    #[error("failed to bind hardware line: {0}")]
    HardwareBind(String),

    /// Writing or creating the session log failed.
    #[error("capture log I/O failed: {0}")]
    LogIo(#[from] std::io::Error),

    /// Every candidate log filename already existed.
    #[error("exhausted capture log filename attempts")]
    FilenameExhausted,
}
