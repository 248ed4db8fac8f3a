//! # uartlink-capture
//!
//! Serial capture side of the bridge:
//! - [`SerialLine`]/[`SerialLineFactory`] hardware seam (tokio-serial in
//!   production, a channel-fed mock for tests)
//! - [`CaptureLogSink`] session log with timestamped hex records
//! - [`SerialCaptureController`] start/stop lifecycle and the background
//!   capture loop feeding the shared chunk slot

pub mod controller;
pub mod error;
pub mod line;
pub mod logfile;
pub mod mock;

pub use controller::{ControllerState, SerialCaptureController};
pub use error::CaptureError;
pub use line::{SerialLine, SerialLineFactory, TokioSerialFactory, READ_WAIT};
pub use logfile::CaptureLogSink;
