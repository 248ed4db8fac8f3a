//! # uartlink-web
//!
//! HTTP control surface for the serial bridge.
//!
//! This crate provides:
//! - `GET /bridge/config` - configure/start/stop the capture controller
//! - `GET /bridge/status` - server identity and controller run state
//!
//! Query parameters go through the bridge's own percent decoder and
//! query-string parser, never the framework's extractors - the control
//! surface must reproduce the tolerant decoding dialect exactly.

pub mod routes;

pub use routes::create_router;

use std::sync::Arc;

use uartlink_capture::SerialCaptureController;

/// Shared state for all route handlers, wrapped in `Arc` across axum.
pub struct BridgeState {
    /// Server name reported by `/bridge/status`.
    pub name: String,
    /// Crate version reported by `/bridge/status`.
    pub version: String,
    /// The capture controller the control surface drives.
    pub controller: Arc<SerialCaptureController>,
}

impl BridgeState {
    pub fn new(controller: Arc<SerialCaptureController>) -> Self {
        Self {
            name: "uartlink".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            controller,
        }
    }
}

/// Type alias for shared state in axum handlers.
pub type AppState = Arc<BridgeState>;
