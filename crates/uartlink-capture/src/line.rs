//! Hardware line abstraction.
//!
//! The capture controller talks to the UART through the [`SerialLine`] trait
//! so tests can substitute a channel-fed mock (see [`crate::mock`]). The
//! production implementation wraps a `tokio-serial` stream.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio_serial::SerialPortBuilderExt;
use tracing::info;

use uartlink_core::BridgeConfig;

use crate::error::CaptureError;

/// Bounded wait applied to each hardware read.
pub const READ_WAIT: Duration = Duration::from_millis(20);

/// One open hardware line. Dropping the value releases the binding.
#[async_trait]
pub trait SerialLine: Send {
    /// Read whatever bytes are available into `buf`, waiting at most `wait`.
    ///
    /// Returns `Ok(0)` when nothing arrived within the window; that is not
    /// an error and must not advance the capture state.
    async fn read_chunk(&mut self, buf: &mut [u8], wait: Duration) -> io::Result<usize>;
}

/// Opens [`SerialLine`]s for capture sessions.
///
/// Opening is synchronous and happens inside `start`, so a bind failure is
/// fatal to that call before any background work is spawned.
pub trait SerialLineFactory: Send + Sync {
    fn open(&self, config: &BridgeConfig) -> Result<Box<dyn SerialLine>, CaptureError>;
}

/// Factory binding a fixed device path via `tokio-serial`.
///
/// The config's pin numbers only mean something on embedded targets; here
/// they are recorded for diagnostics while the baud rate is applied to the
/// device.
pub struct TokioSerialFactory {
    device: String,
}

impl TokioSerialFactory {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
        }
    }
}

impl SerialLineFactory for TokioSerialFactory {
    fn open(&self, config: &BridgeConfig) -> Result<Box<dyn SerialLine>, CaptureError> {
        let port = tokio_serial::new(self.device.as_str(), config.baud_rate)
            .open_native_async()
            .map_err(|e| CaptureError::HardwareBind(format!("{}: {e}", self.device)))?;

        info!(
            device = %self.device,
            baud = config.baud_rate,
            tx = config.tx_pin,
            rx = config.rx_pin,
            "serial line opened"
        );

        Ok(Box::new(TokioSerialLine { port }))
    }
}

struct TokioSerialLine {
    port: tokio_serial::SerialStream,
}

#[async_trait]
impl SerialLine for TokioSerialLine {
    async fn read_chunk(&mut self, buf: &mut [u8], wait: Duration) -> io::Result<usize> {
        match tokio::time::timeout(wait, self.port.read(buf)).await {
            Ok(result) => result,
            // Nothing arrived within the window.
            Err(_elapsed) => Ok(0),
        }
    }
}
