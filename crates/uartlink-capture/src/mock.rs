//! Channel-fed mock serial line for tests and hardware-free demos.
//!
//! Kept as a regular module (not `#[cfg(test)]`) so integration tests and
//! downstream crates can drive the full capture path without a device.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use uartlink_core::BridgeConfig;

use crate::error::CaptureError;
use crate::line::{SerialLine, SerialLineFactory};

#[derive(Default)]
struct MockState {
    /// Sender feeding the most recently opened line.
    feed_tx: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
    opened: AtomicUsize,
    active: AtomicUsize,
    fail_next: AtomicBool,
}

/// Factory handing out mock lines; clones share one state handle so a test
/// can keep feeding data while the controller owns the factory.
#[derive(Clone, Default)]
pub struct MockSerialFactory {
    state: Arc<MockState>,
}

impl MockSerialFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for the currently open line. Silently dropped when no
    /// line is open, like a device chattering into an unbound UART.
    pub fn feed(&self, bytes: &[u8]) {
        if let Some(tx) = self.state.feed_tx.lock().unwrap().as_ref() {
            let _ = tx.send(bytes.to_vec());
        }
    }

    /// Total number of successful opens.
    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    /// Number of lines currently alive (not yet dropped).
    pub fn active_lines(&self) -> usize {
        self.state.active.load(Ordering::SeqCst)
    }

    /// Make the next `open` fail with a bind error.
    pub fn fail_next_open(&self) {
        self.state.fail_next.store(true, Ordering::SeqCst);
    }
}

impl SerialLineFactory for MockSerialFactory {
    fn open(&self, _config: &BridgeConfig) -> Result<Box<dyn SerialLine>, CaptureError> {
        if self.state.fail_next.swap(false, Ordering::SeqCst) {
            return Err(CaptureError::HardwareBind("mock bind failure".into()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        *self.state.feed_tx.lock().unwrap() = Some(tx);
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        self.state.active.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MockSerialLine {
            rx,
            state: self.state.clone(),
        }))
    }
}

struct MockSerialLine {
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
    state: Arc<MockState>,
}

impl Drop for MockSerialLine {
    fn drop(&mut self) {
        self.state.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SerialLine for MockSerialLine {
    async fn read_chunk(&mut self, buf: &mut [u8], wait: Duration) -> io::Result<usize> {
        match tokio::time::timeout(wait, self.rx.recv()).await {
            Ok(Some(data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                Ok(n)
            }
            // Feeder gone or window elapsed: an empty read.
            Ok(None) | Err(_) => Ok(0),
        }
    }
}
