//! Serial capture controller.
//!
//! Owns the hardware line lifecycle, the background capture loop and the
//! shared chunk slot. At most one capture loop and one open log file exist
//! at any time: `start` always tears down the previous session before
//! binding a new one.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use uartlink_core::hexfmt::hex_string;
use uartlink_core::{BridgeConfig, ChunkSlot, CHUNK_CAPACITY};

use crate::error::CaptureError;
use crate::line::{SerialLine, SerialLineFactory, READ_WAIT};
use crate::logfile::CaptureLogSink;

/// Externally observable controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Stopped,
    Running(BridgeConfig),
}

/// One running capture session.
struct Session {
    config: BridgeConfig,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Controller for the serial capture lifecycle.
///
/// Construct one instance and share it (via `Arc`) between the HTTP control
/// surface and anything else that needs the chunk slot. The hardware line
/// and the log file are exclusively owned by the running session; nothing
/// outside this module opens them.
pub struct SerialCaptureController {
    factory: Arc<dyn SerialLineFactory>,
    slot: Arc<ChunkSlot>,
    log_dir: PathBuf,
    session: Mutex<Option<Session>>,
}

impl SerialCaptureController {
    pub fn new(factory: Arc<dyn SerialLineFactory>, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            factory,
            slot: Arc::new(ChunkSlot::new()),
            log_dir: log_dir.into(),
            session: Mutex::new(None),
        }
    }

    /// The shared slot the capture loop publishes into.
    pub fn slot(&self) -> Arc<ChunkSlot> {
        self.slot.clone()
    }

    pub async fn state(&self) -> ControllerState {
        match self.session.lock().await.as_ref() {
            Some(session) => ControllerState::Running(session.config),
            None => ControllerState::Stopped,
        }
    }

    pub async fn is_running(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Start a capture session with `config`.
    ///
    /// A running session is fully stopped first, so the previous hardware
    /// binding and log file are released before the new line is bound. A
    /// bind failure leaves the controller stopped.
    pub async fn start(&self, config: BridgeConfig) -> Result<(), CaptureError> {
        let mut session = self.session.lock().await;
        stop_session(&mut session).await;

        let line = self.factory.open(&config)?;

        // Fresh session: version counting restarts at zero and the log
        // file is created lazily by the loop on first data.
        self.slot.reset();
        let sink = CaptureLogSink::new(&self.log_dir);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(capture_loop(line, self.slot.clone(), sink, shutdown_rx));

        info!(
            baud = config.baud_rate,
            tx = config.tx_pin,
            rx = config.rx_pin,
            "capture session started"
        );
        *session = Some(Session {
            config,
            shutdown: shutdown_tx,
            handle,
        });
        Ok(())
    }

    /// Stop the running session, if any. Idempotent.
    ///
    /// Does not return until the capture loop has exited and the hardware
    /// binding is released.
    pub async fn stop(&self) {
        let mut session = self.session.lock().await;
        stop_session(&mut session).await;
    }
}

async fn stop_session(session: &mut Option<Session>) {
    let Some(session) = session.take() else {
        return;
    };
    let _ = session.shutdown.send(true);
    if let Err(e) = session.handle.await {
        warn!("capture loop did not exit cleanly: {e}");
    }
    info!("capture session stopped");
}

/// Background loop: bounded-wait reads, publish to the slot, best-effort
/// logging. Runs until the shutdown signal fires; dropping the line on exit
/// releases the hardware binding.
async fn capture_loop(
    mut line: Box<dyn SerialLine>,
    slot: Arc<ChunkSlot>,
    mut sink: CaptureLogSink,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut buf = [0u8; CHUNK_CAPACITY];
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            result = line.read_chunk(&mut buf, READ_WAIT) => match result {
                Ok(0) => {}
                Ok(n) => {
                    let bytes = &buf[..n];
                    let version = slot.publish(bytes);
                    debug!(version, data = %hex_string(bytes), "captured chunk");
                    log_chunk(&mut sink, bytes);
                }
                Err(e) => {
                    warn!("hardware read failed: {e}");
                    tokio::time::sleep(READ_WAIT).await;
                }
            },
        }
    }
    sink.close();
}

/// Log failures are reported and capture continues without logging.
fn log_chunk(sink: &mut CaptureLogSink, bytes: &[u8]) {
    if let Err(e) = sink.ensure_open() {
        warn!("capture log unavailable, data not persisted: {e}");
        return;
    }
    if let Err(e) = sink.append(Local::now(), bytes) {
        warn!("capture log write failed: {e}");
    }
}
