//! Session capture log.
//!
//! One log file per capture session, created lazily when the first chunk
//! arrives and closed when the session stops. Records are human-readable
//! ASCII, one per captured chunk:
//!
//! ```text
//! 14:05:09.312: 01 02 ff
//! ```

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use rand::Rng;
use tracing::info;

use uartlink_core::hexfmt::hex_string;

use crate::error::CaptureError;

/// How many candidate filenames to try before giving up.
pub const NAME_ATTEMPTS: u32 = 100;

/// Append-only log sink for one capture session.
///
/// The filename is the local `MMDDhhmm` plus a random disambiguator,
/// incremented while a same-named file already exists. The sink is never
/// reused across sessions; the controller builds a fresh one per `start`.
pub struct CaptureLogSink {
    dir: PathBuf,
    file: Option<File>,
    path: Option<PathBuf>,
}

impl CaptureLogSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            file: None,
            path: None,
        }
    }

    /// Open the log file if it is not open yet.
    pub fn ensure_open(&mut self) -> Result<(), CaptureError> {
        if self.file.is_some() {
            return Ok(());
        }
        let start = rand::thread_rng().gen_range(0..1000);
        self.open_at(Local::now(), start)
    }

    fn open_at(&mut self, now: DateTime<Local>, start: u32) -> Result<(), CaptureError> {
        let stamp = now.format("%m%d%H%M");
        let mut disambiguator = start;

        for _ in 0..NAME_ATTEMPTS {
            let path = self.dir.join(format!("{stamp}_{disambiguator}.log"));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    info!(path = %path.display(), "capture log opened");
                    self.file = Some(file);
                    self.path = Some(path);
                    return Ok(());
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    disambiguator += 1;
                }
                Err(e) => return Err(CaptureError::LogIo(e)),
            }
        }

        Err(CaptureError::FilenameExhausted)
    }

    /// Append one timestamped hex record. A no-op while the file is not
    /// open, mirroring the best-effort policy of the capture loop.
    pub fn append(&mut self, now: DateTime<Local>, bytes: &[u8]) -> Result<(), CaptureError> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        writeln!(
            file,
            "{}: {}",
            now.format("%H:%M:%S%.3f"),
            hex_string(bytes)
        )?;
        Ok(())
    }

    /// Path of the open (or previously opened) log file.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Release the file handle. Safe to call when already closed.
    pub fn close(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.sync_all();
            if let Some(path) = &self.path {
                info!(path = %path.display(), "capture log closed");
            }
        }
    }
}

impl Drop for CaptureLogSink {
    fn drop(&mut self) {
        self.close();
    }
}
