//! The shared capture-chunk slot.
//!
//! Exactly one capture loop writes the slot; connection handlers read it.
//! Only the latest chunk matters - last-write-wins coalescing, not a queue.
//! The version counter marks freshness for change detection without
//! delivering intermediate chunks.
//!
//! All accesses that pair a version check with a byte read go through one
//! lock acquisition, so readers always observe a consistent
//! `(bytes, version)` pair.

use std::sync::Mutex;

/// Maximum number of bytes retained from a single read burst.
pub const CHUNK_CAPACITY: usize = 1023;

/// One bounded burst of bytes captured from the hardware line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureChunk {
    /// Captured bytes, at most [`CHUNK_CAPACITY`] of them.
    pub bytes: Vec<u8>,
    /// Freshness marker, monotonic within one capture session; 0 means no
    /// data captured yet.
    pub version: u64,
}

/// Synchronized slot holding the most recent [`CaptureChunk`].
#[derive(Debug, Default)]
pub struct ChunkSlot {
    inner: Mutex<CaptureChunk>,
}

impl ChunkSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new chunk and advance the version counter.
    ///
    /// Bytes beyond [`CHUNK_CAPACITY`] are discarded; the hardware read
    /// buffer is sized to the same capacity, so truncation only guards
    /// against misbehaving callers.
    pub fn publish(&self, bytes: &[u8]) -> u64 {
        let mut chunk = self.lock();
        let keep = bytes.len().min(CHUNK_CAPACITY);
        chunk.bytes.clear();
        chunk.bytes.extend_from_slice(&bytes[..keep]);
        chunk.version += 1;
        chunk.version
    }

    /// Current version counter.
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    /// Clone the current chunk.
    pub fn snapshot(&self) -> CaptureChunk {
        self.lock().clone()
    }

    /// Return the current chunk only if the reader has not seen it yet.
    /// Check and read happen under the same lock.
    ///
    /// A cursor ahead of the slot means the slot was reset for a new
    /// session since the reader last looked; the reader's cursor is stale,
    /// not the data, so any captured chunk is delivered. Version 0 (no data
    /// this session) never delivers.
    pub fn take_newer(&self, last_seen: u64) -> Option<CaptureChunk> {
        let chunk = self.lock();
        if chunk.version != 0 && chunk.version != last_seen {
            Some(chunk.clone())
        } else {
            None
        }
    }

    /// Reset to the empty, version-0 state for a fresh capture session.
    pub fn reset(&self) {
        let mut chunk = self.lock();
        chunk.bytes.clear();
        chunk.version = 0;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CaptureChunk> {
        // A poisoned slot still holds a consistent chunk; keep serving it.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
