//! # uartlink-core
//!
//! Core types for the UART-to-WebSocket bridge.
//!
//! This crate provides:
//! - Percent decoding in the nginx `unescape_uri` dialect
//! - Query-string parameter extraction
//! - Bridge configuration with its documented defaults
//! - The shared capture-chunk slot with its version counter
//!
//! This crate is intentionally runtime-agnostic and contains no async code,
//! making it usable on both Linux (tokio) and embedded targets.

pub mod chunk;
pub mod config;
pub mod decode;
pub mod hexfmt;
pub mod query;

pub use chunk::{CaptureChunk, ChunkSlot, CHUNK_CAPACITY};
pub use config::BridgeConfig;
pub use decode::{decode, Mode};
