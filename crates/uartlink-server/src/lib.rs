//! # uartlink-server
//!
//! WebSocket stream bridge endpoint: serves the latest captured chunk as a
//! binary frame whenever an inbound client message finds the version
//! counter advanced.

pub mod server;

pub use server::{BridgeServer, ServerConfig};
