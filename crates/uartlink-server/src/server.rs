//! WebSocket stream bridge implementation.
//!
//! This module provides the streaming side of the bridge:
//! - Client connections over plain TCP + WebSocket handshake
//! - Inbound messages as opaque delivery triggers
//! - Binary frames carrying the latest captured chunk
//!
//! Delivery is driven by inbound client messages, not push-on-write: a
//! client must send something (typically a keepalive) to observe new data.
//! Intermediate chunks captured between two client messages coalesce; only
//! the latest is ever delivered.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, error, info};

use uartlink_core::ChunkSlot;

/// Configuration for the stream bridge server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".parse().unwrap(),
        }
    }
}

/// The WebSocket stream bridge server.
pub struct BridgeServer {
    config: ServerConfig,
    slot: Arc<ChunkSlot>,
}

impl BridgeServer {
    /// Create a new bridge server reading from the given chunk slot.
    pub fn new(config: ServerConfig, slot: Arc<ChunkSlot>) -> Self {
        Self { config, slot }
    }

    /// Run the server, listening for WebSocket connections.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!("stream bridge listening on {}", self.config.bind_addr);

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    let slot = self.slot.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, slot).await {
                            error!("connection error from {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("failed to accept connection: {}", e);
                }
            }
        }
    }
}

/// Handle a single WebSocket connection.
///
/// `last_seen_version` seeds at 0, so the first inbound message after
/// connect delivers the latest pending chunk (if any data has been captured
/// this session).
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    slot: Arc<ChunkSlot>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    info!("handshake done, new stream client {}", addr);

    let (mut ws_tx, mut ws_rx) = ws_stream.split();
    let mut last_seen_version = 0u64;

    while let Some(msg) = ws_rx.next().await {
        match msg {
            // The protocol defines no client commands; every payload is an
            // opaque trigger, logged and discarded.
            Ok(Message::Text(text)) => {
                debug!(%addr, payload = %text, "client trigger");
                forward_if_newer(&slot, &mut last_seen_version, &mut ws_tx).await?;
            }
            Ok(Message::Binary(data)) => {
                debug!(%addr, len = data.len(), "client trigger (binary)");
                forward_if_newer(&slot, &mut last_seen_version, &mut ws_tx).await?;
            }
            Ok(Message::Ping(data)) => {
                ws_tx.send(Message::Pong(data)).await?;
                forward_if_newer(&slot, &mut last_seen_version, &mut ws_tx).await?;
            }
            Ok(Message::Close(_)) => {
                info!("stream client {} closed connection", addr);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                error!("WebSocket error from {}: {}", addr, e);
                break;
            }
        }
    }

    Ok(())
}

/// Send one binary frame with the current chunk if the connection has not
/// seen it yet (including after a session restart reset the version
/// counter). No frame when nothing new arrived - the trigger simply
/// completes.
async fn forward_if_newer(
    slot: &ChunkSlot,
    last_seen: &mut u64,
    ws_tx: &mut SplitSink<WebSocketStream<TcpStream>, Message>,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    if let Some(chunk) = slot.take_newer(*last_seen) {
        *last_seen = chunk.version;
        debug!(
            version = chunk.version,
            len = chunk.bytes.len(),
            "forwarding chunk"
        );
        ws_tx.send(Message::Binary(chunk.bytes)).await?;
    }
    Ok(())
}
