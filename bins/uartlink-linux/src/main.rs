use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use uartlink_capture::{SerialCaptureController, TokioSerialFactory};
use uartlink_server::{BridgeServer, ServerConfig};
use uartlink_web::{create_router, BridgeState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,uartlink_capture=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("uartlink bridge starting...");

    // Configuration
    let device =
        std::env::var("UARTLINK_DEVICE").unwrap_or_else(|_| "/dev/ttyUSB0".to_string());
    let log_dir = std::env::var("UARTLINK_LOG_DIR").unwrap_or_else(|_| "logs".to_string());
    std::fs::create_dir_all(&log_dir)?;

    let ws_addr: SocketAddr = "0.0.0.0:3000".parse()?;
    let http_addr: SocketAddr = "0.0.0.0:3001".parse()?;

    // The controller is shared between the control surface and shutdown.
    let controller = Arc::new(SerialCaptureController::new(
        Arc::new(TokioSerialFactory::new(&device)),
        &log_dir,
    ));

    // Spawn WebSocket stream bridge
    let stream_server = BridgeServer::new(ServerConfig { bind_addr: ws_addr }, controller.slot());
    let ws_handle = tokio::spawn(async move {
        if let Err(e) = stream_server.run().await {
            tracing::error!("stream bridge error: {}", e);
        }
    });

    // Spawn HTTP control surface
    let app = create_router(Arc::new(BridgeState::new(controller.clone())));
    let http_handle = tokio::spawn(async move {
        match tokio::net::TcpListener::bind(http_addr).await {
            Ok(listener) => {
                tracing::info!("HTTP control surface listening on {}", http_addr);
                if let Err(e) = axum::serve(listener, app).await {
                    tracing::error!("HTTP server error: {}", e);
                }
            }
            Err(e) => tracing::error!("failed to bind {}: {}", http_addr, e),
        }
    });

    tracing::info!("uartlink ready");
    tracing::info!("   device:    {}", device);
    tracing::info!("   stream:    ws://localhost:3000/ws");
    tracing::info!("   control:   http://localhost:3001/bridge/config");
    tracing::info!("   status:    http://localhost:3001/bridge/status");
    tracing::info!("");
    tracing::info!("Try these commands:");
    tracing::info!("   curl 'http://localhost:3001/bridge/config?speed=115200&tx=17&rx=16'");
    tracing::info!("   websocat ws://localhost:3000/ws");
    tracing::info!("   curl 'http://localhost:3001/bridge/config?stop=1'");

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = ws_handle => {
            tracing::warn!("stream bridge stopped");
        }
        _ = http_handle => {
            tracing::warn!("HTTP server stopped");
        }
    }

    // Tear down the capture session so the line and log file are released.
    controller.stop().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
