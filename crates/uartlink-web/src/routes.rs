//! HTTP route handlers for the bridge control surface.
//!
//! # Endpoints
//!
//! ## `GET /bridge/config?speed=<int>&tx=<int>&rx=<int>&stop=<0|1>&time=<ts>`
//!
//! With `stop=1`, stops the capture controller and responds `{"stop":1}`.
//! Otherwise starts a session with the decoded parameters (defaults
//! 9600/4/5 for absent or unparseable fields) and responds with the
//! effective `{"speed":..,"tx":..,"rx":..}`. A hardware bind failure is the
//! one fatal case and maps to HTTP 500.
//!
//! `time` is a wall-clock set request from the original firmware; on a host
//! it is acknowledged and logged, not applied.
//!
//! ## `GET /bridge/status`
//!
//! Server identity, controller run state and the current chunk version.

use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use tracing::{error, info};

use uartlink_capture::ControllerState;
use uartlink_core::{query, BridgeConfig};

use crate::AppState;

/// Create the axum router with all bridge routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/bridge/config", get(config_handler))
        .route("/bridge/status", get(status_handler))
        .with_state(state)
}

/// GET /bridge/config
async fn config_handler(State(state): State<AppState>, RawQuery(raw): RawQuery) -> Response {
    let raw = raw.unwrap_or_default();

    if query::get(&raw, "time").is_some() {
        let ts: i64 = query::get_parsed(&raw, "time", 0);
        info!(ts, "wall-clock set request acknowledged, not applied on host");
    }

    let stop: u32 = query::get_parsed(&raw, "stop", 0);
    if stop != 0 {
        state.controller.stop().await;
        return Json(serde_json::json!({ "stop": 1 })).into_response();
    }

    let config = BridgeConfig::from_query(&raw);
    match state.controller.start(config).await {
        Ok(()) => Json(serde_json::json!({
            "speed": config.baud_rate,
            "tx": config.tx_pin,
            "rx": config.rx_pin,
        }))
        .into_response(),
        Err(e) => {
            error!("bridge start failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// GET /bridge/status
async fn status_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let slot = state.controller.slot();
    let (run_state, config) = match state.controller.state().await {
        ControllerState::Running(config) => ("running", Some(config)),
        ControllerState::Stopped => ("stopped", None),
    };

    Json(serde_json::json!({
        "name": state.name,
        "version": state.version,
        "state": run_state,
        "config": config,
        "chunk_version": slot.version(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BridgeState;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::util::ServiceExt;
    use uartlink_capture::mock::MockSerialFactory;
    use uartlink_capture::SerialCaptureController;

    fn router_with_mock(dir: &std::path::Path) -> (Router, MockSerialFactory, AppState) {
        let factory = MockSerialFactory::new();
        let controller = Arc::new(SerialCaptureController::new(
            Arc::new(factory.clone()),
            dir,
        ));
        let state = Arc::new(BridgeState::new(controller));
        (create_router(state.clone()), factory, state)
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn config_starts_with_decoded_params() {
        let dir = tempfile::tempdir().unwrap();
        let (router, _factory, state) = router_with_mock(dir.path());

        let (status, body) =
            get_json(router, "/bridge/config?speed=19200&tx=17&rx=16").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"speed": 19200, "tx": 17, "rx": 16}));
        assert!(state.controller.is_running().await);

        state.controller.stop().await;
    }

    #[tokio::test]
    async fn config_applies_defaults_for_garbled_fields() {
        let dir = tempfile::tempdir().unwrap();
        let (router, _factory, state) = router_with_mock(dir.path());

        let (status, body) = get_json(router, "/bridge/config?speed=fast").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"speed": 9600, "tx": 4, "rx": 5}));

        state.controller.stop().await;
    }

    #[tokio::test]
    async fn stop_param_stops_the_controller() {
        let dir = tempfile::tempdir().unwrap();
        let (router, _factory, state) = router_with_mock(dir.path());

        state
            .controller
            .start(uartlink_core::BridgeConfig::default())
            .await
            .unwrap();

        let (status, body) = get_json(router, "/bridge/config?stop=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"stop": 1}));
        assert!(!state.controller.is_running().await);
    }

    #[tokio::test]
    async fn bind_failure_maps_to_500() {
        let dir = tempfile::tempdir().unwrap();
        let (router, factory, state) = router_with_mock(dir.path());

        factory.fail_next_open();
        let (status, body) = get_json(router, "/bridge/config?speed=9600").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("bind"));
        assert!(!state.controller.is_running().await);
    }

    #[tokio::test]
    async fn status_reports_run_state() {
        let dir = tempfile::tempdir().unwrap();
        let (router, _factory, state) = router_with_mock(dir.path());

        let (status, body) = get_json(router.clone(), "/bridge/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "stopped");
        assert_eq!(body["chunk_version"], 0);

        state
            .controller
            .start(uartlink_core::BridgeConfig::default())
            .await
            .unwrap();
        let (_, body) = get_json(router, "/bridge/status").await;
        assert_eq!(body["state"], "running");
        assert_eq!(body["config"]["baud_rate"], 9600);

        state.controller.stop().await;
    }
}
