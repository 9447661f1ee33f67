//! # waldo-server
//!
//! Axum WebSocket server bridging the operator UI and the robot link.
//!
//! Two WebSocket endpoints share one [`AppState`]:
//! - `GET /ws/robot` — the actuation surface; binds the command relay
//! - `GET /ws/client` — the operator UI; drives the controller and relays
//!   its event stream
//! - `GET /health` — liveness probe

#![deny(unsafe_code)]

mod client;
mod robot;
mod state;

pub use state::AppState;

use axum::Json;
use axum::Router;
use axum::routing::get;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

/// Build the router with all routes.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ws/robot", get(robot::ws_handler))
        .route("/ws/client", get(client::ws_handler))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt as _;
    use waldo_core::messages::{ContentBlock, Message};
    use waldo_llm::{ModelProvider, ModelTurn, ProviderError, StopReason};
    use waldo_relay::CommandRelay;
    use waldo_runtime::{Controller, ControllerConfig};
    use waldo_tools::ToolSpec;

    struct StubProvider;

    #[async_trait]
    impl ModelProvider for StubProvider {
        async fn complete(
            &self,
            _history: &[Message],
            _tools: &[ToolSpec],
        ) -> Result<ModelTurn, ProviderError> {
            Ok(ModelTurn {
                content: vec![ContentBlock::Text { text: "ok".into() }],
                stop_reason: StopReason::EndTurn,
            })
        }
    }

    fn test_state() -> AppState {
        let relay = Arc::new(CommandRelay::new());
        let controller = Arc::new(Controller::new(
            Arc::new(StubProvider),
            Arc::clone(&relay),
            ControllerConfig::default(),
        ));
        AppState::new(relay, controller)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let router = build_router(test_state());
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn websocket_routes_reject_plain_get() {
        for uri in ["/ws/robot", "/ws/client"] {
            let router = build_router(test_state());
            let response = router
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            // No upgrade headers: the handshake is refused.
            assert_ne!(response.status(), StatusCode::OK);
        }
    }
}
