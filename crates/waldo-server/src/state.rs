//! Shared application state passed to Axum handlers.

use std::sync::Arc;

use tokio::sync::Mutex;
use waldo_relay::CommandRelay;
use waldo_runtime::Controller;

/// State shared by every route.
#[derive(Clone)]
pub struct AppState {
    /// Command relay bound by the robot endpoint.
    pub relay: Arc<CommandRelay>,
    /// The agent loop driven by the client endpoint.
    pub controller: Arc<Controller>,
    /// Single-flight guard: held for the duration of one submit.
    pub busy: Arc<Mutex<()>>,
}

impl AppState {
    /// Build the shared state.
    #[must_use]
    pub fn new(relay: Arc<CommandRelay>, controller: Arc<Controller>) -> Self {
        Self {
            relay,
            controller,
            busy: Arc::new(Mutex::new(())),
        }
    }
}
