//! The operator client endpoint.
//!
//! Inbound JSON commands drive the controller; the controller's event
//! stream is relayed back over the same socket in emission order. Event
//! delivery failures never reach the agent loop: a dead or lagging client
//! only loses its own view.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt as _, StreamExt as _};
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use waldo_core::events::AgentEvent;
use waldo_tools::SourceOverrides;

use crate::state::AppState;

/// Outbound event queue depth per client connection.
const OUTBOUND_QUEUE: usize = 256;

/// Commands the operator UI may send.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ClientCommand {
    /// Start processing one operator message.
    Submit {
        message: String,
        #[serde(default)]
        sources: Option<SourceOverrides>,
    },
    /// Cancel the in-flight submit, if any.
    Abort,
    /// Reset the conversation.
    ClearHistory,
}

pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_client(socket, state))
}

async fn handle_client(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);
    info!("client connected");

    // Relay every controller event for the life of the connection.
    let mut events = state.controller.subscribe();
    let event_out = out_tx.clone();
    let forwarder = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let Ok(json) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if event_out.send(json).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "client fell behind on events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let writer = tokio::spawn(async move {
        while let Some(json) = out_rx.recv().await {
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(inbound)) = stream.next().await {
        match inbound {
            Message::Text(text) => match serde_json::from_str::<ClientCommand>(&text) {
                Ok(command) => handle_command(&state, command, &out_tx).await,
                Err(err) => {
                    send_error(&out_tx, format!("unrecognized message: {err}")).await;
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    forwarder.abort();
    writer.abort();
    info!("client disconnected");
}

/// Dispatch one parsed client command.
pub(crate) async fn handle_command(
    state: &AppState,
    command: ClientCommand,
    out: &mpsc::Sender<String>,
) {
    match command {
        ClientCommand::Submit { message, sources } => {
            // One submit at a time; a second is rejected, not queued.
            let Ok(guard) = Arc::clone(&state.busy).try_lock_owned() else {
                send_error(out, "a message is already being processed").await;
                return;
            };
            let controller = Arc::clone(&state.controller);
            let _task = tokio::spawn(async move {
                let _busy = guard;
                // The terminal event is the controller's responsibility.
                if let Err(err) = controller.process_message(&message, sources).await {
                    debug!(error = %err, "submit ended unsuccessfully");
                }
            });
        }
        ClientCommand::Abort => state.controller.abort(),
        ClientCommand::ClearHistory => {
            if state.busy.try_lock().is_ok() {
                state.controller.clear_history();
            } else {
                send_error(out, "cannot clear history while a message is being processed")
                    .await;
            }
        }
    }
}

async fn send_error(out: &mpsc::Sender<String>, text: impl Into<String>) {
    let event = AgentEvent::Error { text: text.into() };
    if let Ok(json) = serde_json::to_string(&event) {
        let _ = out.send(json).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use waldo_core::messages::{ContentBlock, Message as ChatMessage};
    use waldo_llm::{ModelProvider, ModelTurn, ProviderError, StopReason};
    use waldo_relay::CommandRelay;
    use waldo_runtime::{Controller, ControllerConfig};
    use waldo_tools::ToolSpec;

    struct StubProvider;

    #[async_trait]
    impl ModelProvider for StubProvider {
        async fn complete(
            &self,
            _history: &[ChatMessage],
            _tools: &[ToolSpec],
        ) -> Result<ModelTurn, ProviderError> {
            Ok(ModelTurn {
                content: vec![ContentBlock::Text {
                    text: "Done.".into(),
                }],
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

    fn parse(raw: &str) -> ClientCommand {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn commands_parse() {
        assert!(matches!(
            parse(r#"{"type": "submit", "message": "hi"}"#),
            ClientCommand::Submit { sources: None, .. }
        ));
        let ClientCommand::Submit { sources, .. } = parse(
            r#"{"type": "submit", "message": "look", "sources": {"head_camera": false}}"#,
        ) else {
            panic!("expected submit");
        };
        assert_eq!(sources.unwrap().head_camera, Some(false));
        assert!(matches!(parse(r#"{"type": "abort"}"#), ClientCommand::Abort));
        assert!(matches!(
            parse(r#"{"type": "clear_history"}"#),
            ClientCommand::ClearHistory
        ));
    }

    #[test]
    fn unknown_command_type_fails_to_parse() {
        assert!(serde_json::from_str::<ClientCommand>(r#"{"type": "reboot"}"#).is_err());
    }

    #[tokio::test]
    async fn submit_drives_the_controller_to_done() {
        let state = test_state();
        let mut events = state.controller.subscribe();
        let (out_tx, _out_rx) = mpsc::channel(8);

        handle_command(
            &state,
            ClientCommand::Submit {
                message: "hello".into(),
                sources: None,
            },
            &out_tx,
        )
        .await;

        loop {
            let event = events.recv().await.unwrap();
            if event.is_terminal() {
                assert_eq!(event.event_type(), "done");
                break;
            }
        }
        assert_eq!(state.controller.history().len(), 2);
    }

    #[tokio::test]
    async fn second_submit_while_busy_is_rejected() {
        let state = test_state();
        let held = Arc::clone(&state.busy).try_lock_owned().unwrap();
        let (out_tx, mut out_rx) = mpsc::channel(8);

        handle_command(
            &state,
            ClientCommand::Submit {
                message: "hello".into(),
                sources: None,
            },
            &out_tx,
        )
        .await;

        let reply: serde_json::Value =
            serde_json::from_str(&out_rx.recv().await.unwrap()).unwrap();
        assert_eq!(reply["type"], "error");
        assert!(state.controller.history().is_empty());
        drop(held);
    }

    #[tokio::test]
    async fn clear_history_rejected_while_busy() {
        let state = test_state();
        let held = Arc::clone(&state.busy).try_lock_owned().unwrap();
        let (out_tx, mut out_rx) = mpsc::channel(8);

        handle_command(&state, ClientCommand::ClearHistory, &out_tx).await;

        let reply: serde_json::Value =
            serde_json::from_str(&out_rx.recv().await.unwrap()).unwrap();
        assert_eq!(reply["type"], "error");
        drop(held);
    }

    #[tokio::test]
    async fn abort_when_idle_is_silent() {
        let state = test_state();
        let mut events = state.controller.subscribe();
        let (out_tx, mut out_rx) = mpsc::channel(8);

        handle_command(&state, ClientCommand::Abort, &out_tx).await;

        assert!(events.try_recv().is_err());
        assert!(out_rx.try_recv().is_err());
    }
}
