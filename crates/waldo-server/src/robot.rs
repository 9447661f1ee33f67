//! The robot link endpoint.
//!
//! One WebSocket carries every command frame out and every result frame
//! back. The handler owns the relay registration for its connection: it
//! binds on upgrade and unbinds its own generation on close, so a
//! replacement link that arrived in between is left untouched.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt as _, StreamExt as _};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use waldo_core::frames::Frame;
use waldo_relay::CommandRelay;

use crate::state::AppState;

/// Outbound frame queue depth per robot link.
const OUTBOUND_QUEUE: usize = 64;

pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_robot(socket, state))
}

async fn handle_robot(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);
    let link = state.relay.bind(tx);
    info!(?link, "robot link established");

    let mut writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sink.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => route_frame(&state.relay, &text),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    warn!(error = %err, "robot socket error");
                    break;
                }
            },
            _ = &mut writer => break,
        }
    }

    writer.abort();
    // A no-op if a newer link already replaced this registration.
    state.relay.unbind(link);
    info!(?link, "robot link closed");
}

/// Route one inbound frame from the robot.
///
/// Results for unknown or already-settled correlation ids are dropped;
/// the robot never legitimately sends command frames.
pub(crate) fn route_frame(relay: &CommandRelay, text: &str) {
    match Frame::parse(text) {
        Ok(Frame::CommandResult { id, result }) => {
            if !relay.resolve(id, result) {
                debug!(id, "dropped result for unknown or settled command");
            }
        }
        Ok(Frame::Command { id, .. }) => {
            warn!(id, "unexpected command frame from robot");
        }
        Err(err) => {
            warn!(error = %err, "unparseable frame from robot");
        }
    }
}
