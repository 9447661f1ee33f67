//! Tool dispatcher — one model invocation to one relay command.
//!
//! All failure modes are reduced to a uniform `{"error": message}` result
//! shape: the model, not the caller, decides how to react. Cancellation is
//! the agent loop's concern and is never handled here.

use serde_json::{Value, json};
use tracing::{debug, warn};

use waldo_core::messages::ToolInvocation;
use waldo_relay::CommandRelay;

use crate::catalog::{find, timeout_ms_for};
use crate::defaults::SessionDefaults;

/// Execute one tool invocation through the relay.
///
/// `base_timeout_ms` is the configured per-command budget; long-running
/// tools get a multiple of it (see [`timeout_ms_for`]). Unknown names,
/// relay failures, and remote error payloads all come back as plain result
/// values; this function itself never fails.
pub async fn dispatch(
    invocation: &ToolInvocation,
    relay: &CommandRelay,
    defaults: &SessionDefaults,
    base_timeout_ms: u64,
) -> Value {
    if find(&invocation.name).is_none() {
        warn!(tool = %invocation.name, "model requested unregistered tool");
        return json!({"error": format!("Unknown tool: {}", invocation.name)});
    }

    let params = resolve_params(&invocation.name, &invocation.input, defaults);
    let timeout_ms = timeout_ms_for(&invocation.name, base_timeout_ms);
    debug!(tool = %invocation.name, timeout_ms, "dispatching tool invocation");

    match relay.send(&invocation.name, params, timeout_ms).await {
        Ok(result) => result,
        Err(err) => {
            warn!(tool = %invocation.name, error = %err, "relay call failed");
            json!({"error": err.to_string()})
        }
    }
}

/// Resolve optional parameters with the precedence: explicit input value →
/// session default → hardcoded default.
fn resolve_params(name: &str, input: &Value, defaults: &SessionDefaults) -> Value {
    let mut params = match input {
        Value::Object(map) => map.clone(),
        // The schema declares objects everywhere; tolerate a missing body.
        _ => serde_json::Map::new(),
    };

    match name {
        "observe_scene" => {
            let explicit = input.get("sources");
            let toggle = |field: &str, session: bool| {
                explicit
                    .and_then(|s| s.get(field))
                    .and_then(Value::as_bool)
                    .unwrap_or(session)
            };
            let _ = params.insert(
                "sources".into(),
                json!({
                    "head_camera": toggle("head_camera", defaults.head_camera),
                    "wrist_camera": toggle("wrist_camera", defaults.wrist_camera),
                }),
            );
        }
        "grasp_object" | "release_object" => {
            if !params.contains_key("hand") {
                let _ = params.insert("hand".into(), json!("right"));
            }
        }
        // Remaining tools pass their input through; the schema is the
        // contract and no range validation happens here.
        _ => {}
    }

    Value::Object(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DEFAULT_COMMAND_TIMEOUT_MS;
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use waldo_core::frames::Frame;

    fn invocation(name: &str, input: Value) -> ToolInvocation {
        ToolInvocation {
            id: "tu_1".into(),
            name: name.into(),
            input,
        }
    }

    fn bound_relay() -> (Arc<CommandRelay>, mpsc::Receiver<String>) {
        let relay = Arc::new(CommandRelay::new());
        let (tx, rx) = mpsc::channel(8);
        let _ = relay.bind(tx);
        (relay, rx)
    }

    /// Run a dispatch and capture the command frame it produced, answering it
    /// with `result` so the dispatch completes.
    async fn dispatch_capturing(
        inv: ToolInvocation,
        defaults: SessionDefaults,
        result: Value,
    ) -> (Value, Frame) {
        let (relay, mut rx) = bound_relay();
        let r = Arc::clone(&relay);
        let task = tokio::spawn(async move {
            dispatch(&inv, &r, &defaults, DEFAULT_COMMAND_TIMEOUT_MS).await
        });
        let frame = Frame::parse(&rx.recv().await.unwrap()).unwrap();
        let Frame::Command { id, .. } = &frame else {
            panic!("expected command frame");
        };
        assert!(relay.resolve(*id, result));
        (task.await.unwrap(), frame)
    }

    #[tokio::test]
    async fn unknown_tool_reports_without_relay_call() {
        // Unbound relay: an unknown tool must short-circuit before send.
        let relay = CommandRelay::new();
        let result = dispatch(
            &invocation("self_destruct", json!({})),
            &relay,
            &SessionDefaults::default(),
            DEFAULT_COMMAND_TIMEOUT_MS,
        )
        .await;
        assert_eq!(result["error"], "Unknown tool: self_destruct");
    }

    #[tokio::test]
    async fn relay_failure_reduced_to_error_result() {
        let relay = CommandRelay::new(); // never bound
        let result = dispatch(
            &invocation("say", json!({"text": "hi"})),
            &relay,
            &SessionDefaults::default(),
            DEFAULT_COMMAND_TIMEOUT_MS,
        )
        .await;
        assert!(
            result["error"]
                .as_str()
                .unwrap()
                .contains("not connected")
        );
    }

    #[tokio::test]
    async fn explicit_source_beats_session_default() {
        let defaults = SessionDefaults::default(); // head_camera: true
        let inv = invocation(
            "observe_scene",
            json!({"sources": {"head_camera": false}}),
        );
        let (_result, frame) = dispatch_capturing(inv, defaults, json!({})).await;
        let Frame::Command { params, .. } = frame else {
            unreachable!()
        };
        assert_eq!(params["sources"]["head_camera"], false);
        assert_eq!(params["sources"]["wrist_camera"], true);
    }

    #[tokio::test]
    async fn session_default_beats_hardcoded_default() {
        let defaults = SessionDefaults {
            head_camera: false,
            wrist_camera: true,
        };
        let inv = invocation("observe_scene", json!({}));
        let (_result, frame) = dispatch_capturing(inv, defaults, json!({})).await;
        let Frame::Command { params, .. } = frame else {
            unreachable!()
        };
        assert_eq!(params["sources"]["head_camera"], false);
    }

    #[tokio::test]
    async fn hardcoded_default_applies_last() {
        let inv = invocation("observe_scene", json!({}));
        let (_result, frame) =
            dispatch_capturing(inv, SessionDefaults::default(), json!({})).await;
        let Frame::Command { params, .. } = frame else {
            unreachable!()
        };
        assert_eq!(params["sources"]["head_camera"], true);
        assert_eq!(params["sources"]["wrist_camera"], true);
    }

    #[tokio::test]
    async fn grasp_defaults_to_right_hand() {
        let inv = invocation("grasp_object", json!({"object": "cup"}));
        let (_result, frame) =
            dispatch_capturing(inv, SessionDefaults::default(), json!({})).await;
        let Frame::Command { params, .. } = frame else {
            unreachable!()
        };
        assert_eq!(params["hand"], "right");
        assert_eq!(params["object"], "cup");
    }

    #[tokio::test]
    async fn explicit_hand_is_kept() {
        let inv = invocation("grasp_object", json!({"object": "cup", "hand": "left"}));
        let (_result, frame) =
            dispatch_capturing(inv, SessionDefaults::default(), json!({})).await;
        let Frame::Command { params, .. } = frame else {
            unreachable!()
        };
        assert_eq!(params["hand"], "left");
    }

    #[tokio::test]
    async fn remote_result_passes_through_verbatim() {
        let inv = invocation("say", json!({"text": "hello"}));
        let (result, _frame) = dispatch_capturing(
            inv,
            SessionDefaults::default(),
            json!({"spoken": true, "duration_ms": 750}),
        )
        .await;
        assert_eq!(result["spoken"], true);
        assert_eq!(result["duration_ms"], 750);
    }

    #[tokio::test(start_paused = true)]
    async fn walk_to_uses_extended_timeout() {
        let (relay, mut rx) = bound_relay();
        let inv = invocation("walk_to", json!({"x": 1.0, "y": 0.0}));
        let r = Arc::clone(&relay);
        let defaults = SessionDefaults::default();
        let task = tokio::spawn(async move {
            dispatch(&inv, &r, &defaults, DEFAULT_COMMAND_TIMEOUT_MS).await
        });
        let _ = rx.recv().await.unwrap();

        // Alive past the default budget…
        tokio::time::advance(std::time::Duration::from_millis(59_000)).await;
        assert!(!task.is_finished());

        // …but not past six times the default.
        tokio::time::advance(std::time::Duration::from_millis(1_500)).await;
        let result = task.await.unwrap();
        assert!(result["error"].as_str().unwrap().contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn configured_base_timeout_is_honored() {
        let (relay, mut rx) = bound_relay();
        let inv = invocation("say", json!({"text": "hi"}));
        let r = Arc::clone(&relay);
        let defaults = SessionDefaults::default();
        let task = tokio::spawn(async move { dispatch(&inv, &r, &defaults, 2_000).await });
        let _ = rx.recv().await.unwrap();

        tokio::time::advance(std::time::Duration::from_millis(1_999)).await;
        assert!(!task.is_finished());

        tokio::time::advance(std::time::Duration::from_millis(2)).await;
        let result = task.await.unwrap();
        assert!(result["error"].as_str().unwrap().contains("2000ms"));
    }
}
