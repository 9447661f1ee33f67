//! Agent stream events.
//!
//! [`AgentEvent`] is what a stream sink (WebSocket client, test harness)
//! receives from the agent loop, in emission order. Each `process_message`
//! call ends with exactly one terminal event: `done`, `aborted`, or `error`.
//! Delivery is fire-and-forget; a sink that lags or disconnects never stalls
//! the loop.

use serde::{Deserialize, Serialize};

/// Events emitted by the agent loop during one orchestration call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// Progress note ("Thinking…", "Executing walk_to").
    Status {
        /// Human-readable progress message.
        message: String,
    },
    /// A text segment from the model, streamed as soon as it is seen.
    Text {
        /// The text segment.
        text: String,
    },
    /// A tool invocation announced before execution.
    ToolCall {
        /// Model-supplied invocation id.
        id: String,
        /// Tool name.
        name: String,
    },
    /// Terminal: the call failed (provider error and similar).
    Error {
        /// Error description.
        text: String,
    },
    /// Terminal: the call was cancelled by the operator.
    Aborted,
    /// Terminal: natural completion with the accumulated text.
    Done {
        /// Concatenated text segments of the whole call.
        text: String,
    },
}

impl AgentEvent {
    /// Wire tag of this event (`status`, `text`, `tool_call`, `error`,
    /// `aborted`, `done`).
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Text { .. } => "text",
            Self::ToolCall { .. } => "tool_call",
            Self::Error { .. } => "error",
            Self::Aborted => "aborted",
            Self::Done { .. } => "done",
        }
    }

    /// Whether this event terminates a `process_message` call.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Done { .. } | Self::Aborted | Self::Error { .. }
        )
    }
}
