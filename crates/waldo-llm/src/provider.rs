//! Provider trait and turn types.

use async_trait::async_trait;
use thiserror::Error;

use waldo_core::messages::{ContentBlock, Message};
use waldo_tools::ToolSpec;

/// Why the model stopped generating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Natural completion.
    EndTurn,
    /// The model wants tool results before continuing.
    ToolUse,
    /// Output limit reached.
    MaxTokens,
}

impl StopReason {
    /// Parse the wire `stop_reason` string; unknown values read as natural
    /// completion.
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "tool_use" => Self::ToolUse,
            "max_tokens" => Self::MaxTokens,
            _ => Self::EndTurn,
        }
    }
}

/// One complete model turn: ordered content plus the stop reason.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelTurn {
    /// Ordered text and tool-use segments, verbatim.
    pub content: Vec<ContentBlock>,
    /// Why generation stopped.
    pub stop_reason: StopReason,
}

/// Failures from the model boundary.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Non-success HTTP status from the API.
    #[error("model API returned HTTP {status}: {body}")]
    Http {
        /// Status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// Connection-level failure.
    #[error("model API transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not have the expected shape.
    #[error("malformed model response: {0}")]
    Malformed(String),
}

/// Anything that can produce the next model turn from the full history and
/// the tool catalog.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Request the next turn.
    async fn complete(
        &self,
        history: &[Message],
        tools: &[ToolSpec],
    ) -> Result<ModelTurn, ProviderError>;
}
