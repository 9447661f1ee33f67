//! Agent-loop failure taxonomy.
//!
//! Relay and dispatch failures never reach this level: they are folded into
//! tool results for the model to react to. Only cancellation and provider
//! failures terminate a call.

use thiserror::Error;
use waldo_llm::ProviderError;

/// Terminal outcomes of a `process_message` call other than success.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The operator cancelled the in-flight call.
    #[error("operation aborted")]
    Aborted,

    /// The model boundary failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
