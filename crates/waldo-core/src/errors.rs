//! Relay-level failure taxonomy.

use thiserror::Error;

/// Failures surfaced by the command relay.
///
/// These never escape the dispatcher as errors: each one is reduced to an
/// `{"error": message}` tool result and fed back to the model. Only
/// cancellation (handled by the agent loop, not the relay) terminates a call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RelayError {
    /// No active downstream connection exists.
    #[error("not connected to the actuation surface")]
    NotConnected,

    /// A specific command's wait exceeded its budget.
    #[error("command '{action}' timed out after {timeout_ms}ms")]
    Timeout {
        /// Action that timed out.
        action: String,
        /// Budget that was exceeded.
        timeout_ms: u64,
    },

    /// The link dropped while commands were outstanding.
    #[error("connection to the actuation surface was lost")]
    Disconnected,
}
