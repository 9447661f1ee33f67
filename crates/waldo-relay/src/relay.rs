//! Command relay — correlation ids, pending waiters, per-command timers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use waldo_core::errors::RelayError;
use waldo_core::frames::Frame;

/// Generation tag for a bound connection.
///
/// Unbinding settles pending waiters only when the id matches the currently
/// registered link, so a stale socket's close handler cannot fail commands
/// that now belong to its replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkId(u64);

/// One outstanding command waiting for its result.
struct PendingCommand {
    tx: oneshot::Sender<Result<Value, RelayError>>,
    action: String,
    created_at: Instant,
}

/// The active link plus the pending table, guarded together.
struct RelayState {
    link: Option<ActiveLink>,
    pending: HashMap<u64, PendingCommand>,
}

struct ActiveLink {
    id: LinkId,
    outbound: mpsc::Sender<String>,
}

/// Correlation layer over the single robot connection.
///
/// Explicitly owned: constructed by the caller, shared via `Arc`, injected
/// into the dispatcher and the server handlers. Hosts arbitrarily many
/// simultaneously outstanding commands; completion order is unconstrained,
/// only id allocation order is monotonic.
pub struct CommandRelay {
    next_command_id: AtomicU64,
    next_link_id: AtomicU64,
    state: Mutex<RelayState>,
}

impl CommandRelay {
    /// Create a relay with no bound connection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_command_id: AtomicU64::new(0),
            next_link_id: AtomicU64::new(0),
            state: Mutex::new(RelayState {
                link: None,
                pending: HashMap::new(),
            }),
        }
    }

    /// Register the active connection, replacing any previous one.
    ///
    /// Replacement does not settle waiters created under the old link; they
    /// keep running against their own timers and can still be resolved.
    pub fn bind(&self, outbound: mpsc::Sender<String>) -> LinkId {
        let id = LinkId(self.next_link_id.fetch_add(1, Ordering::Relaxed) + 1);
        let mut state = self.state.lock();
        let replaced = state.link.is_some();
        state.link = Some(ActiveLink { id, outbound });
        debug!(link = id.0, replaced, "robot link bound");
        id
    }

    /// Drop the registration for `link` if it is still the active one.
    ///
    /// Loss of the currently registered connection rejects every outstanding
    /// waiter with [`RelayError::Disconnected`] and clears the table. A stale
    /// generation is a no-op.
    pub fn unbind(&self, link: LinkId) {
        let settled = {
            let mut state = self.state.lock();
            if state.link.as_ref().map(|l| l.id) != Some(link) {
                return;
            }
            state.link = None;
            state.pending.drain().collect::<Vec<_>>()
        };
        if !settled.is_empty() {
            warn!(
                link = link.0,
                outstanding = settled.len(),
                "robot link lost with commands outstanding"
            );
        }
        for (id, cmd) in settled {
            debug!(id, action = %cmd.action, "rejecting pending command on disconnect");
            let _ = cmd.tx.send(Err(RelayError::Disconnected));
        }
    }

    /// Whether a connection is currently registered.
    pub fn is_connected(&self) -> bool {
        self.state.lock().link.is_some()
    }

    /// Number of commands currently awaiting a result.
    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Send a command and await its result for at most `timeout_ms`.
    ///
    /// Fails immediately with [`RelayError::NotConnected`] when no link is
    /// registered. Otherwise allocates the next correlation id, stores the
    /// waiter, transmits the command frame, and waits. Timer expiry removes
    /// the waiter and fails with [`RelayError::Timeout`]; a result racing the
    /// deadline wins.
    pub async fn send(
        &self,
        action: &str,
        params: Value,
        timeout_ms: u64,
    ) -> Result<Value, RelayError> {
        let (id, outbound, mut rx) = {
            let mut state = self.state.lock();
            let Some(link) = state.link.as_ref() else {
                return Err(RelayError::NotConnected);
            };
            let outbound = link.outbound.clone();
            let id = self.next_command_id.fetch_add(1, Ordering::Relaxed) + 1;
            let (tx, rx) = oneshot::channel();
            let _ = state.pending.insert(
                id,
                PendingCommand {
                    tx,
                    action: action.to_owned(),
                    created_at: Instant::now(),
                },
            );
            (id, outbound, rx)
        };

        let frame = Frame::Command {
            id,
            action: action.to_owned(),
            params,
        };
        debug!(id, action, timeout_ms, "command sent");
        if outbound.send(frame.to_json()).await.is_err() {
            // The socket closed under us before unbind ran; settle our own
            // waiter so nothing leaks.
            let _ = self.state.lock().pending.remove(&id);
            return Err(RelayError::Disconnected);
        }

        match tokio::time::timeout(Duration::from_millis(timeout_ms), &mut rx).await {
            Ok(Ok(result)) => result,
            // Waiter sender dropped without a value: table was torn down.
            Ok(Err(_)) => Err(RelayError::Disconnected),
            Err(_elapsed) => {
                let removed = self.state.lock().pending.remove(&id);
                if let Some(cmd) = removed {
                    debug!(
                        id,
                        action,
                        waited_ms = cmd.created_at.elapsed().as_millis() as u64,
                        "command timed out"
                    );
                    Err(RelayError::Timeout {
                        action: action.to_owned(),
                        timeout_ms,
                    })
                } else {
                    // A resolve or disconnect won the race against the timer.
                    // The winner removes the entry before pushing the value,
                    // so the channel may still be empty at this instant; await
                    // it rather than peeking. The settling side always sends
                    // promptly after removal, so this cannot hang.
                    match (&mut rx).await {
                        Ok(result) => result,
                        Err(_) => Err(RelayError::Disconnected),
                    }
                }
            }
        }
    }

    /// Complete the pending command with the given correlation id.
    ///
    /// Returns `true` when a waiter was found and settled. Unmatched ids
    /// (already settled or never issued) are ignored and return `false`.
    pub fn resolve(&self, id: u64, result: Value) -> bool {
        let removed = self.state.lock().pending.remove(&id);
        match removed {
            Some(cmd) => {
                debug!(id, action = %cmd.action, "command resolved");
                cmd.tx.send(Ok(result)).is_ok()
            }
            None => {
                debug!(id, "ignoring result for unknown or settled command");
                false
            }
        }
    }
}

impl Default for CommandRelay {
    fn default() -> Self {
        Self::new()
    }
}
