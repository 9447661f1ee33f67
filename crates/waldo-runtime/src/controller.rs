//! The agent loop: model turns in, relay commands out.
//!
//! States: `IDLE → THINKING → (EXECUTING_TOOLS → THINKING)* → {DONE |
//! ABORTED | ERROR}`. One in-flight call per controller is a caller
//! obligation; nothing here serializes concurrent calls.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use waldo_core::events::AgentEvent;
use waldo_core::messages::{ContentBlock, Message, ToolInvocation};
use waldo_llm::{ModelProvider, StopReason};
use waldo_relay::CommandRelay;
use waldo_tools::{
    DEFAULT_COMMAND_TIMEOUT_MS, SessionDefaults, SourceOverrides, ToolSpec, catalog, dispatch,
};

use crate::emitter::EventEmitter;
use crate::errors::AgentError;
use crate::result_map::result_blocks;

/// Emergency-stop action sent best-effort after a cancellation.
const STOP_ACTION: &str = "stop";

/// Short budget for the best-effort stop command.
const STOP_TIMEOUT_MS: u64 = 2_000;

/// Controller configuration.
#[derive(Clone, Copy, Debug)]
pub struct ControllerConfig {
    /// Iteration cap bounding runaway tool-calling.
    pub max_iterations: usize,
    /// Base timeout for one robot command round trip.
    pub command_timeout_ms: u64,
    /// Session defaults for optional data sources.
    pub defaults: SessionDefaults,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            defaults: SessionDefaults::default(),
        }
    }
}

/// Drives the multi-turn conversation against the robot.
pub struct Controller {
    provider: Arc<dyn ModelProvider>,
    relay: Arc<CommandRelay>,
    tools: Vec<ToolSpec>,
    config: ControllerConfig,
    history: Mutex<Vec<Message>>,
    /// Token for the in-flight call, if any.
    active: Mutex<Option<CancellationToken>>,
    emitter: EventEmitter,
}

impl Controller {
    /// Create a controller over the given provider and relay.
    #[must_use]
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        relay: Arc<CommandRelay>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            provider,
            relay,
            tools: catalog(),
            config,
            history: Mutex::new(Vec::new()),
            active: Mutex::new(None),
            emitter: EventEmitter::new(),
        }
    }

    /// Subscribe to the event stream.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.emitter.subscribe()
    }

    /// Snapshot of the conversation history.
    #[must_use]
    pub fn history(&self) -> Vec<Message> {
        self.history.lock().clone()
    }

    /// Reset the conversation.
    ///
    /// Safe only when no call is in flight; that is the caller's obligation.
    pub fn clear_history(&self) {
        self.history.lock().clear();
        info!("conversation history cleared");
    }

    /// Cancel the in-flight call, if any. A no-op otherwise: no event is
    /// emitted and no state changes.
    pub fn abort(&self) {
        if let Some(token) = self.active.lock().as_ref() {
            warn!("abort requested");
            token.cancel();
        }
    }

    /// Process one operator message to completion.
    ///
    /// Emits progress events along the way and exactly one terminal event
    /// (`done`, `aborted`, or `error`) before returning.
    #[instrument(skip_all)]
    pub async fn process_message(
        &self,
        user_text: &str,
        overrides: Option<SourceOverrides>,
    ) -> Result<String, AgentError> {
        let cancel = CancellationToken::new();
        *self.active.lock() = Some(cancel.clone());

        let result = self.run_loop(user_text, overrides, &cancel).await;
        *self.active.lock() = None;

        match &result {
            Ok(text) => {
                let _ = self.emitter.emit(AgentEvent::Done { text: text.clone() });
            }
            Err(AgentError::Aborted) => {
                // One best-effort attempt to halt the robot; its own failure
                // is swallowed.
                if let Err(err) = self.relay.send(STOP_ACTION, json!({}), STOP_TIMEOUT_MS).await {
                    warn!(error = %err, "best-effort stop command failed");
                }
                let _ = self.emitter.emit(AgentEvent::Aborted);
            }
            Err(err) => {
                let _ = self.emitter.emit(AgentEvent::Error {
                    text: err.to_string(),
                });
            }
        }
        result
    }

    async fn run_loop(
        &self,
        user_text: &str,
        overrides: Option<SourceOverrides>,
        cancel: &CancellationToken,
    ) -> Result<String, AgentError> {
        let defaults = self
            .config
            .defaults
            .overlaid(&overrides.unwrap_or_default());
        self.history.lock().push(Message::user_text(user_text));

        let mut accumulated = String::new();
        for iteration in 0..self.config.max_iterations {
            checkpoint(cancel)?;
            let _ = self.emitter.emit(AgentEvent::Status {
                message: "Thinking…".into(),
            });
            debug!(iteration, "requesting model turn");
            let snapshot = self.history.lock().clone();
            let turn = self.provider.complete(&snapshot, &self.tools).await?;
            // A round trip may be long; re-check before acting on the turn.
            checkpoint(cancel)?;

            let mut queued: Vec<ToolInvocation> = Vec::new();
            for block in &turn.content {
                match block {
                    ContentBlock::Text { text } => {
                        let _ = self.emitter.emit(AgentEvent::Text { text: text.clone() });
                        if !accumulated.is_empty() {
                            accumulated.push('\n');
                        }
                        accumulated.push_str(text);
                    }
                    ContentBlock::ToolUse { id, name, input } => {
                        let _ = self.emitter.emit(AgentEvent::ToolCall {
                            id: id.clone(),
                            name: name.clone(),
                        });
                        queued.push(ToolInvocation {
                            id: id.clone(),
                            name: name.clone(),
                            input: input.clone(),
                        });
                    }
                    // Tool results never appear in assistant turns.
                    ContentBlock::ToolResult { .. } => {}
                }
            }

            // The full turn goes into history verbatim, streamed or not: the
            // model needs its own words back for context continuity.
            self.history.lock().push(Message::assistant(turn.content.clone()));

            if queued.is_empty() || turn.stop_reason != StopReason::ToolUse {
                info!(iteration, "natural completion");
                return Ok(accumulated);
            }

            let mut results: Vec<ContentBlock> = Vec::with_capacity(queued.len());
            for invocation in &queued {
                // Strictly sequential: a later invocation may depend on the
                // physical side effect of an earlier one.
                checkpoint(cancel)?;
                let _ = self.emitter.emit(AgentEvent::Status {
                    message: format!("Executing {}", invocation.name),
                });
                let raw = dispatch(
                    invocation,
                    &self.relay,
                    &defaults,
                    self.config.command_timeout_ms,
                )
                .await;
                checkpoint(cancel)?;
                results.push(ContentBlock::ToolResult {
                    tool_use_id: invocation.id.clone(),
                    content: result_blocks(&raw),
                });
            }
            self.history.lock().push(Message::tool_results(results));
        }

        // Cap exhausted: return what accumulated, indistinguishable from a
        // natural completion.
        warn!(
            max_iterations = self.config.max_iterations,
            "iteration cap exhausted"
        );
        Ok(accumulated)
    }
}

/// Cooperative cancellation point.
fn checkpoint(cancel: &CancellationToken) -> Result<(), AgentError> {
    if cancel.is_cancelled() {
        Err(AgentError::Aborted)
    } else {
        Ok(())
    }
}
