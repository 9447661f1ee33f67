//! # waldo-runtime
//!
//! The agent loop that drives a multi-turn conversation against the robot.
//!
//! - **Controller**: the `IDLE → THINKING → (EXECUTING_TOOLS → THINKING)* →
//!   {DONE | ABORTED | ERROR}` state machine, one in-flight call at a time
//! - **Emitter**: broadcast channel wrapper for [`waldo_core::events::AgentEvent`]
//! - **Result mapping**: one pure function from raw relay results to ordered
//!   tool-result content blocks
//!
//! ## Crate Position
//!
//! Aggregation layer. Depends on: waldo-core, waldo-llm, waldo-relay,
//! waldo-tools. Depended on by: waldo-server.

#![deny(unsafe_code)]

pub mod controller;
pub mod emitter;
pub mod errors;
pub mod result_map;

pub use controller::{Controller, ControllerConfig};
pub use emitter::EventEmitter;
pub use errors::AgentError;
pub use result_map::result_blocks;
