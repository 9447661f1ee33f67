//! # waldo-core
//!
//! Foundation types for the Waldo robot bridge.
//!
//! This crate provides the shared vocabulary that all other Waldo crates
//! depend on:
//!
//! - **Messages**: [`messages::Message`] with `User`/`Assistant` roles and
//!   ordered [`messages::ContentBlock`] segments
//! - **Tool result content**: [`content::ToolResultContent`] tagged union of
//!   text and image blocks
//! - **Wire frames**: [`frames::Frame`] command/result pairs exchanged with
//!   the actuation surface
//! - **Stream events**: [`events::AgentEvent`] emitted by the agent loop
//! - **Errors**: [`errors::RelayError`] relay-level failure taxonomy
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other waldo crates.

#![deny(unsafe_code)]

pub mod content;
pub mod errors;
pub mod events;
pub mod frames;
pub mod messages;
