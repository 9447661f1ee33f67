//! # waldo-llm
//!
//! The model boundary: a [`provider::ModelProvider`] trait the agent loop
//! drives, plus the Anthropic Messages API implementation.
//!
//! The loop is provider-agnostic; anything that can turn a conversation
//! history and a tool catalog into a [`provider::ModelTurn`] plugs in here
//! (including scripted providers in tests).
//!
//! ## Crate Position
//!
//! Depends on: waldo-core, waldo-tools.
//! Depended on by: waldo-runtime, waldo-agent.

#![deny(unsafe_code)]

pub mod anthropic;
pub mod provider;

pub use anthropic::{AnthropicConfig, AnthropicProvider};
pub use provider::{ModelProvider, ModelTurn, ProviderError, StopReason};
