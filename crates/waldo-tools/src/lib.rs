//! # waldo-tools
//!
//! The declarative tool surface the model sees, and the dispatcher that maps
//! one model-issued invocation onto one relay command.
//!
//! - **Catalog**: static [`catalog::ToolSpec`] list, exposed verbatim to the
//!   model each turn. Schemas are documentation/contract only.
//! - **Dispatcher**: [`dispatcher::dispatch`] resolves optional parameters
//!   (explicit input → session default → hardcoded default), picks the
//!   per-tool timeout, and reduces every relay failure to a uniform
//!   `{"error": message}` result. It never fails itself.
//!
//! ## Crate Position
//!
//! Depends on: waldo-core, waldo-relay.
//! Depended on by: waldo-runtime.

#![deny(unsafe_code)]

pub mod catalog;
pub mod defaults;
pub mod dispatcher;

pub use catalog::{DEFAULT_COMMAND_TIMEOUT_MS, ToolParameterSchema, ToolSpec, catalog};
pub use defaults::{SessionDefaults, SourceOverrides};
pub use dispatcher::dispatch;
