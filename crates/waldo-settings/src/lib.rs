//! # waldo-settings
//!
//! Configuration management with layered sources for the Waldo agent.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`WaldoSettings::default()`]
//! 2. **Settings file** — JSON, deep-merged over defaults
//! 3. **Environment variables** — `WALDO_*` overrides (highest priority)
//!
//! Loading is explicit rather than a global singleton: the binary loads once
//! at startup and passes the value down.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_from_path, load_with_env};
pub use types::{AgentSettings, ModelSettings, ServerSettings, SourceSettings, WaldoSettings};
