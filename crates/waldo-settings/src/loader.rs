//! Layered settings loading.
//!
//! Three layers, lowest priority first: compiled defaults, the JSON file
//! (deep-merged over defaults), then `WALDO_*` environment variables.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};
use crate::types::WaldoSettings;

/// Load settings from the given path with env overrides from the process
/// environment. A missing file is not an error: defaults plus env apply.
pub fn load_from_path(path: &Path) -> Result<WaldoSettings> {
    load_with_env(path, std::env::vars())
}

/// Load settings from the given path with an explicit env snapshot.
///
/// Separated from [`load_from_path`] so tests can inject variables without
/// mutating the process environment.
pub fn load_with_env(
    path: &Path,
    env: impl IntoIterator<Item = (String, String)>,
) -> Result<WaldoSettings> {
    let mut merged = serde_json::to_value(WaldoSettings::default())?;

    if path.exists() {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: Value = serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        deep_merge(&mut merged, file);
        debug!(?path, "settings file merged over defaults");
    } else {
        debug!(?path, "no settings file, using defaults");
    }

    let mut settings: WaldoSettings = serde_json::from_value(merged)?;
    apply_env(&mut settings, env);
    settings.validate();
    Ok(settings)
}

/// Recursively merge `overlay` into `base`.
///
/// Objects merge key by key; any other value (including null and arrays)
/// replaces the base value outright.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        let _ = base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Apply `WALDO_*` overrides. Unparseable values are skipped with a warning
/// rather than failing the load.
fn apply_env(settings: &mut WaldoSettings, env: impl IntoIterator<Item = (String, String)>) {
    for (key, value) in env {
        match key.as_str() {
            "WALDO_PORT" => match value.parse() {
                Ok(port) => settings.server.port = port,
                Err(_) => warn!(%value, "ignoring unparseable WALDO_PORT"),
            },
            "WALDO_MODEL" => settings.model.model = value,
            "WALDO_API_KEY" => settings.model.api_key = Some(value),
            "WALDO_MAX_ITERATIONS" => match value.parse() {
                Ok(n) => settings.agent.max_iterations = n,
                Err(_) => warn!(%value, "ignoring unparseable WALDO_MAX_ITERATIONS"),
            },
            _ => {}
        }
    }
}
