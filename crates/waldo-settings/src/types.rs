//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the JSON wire
//! format. Each type implements [`Default`] with production default values.
//! `#[serde(default)]` allows partial JSON: missing fields get their default
//! value during deserialization.

use serde::{Deserialize, Serialize};

/// Root settings type for the Waldo agent.
///
/// Loaded from a `settings.json` file with defaults applied for missing
/// fields, then `WALDO_*` environment variables layered on top.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct WaldoSettings {
    /// Server network settings.
    pub server: ServerSettings,
    /// Model provider settings.
    pub model: ModelSettings,
    /// Agent loop settings.
    pub agent: AgentSettings,
    /// Default data-source toggles for `observe_scene`.
    pub sources: SourceSettings,
}

impl WaldoSettings {
    /// Correct invalid values in place rather than rejecting the file.
    pub fn validate(&mut self) {
        if self.agent.max_iterations == 0 {
            tracing::warn!("maxIterations of 0 would never call the model, correcting to 1");
            self.agent.max_iterations = 1;
        }
        if self.agent.command_timeout_ms == 0 {
            let default = AgentSettings::default().command_timeout_ms;
            tracing::warn!("commandTimeoutMs of 0 times out instantly, correcting to {default}");
            self.agent.command_timeout_ms = default;
        }
    }
}

/// Server network settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// TCP port the WebSocket server listens on.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { port: 8765 }
    }
}

/// Model provider settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelSettings {
    /// Provider identifier. Only `anthropic` is recognized today.
    pub provider: String,
    /// Model identifier sent to the provider.
    pub model: String,
    /// API key. Usually supplied via `WALDO_API_KEY` rather than the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Provider API base URL.
    pub base_url: String,
    /// Per-turn output token cap.
    pub max_tokens: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-5".to_string(),
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 4096,
        }
    }
}

/// Agent loop settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentSettings {
    /// Cap on model iterations per operator message.
    pub max_iterations: usize,
    /// Base timeout for a robot command round trip.
    pub command_timeout_ms: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            command_timeout_ms: 10_000,
        }
    }
}

/// Session-default toggles for optional observation sources.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceSettings {
    /// Include the head camera by default.
    pub head_camera: bool,
    /// Include the wrist camera by default.
    pub wrist_camera: bool,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            head_camera: true,
            wrist_camera: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let settings: WaldoSettings =
            serde_json::from_str(r#"{"server": {"port": 9000}}"#).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.agent.max_iterations, 10);
        assert!(settings.sources.head_camera);
    }

    #[test]
    fn validate_corrects_zero_iterations() {
        let mut settings = WaldoSettings::default();
        settings.agent.max_iterations = 0;
        settings.agent.command_timeout_ms = 0;
        settings.validate();
        assert_eq!(settings.agent.max_iterations, 1);
        assert_eq!(settings.agent.command_timeout_ms, 10_000);
    }

    #[test]
    fn api_key_omitted_when_none() {
        let json = serde_json::to_string(&WaldoSettings::default()).unwrap();
        assert!(!json.contains("apiKey"));
    }
}
