//! Anthropic Messages API provider.
//!
//! Non-streaming: one POST per turn. `convert` handles the translation
//! between waldo message types and the API wire format in both directions.

mod convert;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use waldo_core::messages::Message;
use waldo_tools::ToolSpec;

use crate::provider::{ModelProvider, ModelTurn, ProviderError};

/// API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Configuration for [`AnthropicProvider`].
#[derive(Clone, Debug)]
pub struct AnthropicConfig {
    /// API key for `x-api-key`.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// API origin; override for tests and proxies.
    pub base_url: String,
    /// Output token cap per turn.
    pub max_tokens: u32,
    /// Optional system prompt prepended to every request.
    pub system_prompt: Option<String>,
}

impl AnthropicConfig {
    /// Config with production defaults for the given key and model.
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://api.anthropic.com".into(),
            max_tokens: 4_096,
            system_prompt: None,
        }
    }
}

/// Messages API client implementing [`ModelProvider`].
#[derive(Debug)]
pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: reqwest::Client,
}

impl AnthropicProvider {
    /// Create a provider with its own HTTP client.
    #[must_use]
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn request_body(&self, history: &[Message], tools: &[ToolSpec]) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": convert::history_to_wire(history),
        });
        if !tools.is_empty() {
            body["tools"] = Value::Array(convert::tools_to_wire(tools));
        }
        if let Some(system) = &self.config.system_prompt {
            body["system"] = json!(system);
        }
        body
    }
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn complete(
        &self,
        history: &[Message],
        tools: &[ToolSpec],
    ) -> Result<ModelTurn, ProviderError> {
        let url = format!("{}/v1/messages", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.request_body(history, tools))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        let turn = convert::parse_turn(&body)?;
        debug!(
            blocks = turn.content.len(),
            stop_reason = ?turn.stop_reason,
            "model turn received"
        );
        Ok(turn)
    }
}
