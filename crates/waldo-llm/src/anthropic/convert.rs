//! Waldo types ↔ Messages API wire format.

use serde_json::{Value, json};

use waldo_core::content::{ToolResultContent, encode_base64};
use waldo_core::messages::{ContentBlock, Message, Role};
use waldo_tools::ToolSpec;

use crate::provider::{ModelTurn, ProviderError, StopReason};

/// Convert the conversation history into the API `messages` array.
pub fn history_to_wire(history: &[Message]) -> Vec<Value> {
    history
        .iter()
        .map(|msg| {
            let role = match msg.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            let content: Vec<Value> = msg.content.iter().map(block_to_wire).collect();
            json!({"role": role, "content": content})
        })
        .collect()
}

fn block_to_wire(block: &ContentBlock) -> Value {
    match block {
        ContentBlock::Text { text } => json!({"type": "text", "text": text}),
        ContentBlock::ToolUse { id, name, input } => {
            json!({"type": "tool_use", "id": id, "name": name, "input": input})
        }
        ContentBlock::ToolResult {
            tool_use_id,
            content,
        } => {
            let parts: Vec<Value> = content.iter().map(result_content_to_wire).collect();
            json!({"type": "tool_result", "tool_use_id": tool_use_id, "content": parts})
        }
    }
}

fn result_content_to_wire(content: &ToolResultContent) -> Value {
    match content {
        ToolResultContent::Text { text } => json!({"type": "text", "text": text}),
        ToolResultContent::Image { data, media_type } => json!({
            "type": "image",
            "source": {
                "type": "base64",
                "media_type": media_type,
                "data": encode_base64(data),
            }
        }),
    }
}

/// Convert the tool catalog into the API `tools` array.
pub fn tools_to_wire(tools: &[ToolSpec]) -> Vec<Value> {
    tools
        .iter()
        .map(|spec| {
            json!({
                "name": spec.name,
                "description": spec.description,
                "input_schema": spec.parameters,
            })
        })
        .collect()
}

/// Parse a Messages API response body into a [`ModelTurn`].
pub fn parse_turn(body: &Value) -> Result<ModelTurn, ProviderError> {
    let raw_blocks = body
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::Malformed("missing content array".into()))?;

    let mut content = Vec::with_capacity(raw_blocks.len());
    for raw in raw_blocks {
        match raw.get("type").and_then(Value::as_str) {
            Some("text") => {
                let text = raw
                    .get("text")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ProviderError::Malformed("text block without text".into()))?;
                content.push(ContentBlock::Text { text: text.into() });
            }
            Some("tool_use") => {
                let id = raw
                    .get("id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ProviderError::Malformed("tool_use without id".into()))?;
                let name = raw
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ProviderError::Malformed("tool_use without name".into()))?;
                content.push(ContentBlock::ToolUse {
                    id: id.into(),
                    name: name.into(),
                    input: raw.get("input").cloned().unwrap_or(json!({})),
                });
            }
            // Thinking and other block kinds are not part of the relay
            // conversation; skip them rather than failing the turn.
            _ => {}
        }
    }

    let stop_reason = body
        .get("stop_reason")
        .and_then(Value::as_str)
        .map_or(StopReason::EndTurn, StopReason::from_wire);

    Ok(ModelTurn {
        content,
        stop_reason,
    })
}
