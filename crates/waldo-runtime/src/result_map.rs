//! Raw relay results → ordered tool-result content blocks.
//!
//! One pure mapping function; the loop never mutates result objects in
//! place. Ordering rule: an `error` field short-circuits everything else;
//! otherwise recognized image fields come first (each image followed by its
//! caption), then one trailing text block with the remaining fields.

use serde_json::Value;

use waldo_core::content::{ToolResultContent, decode_base64};

/// Image-bearing result fields and their captions, in emission order.
const IMAGE_FIELDS: &[(&str, &str)] = &[
    ("head_camera", "Head camera view"),
    ("wrist_camera", "Wrist camera view"),
];

/// Fallback for a result that produced no blocks at all.
const EMPTY_RESULT_TEXT: &str = "Tool executed successfully.";

/// Map a raw result payload to tool-result content blocks.
///
/// The returned sequence is never empty.
#[must_use]
pub fn result_blocks(raw: &Value) -> Vec<ToolResultContent> {
    if let Some(error) = raw.get("error") {
        let text = error
            .as_str()
            .map_or_else(|| error.to_string(), ToString::to_string);
        return vec![ToolResultContent::text(text)];
    }

    let mut blocks = Vec::new();
    let mut rest = serde_json::Map::new();

    match raw {
        Value::Object(map) => {
            let mut consumed = Vec::new();
            for (field, caption) in IMAGE_FIELDS {
                let decoded = map.get(*field).and_then(Value::as_str).and_then(decode_base64);
                if let Some(data) = decoded {
                    blocks.push(ToolResultContent::image(data, "image/png"));
                    blocks.push(ToolResultContent::text(*caption));
                    consumed.push(*field);
                }
            }
            // Undecodable or non-string image fields fall through to the
            // trailing text block with everything else.
            for (key, value) in map {
                if !consumed.contains(&key.as_str()) {
                    let _ = rest.insert(key.clone(), value.clone());
                }
            }
        }
        Value::Null => {}
        other => {
            blocks.push(ToolResultContent::text(other.to_string()));
        }
    }

    if !rest.is_empty() {
        blocks.push(ToolResultContent::text(
            serde_json::to_string(&rest).unwrap_or_default(),
        ));
    }

    if blocks.is_empty() {
        blocks.push(ToolResultContent::text(EMPTY_RESULT_TEXT));
    }

    blocks
}
