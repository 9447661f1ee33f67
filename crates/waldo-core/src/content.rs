//! Tool result content blocks.
//!
//! A tool result is an ordered sequence of [`ToolResultContent`] blocks.
//! Image payloads are held as raw bytes in memory and encoded to base64 only
//! at serialization boundaries (provider wire, persistence).

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

/// One block of a tool result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolResultContent {
    /// Plain text block.
    Text {
        /// The text content.
        text: String,
    },
    /// Image block (camera capture).
    Image {
        /// Raw image bytes; base64 on the wire.
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
        /// IANA media type, e.g. `image/png`.
        media_type: String,
    },
}

impl ToolResultContent {
    /// Shorthand for a text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Shorthand for an image block.
    #[must_use]
    pub fn image(data: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self::Image {
            data,
            media_type: media_type.into(),
        }
    }
}

/// Base64 (de)serialization for raw byte payloads.
mod base64_bytes {
    use super::BASE64;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&BASE64.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(de)?;
        BASE64.decode(encoded).map_err(serde::de::Error::custom)
    }
}

/// Decode a base64 payload into raw bytes, if valid.
#[must_use]
pub fn decode_base64(encoded: &str) -> Option<Vec<u8>> {
    BASE64.decode(encoded).ok()
}

/// Encode raw bytes as base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    BASE64.encode(data)
}
