//! Conversation messages and content blocks.
//!
//! [`Message`] is the unit of conversation history: an ordered, append-only
//! (within one call) sequence owned by the controller. Content blocks use the
//! Messages-API wire shape (`text` / `tool_use` / `tool_result`) so the
//! provider layer can pass them through with minimal conversion.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::ToolResultContent;

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The operator (or batched tool results echoed back to the model).
    User,
    /// The model.
    Assistant,
}

/// One conversation message: a role plus ordered content segments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message author.
    pub role: Role,
    /// Ordered content segments.
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Build a user message holding a single text segment.
    #[must_use]
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// Build an assistant message from a full model turn, verbatim.
    #[must_use]
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// Build the batched user-role message carrying one turn's tool results,
    /// in invocation order.
    #[must_use]
    pub fn tool_results(results: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: results,
        }
    }
}

/// One ordered segment of a message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text.
    Text {
        /// The text content.
        text: String,
    },
    /// A tool invocation requested by the model.
    ToolUse {
        /// Model-supplied invocation id, echoed back in the matching result.
        id: String,
        /// Tool name.
        name: String,
        /// Tool arguments as declared by the schema.
        input: Value,
    },
    /// The structured outcome of one tool invocation.
    ToolResult {
        /// Id of the invocation this result answers.
        tool_use_id: String,
        /// Ordered content blocks; never empty.
        content: Vec<ToolResultContent>,
    },
}

/// A structured tool request extracted from a model turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Model-supplied id; must be echoed in the corresponding result.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Tool arguments.
    pub input: Value,
}
