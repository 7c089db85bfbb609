//! Turn and content-block types for model communication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single turn in the conversation.
///
/// Turns are immutable once appended to the transcript. Only `user` and
/// `assistant` roles exist on this wire: tool results travel in user-role
/// turns, mirroring the Converse-style protocol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Turn {
    /// Create a user turn with a single text block.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
            timestamp: Some(Utc::now()),
        }
    }

    /// Create an assistant turn with a single text block.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentBlock::Text { text: text.into() }],
            timestamp: Some(Utc::now()),
        }
    }

    /// Create an assistant turn carrying one tool-use block.
    pub fn tool_use(block: ToolUseBlock) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentBlock::ToolUse(block)],
            timestamp: Some(Utc::now()),
        }
    }

    /// Create a user turn carrying the result for a tool use.
    pub fn tool_result(tool_use_id: impl Into<String>, text: impl Into<String>, status: ResultStatus) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::ToolResult(ToolResultBlock {
                tool_use_id: tool_use_id.into(),
                content: vec![text.into()],
                status,
            })],
            timestamp: Some(Utc::now()),
        }
    }

    /// Whether this turn has any content at all.
    ///
    /// Turns that fail this check are hidden from the model-facing view of
    /// the transcript; they are never removed from the retained log.
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    /// Concatenate all text blocks in this turn.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Tool-use blocks in this turn, in order.
    pub fn tool_uses(&self) -> Vec<&ToolUseBlock> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse(tu) => Some(tu),
                _ => None,
            })
            .collect()
    }
}

/// Conversation role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One part of a turn's content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    ToolUse(ToolUseBlock),
    ToolResult(ToolResultBlock),
}

/// A model-issued request to invoke a named tool with structured arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolUseBlock {
    pub id: String,
    pub name: String,
    pub input: serde_json::Value,
}

/// The outcome of executing a tool use, fed back as user-role content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResultBlock {
    pub tool_use_id: String,
    pub content: Vec<String>,
    pub status: ResultStatus,
}

/// Protocol-level result status.
///
/// The engine always reports `Success`; real failure is carried in the result
/// text. `Error` exists because the wire format supports it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Error,
}
