//! Model backend trait and the Anthropic implementation.

pub mod anthropic;
pub mod http;

pub use anthropic::AnthropicBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{ContentBlock, Turn};

/// A request sent to the model backend.
///
/// `turns` is the filtered model view of the transcript, never the retained
/// log itself.
#[derive(Debug, Clone, Serialize)]
pub struct ConverseRequest {
    pub model_id: String,
    pub turns: Vec<Turn>,
    pub system: String,
    pub tools: Vec<ToolSpec>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
}

/// Tool descriptor offered to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Why the model stopped emitting content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
}

/// An ordered content-block reply from the backend.
#[derive(Debug, Clone)]
pub struct ModelReply {
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<StopReason>,
}

/// A conversational model backend.
///
/// One request, one ordered content-block reply. Retry policy, if any, lives
/// behind this trait, not in the engine.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn converse(&self, request: &ConverseRequest) -> Result<ModelReply>;
}
