//! Anthropic Messages API backend.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::types::{ContentBlock, ResultStatus, Role, ToolUseBlock};

use super::http::{anthropic_headers, shared_client, status_to_error};
use super::{ConverseRequest, ModelBackend, ModelReply, StopReason};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicBackend {
    api_key: String,
    base_url: String,
}

impl AnthropicBackend {
    pub fn new(api_key: impl Into<String>, base_url: Option<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    fn build_request_body(&self, request: &ConverseRequest) -> serde_json::Value {
        let mut messages = Vec::new();

        for turn in &request.turns {
            let role = match turn.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            let mut content: Vec<serde_json::Value> = Vec::new();
            for block in &turn.content {
                match block {
                    ContentBlock::Text { text } => {
                        if !text.is_empty() {
                            content.push(serde_json::json!({"type": "text", "text": text}));
                        }
                    }
                    ContentBlock::ToolUse(tu) => {
                        content.push(serde_json::json!({
                            "type": "tool_use",
                            "id": tu.id,
                            "name": tu.name,
                            "input": tu.input,
                        }));
                    }
                    ContentBlock::ToolResult(tr) => {
                        content.push(serde_json::json!({
                            "type": "tool_result",
                            "tool_use_id": tr.tool_use_id,
                            "content": tr.content.join("\n"),
                            "is_error": tr.status == ResultStatus::Error,
                        }));
                    }
                }
            }
            if !content.is_empty() {
                messages.push(serde_json::json!({"role": role, "content": content}));
            }
        }

        let mut body = serde_json::json!({
            "model": request.model_id,
            "messages": messages,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "top_p": request.top_p,
        });

        let obj = body.as_object_mut().expect("body is an object");

        if !request.system.is_empty() {
            obj.insert("system".into(), request.system.clone().into());
        }

        if !request.tools.is_empty() {
            let tool_defs: Vec<serde_json::Value> = request
                .tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.name,
                        "description": t.description,
                        "input_schema": t.input_schema,
                    })
                })
                .collect();
            obj.insert("tools".into(), tool_defs.into());
        }

        body
    }
}

#[async_trait]
impl ModelBackend for AnthropicBackend {
    async fn converse(&self, request: &ConverseRequest) -> Result<ModelReply> {
        let body = self.build_request_body(request);
        let url = format!("{}/messages", self.base_url);

        debug!(model = %request.model_id, turns = request.turns.len(), "anthropic converse");

        let resp = shared_client()
            .post(&url)
            .headers(anthropic_headers(&self.api_key, API_VERSION))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let data: MessagesResponse = resp.json().await?;

        let mut content = Vec::new();
        for block in data.content {
            match block.r#type.as_str() {
                "text" => {
                    if let Some(text) = block.text {
                        content.push(ContentBlock::Text { text });
                    }
                }
                "tool_use" => {
                    if let (Some(id), Some(name), Some(input)) = (block.id, block.name, block.input)
                    {
                        content.push(ContentBlock::ToolUse(ToolUseBlock { id, name, input }));
                    }
                }
                _ => {}
            }
        }

        let stop_reason = match data.stop_reason.as_deref() {
            Some("end_turn") => Some(StopReason::EndTurn),
            Some("max_tokens") => Some(StopReason::MaxTokens),
            Some("tool_use") => Some(StopReason::ToolUse),
            _ => None,
        };

        Ok(ModelReply {
            content,
            stop_reason,
        })
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseBlock {
    r#type: String,
    text: Option<String>,
    id: Option<String>,
    name: Option<String>,
    input: Option<serde_json::Value>,
}
