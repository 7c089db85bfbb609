//! The turn orchestrator: one user utterance, many model↔tool round-trips.

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::error::{EngineError, Result};
use crate::prompt::{self, PromptContext};
use crate::provider::{ConverseRequest, ModelBackend, ModelReply};
use crate::tools::ToolRegistry;
use crate::transcript::Transcript;
use crate::types::{ContentBlock, ResultStatus, ToolUseBlock, Turn};

use super::gate::{ConfirmationGate, GateDecision};

/// Fallback assistant text when a turn produces no text at all. A turn with
/// empty content is never appended at this boundary.
pub const EMPTY_RESPONSE_FALLBACK: &str = "complete";

/// Observable engine events, for console display.
#[derive(Debug, Clone)]
pub enum TurnEvent {
    ToolInvoked { name: String, input: serde_json::Value },
    ToolCompleted { name: String, result: String },
}

/// Callback used to surface [`TurnEvent`]s.
pub type EventSink = Arc<dyn Fn(TurnEvent) + Send + Sync>;

/// Drives one user-initiated turn to completion.
///
/// The engine is the single writer of the transcript it is handed. Tool
/// chains are followed recursively: after executing the tool uses of one
/// response, the updated conversation is re-sent and any further tool uses
/// are processed the same way, up to `max_tool_depth` model calls per turn.
pub struct TurnEngine {
    backend: Arc<dyn ModelBackend>,
    registry: Arc<ToolRegistry>,
    gate: Arc<dyn ConfirmationGate>,
    config: SessionConfig,
    prompt_ctx: PromptContext,
    cancel: CancellationToken,
    session_id: Uuid,
    request_log: Option<PathBuf>,
    event_sink: Option<EventSink>,
}

impl TurnEngine {
    pub fn new(
        backend: Arc<dyn ModelBackend>,
        registry: Arc<ToolRegistry>,
        gate: Arc<dyn ConfirmationGate>,
        config: SessionConfig,
        cancel: CancellationToken,
    ) -> Self {
        let prompt_ctx = PromptContext {
            web_search_enabled: registry.contains("webSearch"),
            ..PromptContext::default()
        };
        Self {
            backend,
            registry,
            gate,
            config,
            prompt_ctx,
            cancel,
            session_id: Uuid::new_v4(),
            request_log: None,
            event_sink: None,
        }
    }

    /// Serialize each outbound model request to this file (overwritten per
    /// call), for offline inspection.
    pub fn with_request_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.request_log = Some(path.into());
        self
    }

    pub fn with_event_sink(mut self, sink: EventSink) -> Self {
        self.event_sink = Some(sink);
        self
    }

    pub fn with_sam_s3_bucket(mut self, bucket: Option<String>) -> Self {
        self.prompt_ctx.sam_s3_bucket = bucket;
        self
    }

    /// Advisory remaining-iteration count surfaced to the model's prompt.
    pub fn set_iterations_left(&mut self, left: Option<u32>) {
        self.prompt_ctx.iterations_left = left;
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run one user utterance through the loop and return the assembled
    /// assistant response.
    ///
    /// # Errors
    ///
    /// Propagates model-call failures, [`EngineError::UnknownTool`] (a
    /// registry/model mismatch, fatal to the turn), and cancellation. The
    /// transcript is left consistent in all of these cases: a tool-use turn
    /// is only appended once its result turn is guaranteed to follow.
    pub async fn run_turn(&self, transcript: &mut Transcript, user_text: &str) -> Result<String> {
        debug!(session = %self.session_id, "turn start");
        transcript.push(Turn::user(user_text));

        let mut assistant_response = String::new();
        let mut vetoed = false;

        for depth in 0..self.config.max_tool_depth {
            let reply = self.converse(transcript).await?;

            let mut tool_uses: Vec<ToolUseBlock> = Vec::new();
            for block in reply.content {
                match block {
                    ContentBlock::Text { text } => {
                        if !text.is_empty() {
                            if !assistant_response.is_empty() {
                                assistant_response.push('\n');
                            }
                            assistant_response.push_str(&text);
                        }
                    }
                    ContentBlock::ToolUse(tu) => tool_uses.push(tu),
                    // The model does not author tool results.
                    ContentBlock::ToolResult(_) => {}
                }
            }

            if tool_uses.is_empty() {
                break;
            }

            debug!(session = %self.session_id, depth, count = tool_uses.len(), "processing tool uses");

            for tu in tool_uses {
                // Resolve first: an unknown name must not leave an
                // unanswered tool-use turn behind when it aborts the turn.
                let kind = self.registry.resolve(&tu.name)?;

                if kind.requires_confirmation() && self.config.require_confirmation {
                    let decision = self.with_cancel(self.gate.confirm(&tu.name, &tu.input)).await?;
                    if decision == GateDecision::Veto {
                        debug!(session = %self.session_id, tool = %tu.name, "tool use vetoed");
                        vetoed = true;
                        break;
                    }
                }

                self.emit(TurnEvent::ToolInvoked {
                    name: tu.name.clone(),
                    input: tu.input.clone(),
                });

                transcript.push(Turn::tool_use(tu.clone()));
                let result_text = self
                    .with_cancel(self.registry.execute(&tu.name, &tu.input))
                    .await?;
                // Protocol status stays Success; failure is conveyed in the
                // result text itself.
                transcript.push(Turn::tool_result(
                    &tu.id,
                    &result_text,
                    ResultStatus::Success,
                ));

                self.emit(TurnEvent::ToolCompleted {
                    name: tu.name.clone(),
                    result: result_text,
                });
            }

            if vetoed {
                break;
            }

            if depth + 1 == self.config.max_tool_depth {
                warn!(session = %self.session_id, depth = depth + 1, "tool depth cap reached, finalizing turn");
            }
        }

        let final_text = if assistant_response.is_empty() {
            EMPTY_RESPONSE_FALLBACK.to_string()
        } else {
            assistant_response
        };
        transcript.push(Turn::assistant(final_text.clone()));

        debug!(session = %self.session_id, turns = transcript.len(), "turn complete");
        Ok(final_text)
    }

    async fn converse(&self, transcript: &Transcript) -> Result<ModelReply> {
        let request = ConverseRequest {
            model_id: self.config.model_id.clone(),
            turns: transcript.model_view(),
            system: prompt::system_prompt(&self.config, &self.prompt_ctx),
            tools: self.registry.specs(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            top_p: self.config.top_p,
        };

        self.log_request(&request).await;
        self.with_cancel(self.backend.converse(&request)).await
    }

    /// Persist the outbound request for offline inspection. Failures are
    /// logged and swallowed; inspection must never break the conversation.
    async fn log_request(&self, request: &ConverseRequest) {
        let Some(path) = &self.request_log else { return };
        match serde_json::to_string_pretty(request) {
            Ok(json) => {
                if let Err(e) = tokio::fs::write(path, json).await {
                    warn!(path = %path.display(), error = %e, "failed to write request log");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize request log"),
        }
    }

    async fn with_cancel<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(EngineError::Canceled),
            result = fut => result,
        }
    }

    fn emit(&self, event: TurnEvent) {
        if let Some(sink) = &self.event_sink {
            sink(event);
        }
    }
}
