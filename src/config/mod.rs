//! Session configuration and environment-sourced credentials.

use crate::error::{EngineError, Result};

/// Default automode iteration budget, enforced by the driver.
pub const DEFAULT_MAX_ITERATIONS: u32 = 25;

/// Default bound on model↔tool round-trips within a single user turn.
pub const DEFAULT_MAX_TOOL_DEPTH: u32 = 8;

/// Fixed inference policy knobs plus session flags.
///
/// The numeric knobs are policy, not derived at runtime: temperature 0.5,
/// 4000 max tokens, top-p 0.9.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub model_id: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    /// Whether this session is running under the automode driver.
    pub automode: bool,
    /// Gate shell execution behind a human confirmation prompt.
    pub require_confirmation: bool,
    /// Enforced automode iteration budget. Also surfaced to the model as an
    /// advisory in the system prompt.
    pub max_iterations: u32,
    /// Enforced bound on tool round-trips per user turn.
    pub max_tool_depth: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model_id: "claude-3-5-sonnet-20240620".to_string(),
            temperature: 0.5,
            max_tokens: 4000,
            top_p: 0.9,
            automode: false,
            require_confirmation: true,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_tool_depth: DEFAULT_MAX_TOOL_DEPTH,
        }
    }
}

/// Credentials and endpoint overrides resolved from the environment.
///
/// Optional keys control registry filtering: a tool whose key is absent is
/// simply never offered to the model in that session.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: Option<String>,
    pub tavily_api_key: Option<String>,
    pub pexels_api_key: Option<String>,
    /// Optional S3 bucket surfaced in the system prompt for SAM packaging.
    pub sam_s3_bucket: Option<String>,
}

impl Credentials {
    /// Load from environment variables, reading `.env` first if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self {
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
            anthropic_base_url: std::env::var("ANTHROPIC_BASE_URL").ok(),
            tavily_api_key: std::env::var("TAVILY_API_KEY").ok(),
            pexels_api_key: std::env::var("PEXELS_API_KEY").ok(),
            sam_s3_bucket: std::env::var("SAM_S3_BUCKET").ok(),
        }
    }

    /// The Anthropic key, or a configuration error naming the variable.
    pub fn require_anthropic_key(&self) -> Result<&str> {
        self.anthropic_api_key
            .as_deref()
            .ok_or_else(|| EngineError::Configuration("ANTHROPIC_API_KEY is not set".into()))
    }
}
