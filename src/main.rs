//! Stackwright CLI binary entry point.

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stackwright::config::{Credentials, SessionConfig};
use stackwright::console::{display, Console};
use stackwright::provider::AnthropicBackend;
use stackwright::tools::ToolRegistry;

#[derive(Parser, Debug)]
#[command(name = "stackwright", version, about = "Conversational agent for building and deploying projects")]
struct Cli {
    /// Model to converse with.
    #[arg(long)]
    model: Option<String>,

    /// Automode iteration budget.
    #[arg(long)]
    max_iterations: Option<u32>,

    /// Bound on tool round-trips within a single turn.
    #[arg(long)]
    max_tool_depth: Option<u32>,

    /// Skip the confirmation prompt before shell commands.
    #[arg(long)]
    skip_confirmation: bool,

    /// Run this single prompt and exit instead of the interactive loop.
    prompt: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stackwright=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        display::warn(&format!("Error: {e}"));
        std::process::exit(1);
    }
}

async fn run() -> stackwright::error::Result<()> {
    let cli = Cli::parse();

    let creds = Credentials::from_env();
    let api_key = creds.require_anthropic_key()?.to_string();

    let mut config = SessionConfig::default();
    if let Some(model) = cli.model {
        config.model_id = model;
    }
    if let Some(n) = cli.max_iterations {
        config.max_iterations = n;
    }
    if let Some(n) = cli.max_tool_depth {
        config.max_tool_depth = n;
    }
    config.require_confirmation = !cli.skip_confirmation;

    let backend = Arc::new(AnthropicBackend::new(api_key, creds.anthropic_base_url.clone()));
    let registry = Arc::new(ToolRegistry::new(creds.clone()));
    debug!(model = %config.model_id, tools = registry.specs().len(), "session configured");

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    let mut console = Console::new(backend, registry, config, creds, cancel);
    match cli.prompt {
        Some(prompt) => console.run_once(&prompt).await,
        None => console.run().await,
    }
}
