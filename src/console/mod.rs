//! Interactive console: prompt loop, colored channels, mode commands.

use std::io::Write;
use std::sync::Arc;

use crossterm::style::Stylize;
use tokio_util::sync::CancellationToken;

use crate::config::{Credentials, SessionConfig};
use crate::engine::{
    run_automode, AutoApproveGate, AutomodeOutcome, ConsoleGate, TurnEngine, TurnEvent,
    CONTINUE_PROMPT,
};
use crate::error::{EngineError, Result};
use crate::provider::ModelBackend;
use crate::tools::ToolRegistry;
use crate::transcript::Transcript;

/// Fixed-name file each outbound model request is serialized to.
pub const LOG_FILE_NAME: &str = "command.log.json";

/// Colored output channels, one per speaker.
pub mod display {
    use super::Stylize;

    pub fn assistant(text: &str) {
        println!("{}", format!("Assistant: {text}").blue());
    }

    pub fn tool(text: &str) {
        println!("{}", text.to_string().dark_yellow());
    }

    pub fn info(text: &str) {
        println!("{text}");
    }

    pub fn warn(text: &str) {
        eprintln!("{}", text.to_string().red().bold());
    }
}

/// The interactive session: one transcript, one registry, switchable modes.
pub struct Console {
    backend: Arc<dyn ModelBackend>,
    registry: Arc<ToolRegistry>,
    config: SessionConfig,
    creds: Credentials,
    cancel: CancellationToken,
    transcript: Transcript,
}

impl Console {
    pub fn new(
        backend: Arc<dyn ModelBackend>,
        registry: Arc<ToolRegistry>,
        config: SessionConfig,
        creds: Credentials,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            backend,
            registry,
            config,
            creds,
            cancel,
            transcript: Transcript::new(),
        }
    }

    /// Run a single utterance and print the response. Used by one-shot
    /// invocation from the command line.
    pub async fn run_once(&mut self, utterance: &str) -> Result<()> {
        let engine = self.build_engine(self.config.clone(), false);
        let response = engine.run_turn(&mut self.transcript, utterance).await?;
        display::assistant(&response);
        Ok(())
    }

    /// Run the prompt loop until EOF, an exit command, or cancellation.
    pub async fn run(&mut self) -> Result<()> {
        display::info("Welcome to stackwright. Type 'automode [n]' for autonomous mode, 'automode! [n]' to skip confirmations, 'exit' to quit.");

        loop {
            let Some(line) = read_line("\nYou: ").await? else {
                return Ok(()); // EOF
            };
            let trimmed = line.trim();
            let lowered = trimmed.to_lowercase();

            if lowered == "exit" || lowered == "quit" {
                return Ok(());
            }

            if let Some(rest) = lowered.strip_prefix("automode") {
                let unsupervised = rest.starts_with('!');
                let rest = rest.trim_start_matches('!').trim();
                if rest.is_empty() || rest.parse::<u32>().is_ok() {
                    let iterations = rest.parse::<u32>().ok();
                    match self.enter_automode(unsupervised, iterations).await {
                        Ok(()) => continue,
                        Err(EngineError::Canceled) => return Ok(()),
                        Err(e) => {
                            display::warn(&format!("Automode failed: {e}"));
                            continue;
                        }
                    }
                }
                // Not a recognized automode command; fall through as chat.
            }

            // Empty input is an implicit continue instruction.
            let utterance = if trimmed.is_empty() {
                CONTINUE_PROMPT
            } else {
                trimmed
            };

            let engine = self.build_engine(self.config.clone(), false);
            match engine.run_turn(&mut self.transcript, utterance).await {
                Ok(response) => display::assistant(&response),
                Err(EngineError::Canceled) => return Ok(()),
                Err(e) => display::warn(&format!("Error: {e}")),
            }
        }
    }

    async fn enter_automode(&mut self, unsupervised: bool, iterations: Option<u32>) -> Result<()> {
        let goal = read_line("Goal: ").await?.unwrap_or_default();

        let mut config = SessionConfig {
            automode: true,
            ..self.config.clone()
        };
        if let Some(n) = iterations {
            config.max_iterations = n;
        }
        if unsupervised {
            config.require_confirmation = false;
        }
        let max = config.max_iterations;

        display::info(&format!(
            "Entering {} automode ({max} iteration budget). Press Ctrl-C to interrupt.",
            if unsupervised { "unsupervised" } else { "confirmed" }
        ));

        let mut engine = self.build_engine(config, unsupervised);
        let outcome = run_automode(
            &mut engine,
            &mut self.transcript,
            &goal,
            |iteration, response| {
                display::info(&format!("--- automode iteration {iteration}/{max} ---"));
                display::assistant(response);
            },
        )
        .await?;

        match outcome {
            AutomodeOutcome::Completed { iterations } => {
                display::info(&format!("Automode complete after {iterations} iteration(s)."));
            }
            AutomodeOutcome::BudgetExceeded { iterations } => {
                display::warn(&format!(
                    "Automode stopped: iteration budget of {iterations} exceeded before completion."
                ));
            }
        }
        Ok(())
    }

    fn build_engine(&self, config: SessionConfig, unsupervised: bool) -> TurnEngine {
        let gate: Arc<dyn crate::engine::ConfirmationGate> = if unsupervised {
            Arc::new(AutoApproveGate)
        } else {
            Arc::new(ConsoleGate)
        };

        TurnEngine::new(
            self.backend.clone(),
            self.registry.clone(),
            gate,
            config,
            self.cancel.child_token(),
        )
        .with_request_log(LOG_FILE_NAME)
        .with_sam_s3_bucket(self.creds.sam_s3_bucket.clone())
        .with_event_sink(Arc::new(|event: TurnEvent| match event {
            TurnEvent::ToolInvoked { name, input } => {
                display::tool(&format!("Tool Used: {name}"));
                display::tool(&format!("Tool Input: {input}"));
            }
            TurnEvent::ToolCompleted { result, .. } => {
                display::tool(&format!("Tool Result: {result}"));
            }
        }))
    }
}

/// Prompt and read one line from stdin. `None` means EOF.
async fn read_line(prompt: &str) -> Result<Option<String>> {
    let prompt = prompt.to_string();
    let line = tokio::task::spawn_blocking(move || {
        print!("{}", prompt.as_str().green());
        std::io::stdout().flush()?;
        let mut line = String::new();
        let bytes = std::io::stdin().read_line(&mut line)?;
        Ok::<Option<String>, std::io::Error>(if bytes == 0 { None } else { Some(line) })
    })
    .await
    .map_err(|e| std::io::Error::other(e.to_string()))??;
    Ok(line)
}
