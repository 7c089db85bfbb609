//! The autonomous-mode driver.
//!
//! Feeds synthetic "continue" prompts to the turn engine until the model
//! reports completion or the iteration budget runs out. The budget is
//! enforced here, not merely advertised: exhaustion is a distinct outcome,
//! never a silent stop.

use tracing::info;

use crate::error::Result;
use crate::transcript::Transcript;

use super::turn::TurnEngine;

/// Literal marker the model emits to end the loop.
pub const COMPLETION_SENTINEL: &str = "AUTOMODE_COMPLETE";

/// The synthetic prompt fed on every iteration after the first.
pub const CONTINUE_PROMPT: &str = "Continue with the next step.";

/// How an automode run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutomodeOutcome {
    /// The model emitted the completion sentinel.
    Completed { iterations: u32 },
    /// The enforced iteration budget ran out before the sentinel appeared.
    BudgetExceeded { iterations: u32 },
}

/// Run automode against the given engine and transcript.
///
/// `goal` seeds the first iteration; when empty, the continue prompt is
/// substituted. `on_iteration` observes each iteration's assistant text
/// (for console display).
///
/// # Errors
///
/// Propagates whatever the engine propagates: model-call failures, unknown
/// tools, cancellation.
pub async fn run_automode(
    engine: &mut TurnEngine,
    transcript: &mut Transcript,
    goal: &str,
    mut on_iteration: impl FnMut(u32, &str),
) -> Result<AutomodeOutcome> {
    let max_iterations = engine.config().max_iterations;
    let goal = goal.trim();
    let mut prompt = if goal.is_empty() {
        CONTINUE_PROMPT.to_string()
    } else {
        goal.to_string()
    };

    for iteration in 1..=max_iterations {
        engine.set_iterations_left(Some(max_iterations - iteration + 1));

        let response = engine.run_turn(transcript, &prompt).await?;
        on_iteration(iteration, &response);

        if response.contains(COMPLETION_SENTINEL) {
            info!(iteration, "automode complete");
            return Ok(AutomodeOutcome::Completed { iterations: iteration });
        }

        prompt = CONTINUE_PROMPT.to_string();
    }

    info!(max_iterations, "automode budget exceeded");
    Ok(AutomodeOutcome::BudgetExceeded {
        iterations: max_iterations,
    })
}
