//! The human-confirmation gate for dangerous tool invocations.

use std::io::Write;

use async_trait::async_trait;

use crate::error::Result;

/// Outcome of a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The human approved; execution proceeds.
    Approve,
    /// The human vetoed; the pending tool call is skipped and processing of
    /// the remaining tool blocks in the current response stops.
    Veto,
}

/// A synchronous human-approval checkpoint.
///
/// The engine decides *which* invocations need confirmation; the gate only
/// asks. While a prompt is pending no other conversation activity proceeds.
#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    async fn confirm(&self, tool_name: &str, input: &serde_json::Value) -> Result<GateDecision>;
}

/// Map one line of operator input to a decision. An empty (or
/// whitespace-only) line approves; anything else vetoes.
pub fn decision_for_line(line: &str) -> GateDecision {
    if line.trim().is_empty() {
        GateDecision::Approve
    } else {
        GateDecision::Veto
    }
}

/// Console gate: prints the proposed invocation and blocks on one line of
/// stdin, mapped through [`decision_for_line`].
pub struct ConsoleGate;

#[async_trait]
impl ConfirmationGate for ConsoleGate {
    async fn confirm(&self, tool_name: &str, input: &serde_json::Value) -> Result<GateDecision> {
        let command = input
            .get("cmd")
            .and_then(|c| c.as_str())
            .map(String::from)
            .unwrap_or_else(|| input.to_string());
        let tool_name = tool_name.to_string();

        // Blocking stdin read off the async runtime.
        let line = tokio::task::spawn_blocking(move || {
            print!("{tool_name} wants to run:\n  {command}\nPress Enter to allow, or type anything to veto: ");
            std::io::stdout().flush()?;
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            Ok::<String, std::io::Error>(line)
        })
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))??;

        Ok(decision_for_line(&line))
    }
}

/// Gate that approves everything. Used by unsupervised automode.
pub struct AutoApproveGate;

#[async_trait]
impl ConfirmationGate for AutoApproveGate {
    async fn confirm(&self, _tool_name: &str, _input: &serde_json::Value) -> Result<GateDecision> {
        Ok(GateDecision::Approve)
    }
}
