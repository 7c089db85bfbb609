//! Shell command execution.

use std::time::Duration;

use serde::Serialize;

use super::fs::truncate_utf8;

const OUTPUT_MAX_BYTES: usize = 32_768;
const COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct CommandOutput {
    stdout: String,
    stderr: String,
}

/// Execute a command via `sh -c` and return JSON `{stdout, stderr}`.
///
/// A non-zero exit, spawn failure, or timeout comes back as error text; the
/// side effects of a partially run command are not rolled back.
pub async fn exec_command(cmd: &str) -> String {
    let result = tokio::time::timeout(
        COMMAND_TIMEOUT,
        tokio::process::Command::new("sh").arg("-c").arg(cmd).output(),
    )
    .await;

    let output = match result {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return format!("Error executing command: {e}"),
        Err(_) => {
            return format!(
                "Error executing command: timed out after {}s",
                COMMAND_TIMEOUT.as_secs()
            )
        }
    };

    let stdout = capped(&String::from_utf8_lossy(&output.stdout));
    let stderr = capped(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return format!(
            "Error executing command: exit code {}: {stderr}",
            output.status.code().unwrap_or(-1)
        );
    }

    let payload = CommandOutput { stdout, stderr };
    serde_json::to_string(&payload)
        .unwrap_or_else(|e| format!("Error executing command: {e}"))
}

fn capped(s: &str) -> String {
    if s.len() > OUTPUT_MAX_BYTES {
        let mut t = truncate_utf8(s, OUTPUT_MAX_BYTES);
        t.push_str("\n... (truncated)");
        t
    } else {
        s.to_string()
    }
}
