//! CloudFormation stack tools.
//!
//! These drive the `aws cloudformation` CLI as a subprocess. Arguments map
//! one-to-one onto the CreateStack/UpdateStack/DescribeStacks/ListStacks/
//! DescribeStackEvents API calls. CLI failures (missing binary, bad template,
//! nonexistent stack) come back as error text, never as errors.

use tracing::debug;

const CAPABILITIES: [&str; 3] = [
    "CAPABILITY_IAM",
    "CAPABILITY_NAMED_IAM",
    "CAPABILITY_AUTO_EXPAND",
];

const PROJECT_TAG: &str = "Key=project,Value=stackwright";

/// The stack statuses accepted by the list-stacks filter.
const STACK_STATUSES: [&str; 23] = [
    "CREATE_IN_PROGRESS",
    "CREATE_FAILED",
    "CREATE_COMPLETE",
    "ROLLBACK_IN_PROGRESS",
    "ROLLBACK_FAILED",
    "ROLLBACK_COMPLETE",
    "DELETE_IN_PROGRESS",
    "DELETE_FAILED",
    "DELETE_COMPLETE",
    "UPDATE_IN_PROGRESS",
    "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS",
    "UPDATE_COMPLETE",
    "UPDATE_FAILED",
    "UPDATE_ROLLBACK_IN_PROGRESS",
    "UPDATE_ROLLBACK_FAILED",
    "UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS",
    "UPDATE_ROLLBACK_COMPLETE",
    "REVIEW_IN_PROGRESS",
    "IMPORT_IN_PROGRESS",
    "IMPORT_COMPLETE",
    "IMPORT_ROLLBACK_IN_PROGRESS",
    "IMPORT_ROLLBACK_FAILED",
    "IMPORT_ROLLBACK_COMPLETE",
];

/// Whether every entry is a recognized stack status.
fn is_stack_statuses(filters: &[String]) -> bool {
    filters.iter().all(|f| STACK_STATUSES.contains(&f.as_str()))
}

/// Run the aws CLI and capture stdout, folding failures into `Err(text)`.
async fn run_aws(args: &[&str]) -> Result<String, String> {
    debug!(?args, "aws cloudformation invocation");
    let output = tokio::process::Command::new("aws")
        .args(args)
        .output()
        .await
        .map_err(|e| format!("failed to run aws cli: {e}"))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(String::from_utf8_lossy(&output.stderr).trim().to_string())
    }
}

fn parameter_args(parameters: &[String]) -> Result<Vec<String>, String> {
    // KEY=VALUE pairs become ParameterKey=KEY,ParameterValue=VALUE. An entry
    // without '=' is rejected, never silently dropped.
    parameters
        .iter()
        .map(|p| {
            p.split_once('=')
                .map(|(k, v)| format!("ParameterKey={k},ParameterValue={v}"))
                .ok_or_else(|| format!("invalid parameter '{p}', expected KEY=VALUE"))
        })
        .collect()
}

/// Create a stack from an inline template body.
pub async fn create_stack(template: &str, stack_name: &str, parameters: &[String]) -> String {
    let mut args: Vec<&str> = vec![
        "cloudformation",
        "create-stack",
        "--stack-name",
        stack_name,
        "--template-body",
        template,
        "--on-failure",
        "DELETE",
        "--tags",
        PROJECT_TAG,
        "--capabilities",
    ];
    args.extend(CAPABILITIES);

    let params = match parameter_args(parameters) {
        Ok(p) => p,
        Err(e) => return format!("Error createStack: {e}"),
    };
    if !params.is_empty() {
        args.push("--parameters");
        args.extend(params.iter().map(String::as_str));
    }

    match run_aws(&args).await {
        Ok(out) => {
            let stack_id = serde_json::from_str::<serde_json::Value>(&out)
                .ok()
                .and_then(|v| v["StackId"].as_str().map(String::from))
                .unwrap_or_default();
            format!("Stack created: {stack_name}, StackId: {stack_id}")
        }
        Err(e) => format!("Error createStack: {e}"),
    }
}

/// Update an existing stack with a new template body.
pub async fn update_stack(template: &str, stack_name: &str, parameters: &[String]) -> String {
    let mut args: Vec<&str> = vec![
        "cloudformation",
        "update-stack",
        "--stack-name",
        stack_name,
        "--template-body",
        template,
        "--tags",
        PROJECT_TAG,
        "--capabilities",
    ];
    args.extend(CAPABILITIES);

    let params = match parameter_args(parameters) {
        Ok(p) => p,
        Err(e) => return format!("Error updateStack: {e}"),
    };
    if !params.is_empty() {
        args.push("--parameters");
        args.extend(params.iter().map(String::as_str));
    }

    match run_aws(&args).await {
        Ok(out) => {
            let stack_id = serde_json::from_str::<serde_json::Value>(&out)
                .ok()
                .and_then(|v| v["StackId"].as_str().map(String::from))
                .unwrap_or_default();
            format!("Stack updated: {stack_name}, StackId: {stack_id}")
        }
        Err(e) => format!("Error updateStack: {e}"),
    }
}

/// Describe a single stack as JSON.
pub async fn describe_stack(stack_name: &str) -> String {
    let args = [
        "cloudformation",
        "describe-stacks",
        "--stack-name",
        stack_name,
        "--output",
        "json",
    ];
    match run_aws(&args).await {
        Ok(out) => {
            // Unwrap the Stacks array down to the single stack description.
            serde_json::from_str::<serde_json::Value>(&out)
                .ok()
                .and_then(|v| v["Stacks"].get(0).map(|s| s.to_string()))
                .unwrap_or(out)
        }
        Err(e) => format!("Error describeStack: {e}"),
    }
}

/// List stacks, optionally filtered by status.
///
/// An invalid filter entry disables filtering rather than failing, matching
/// the permissive behavior the model is prompted to rely on.
pub async fn list_stacks(status_filter: &[String]) -> String {
    let mut args: Vec<&str> = vec!["cloudformation", "list-stacks", "--output", "json"];
    if !status_filter.is_empty() && is_stack_statuses(status_filter) {
        args.push("--stack-status-filter");
        args.extend(status_filter.iter().map(String::as_str));
    }

    match run_aws(&args).await {
        Ok(out) => serde_json::from_str::<serde_json::Value>(&out)
            .ok()
            .map(|v| v["StackSummaries"].to_string())
            .unwrap_or(out),
        Err(e) => format!("Error listStacks: {e}"),
    }
}

/// Describe the events of a stack as JSON.
pub async fn describe_stack_events(stack_name: &str) -> String {
    let args = [
        "cloudformation",
        "describe-stack-events",
        "--stack-name",
        stack_name,
        "--output",
        "json",
    ];
    match run_aws(&args).await {
        Ok(out) => serde_json::from_str::<serde_json::Value>(&out)
            .ok()
            .map(|v| v["StackEvents"].to_string())
            .unwrap_or(out),
        Err(e) => format!("Error describeStackEvents: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognized_statuses_pass_validation() {
        let filters = vec!["CREATE_COMPLETE".to_string(), "UPDATE_FAILED".to_string()];
        assert!(is_stack_statuses(&filters));
    }

    #[test]
    fn unrecognized_status_fails_validation() {
        let filters = vec!["CREATE_COMPLETE".to_string(), "NOT_A_STATUS".to_string()];
        assert!(!is_stack_statuses(&filters));
    }

    #[test]
    fn parameter_args_map_key_value_pairs() {
        let params = vec!["Env=prod".to_string(), "Size=m5.large".to_string()];
        assert_eq!(
            parameter_args(&params).unwrap(),
            vec![
                "ParameterKey=Env,ParameterValue=prod",
                "ParameterKey=Size,ParameterValue=m5.large",
            ]
        );
    }

    #[test]
    fn malformed_parameter_is_rejected_not_dropped() {
        let params = vec!["Env=prod".to_string(), "malformed".to_string()];
        let err = parameter_args(&params).unwrap_err();
        assert_eq!(err, "invalid parameter 'malformed', expected KEY=VALUE");
    }

    #[tokio::test]
    async fn create_stack_reports_malformed_parameter_without_calling_aws() {
        let result = create_stack("{}", "my-stack", &["noequals".to_string()]).await;
        assert_eq!(
            result,
            "Error createStack: invalid parameter 'noequals', expected KEY=VALUE"
        );
    }
}
