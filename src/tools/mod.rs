//! Tool registry and executor.

pub mod fs;
pub mod kind;
pub mod schema;
pub mod shell;
pub mod stack;
pub mod web;

pub use kind::ToolKind;

use strum::IntoEnumIterator;
use tracing::debug;

use crate::config::Credentials;
use crate::error::{EngineError, Result};
use crate::provider::ToolSpec;

/// The session's active set of tools.
///
/// Built once at startup from the closed [`ToolKind`] set, filtered by
/// available credentials, and immutable afterwards. A filtered-out tool is
/// invisible: it is never described to the model and its name resolves to
/// the same hard error as a name that never existed.
pub struct ToolRegistry {
    kinds: Vec<ToolKind>,
    creds: Credentials,
}

impl ToolRegistry {
    /// Build the registry for a session, filtering by credentials.
    pub fn new(creds: Credentials) -> Self {
        let kinds = ToolKind::iter()
            .filter(|kind| kind.available(&creds))
            .collect();
        Self { kinds, creds }
    }

    /// Descriptors for every active tool, in declaration order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.kinds.iter().map(|kind| kind.spec()).collect()
    }

    /// Whether the named tool exists in this session.
    pub fn contains(&self, name: &str) -> bool {
        ToolKind::from_wire_name(name).is_some_and(|kind| self.kinds.contains(&kind))
    }

    /// Resolve an active tool by wire name.
    pub fn resolve(&self, name: &str) -> Result<ToolKind> {
        ToolKind::from_wire_name(name)
            .filter(|kind| self.kinds.contains(kind))
            .ok_or_else(|| EngineError::UnknownTool(name.to_string()))
    }

    /// Execute a tool by wire name.
    ///
    /// Expected operational failures come back as `Ok` error text. The only
    /// error this returns is [`EngineError::UnknownTool`], which the caller
    /// must treat as fatal to the turn.
    pub async fn execute(&self, name: &str, input: &serde_json::Value) -> Result<String> {
        let kind = self.resolve(name)?;
        debug!(tool = name, "executing tool");

        let result = match kind {
            ToolKind::CreateFolder => match req_str(input, "path") {
                Ok(path) => fs::create_folder(path).await,
                Err(e) => e,
            },
            ToolKind::CreateFile => match (req_str(input, "path"), req_str(input, "content")) {
                (Ok(path), Ok(content)) => fs::create_file(path, content).await,
                (Err(e), _) | (_, Err(e)) => e,
            },
            ToolKind::WriteToFile => match (req_str(input, "path"), req_str(input, "content")) {
                (Ok(path), Ok(content)) => fs::write_to_file(path, content).await,
                (Err(e), _) | (_, Err(e)) => e,
            },
            ToolKind::ReadFile => match req_str(input, "path") {
                Ok(path) => fs::read_file(path).await,
                Err(e) => e,
            },
            ToolKind::ListFiles => {
                let path = opt_str(input, "path").unwrap_or(".");
                fs::list_files(path).await
            }
            ToolKind::WebSearch => {
                // Presence guaranteed by the availability filter.
                let key = self.creds.tavily_api_key.as_deref().unwrap_or_default();
                match req_str(input, "query") {
                    Ok(query) => web::tavily_search(key, query).await,
                    Err(e) => e,
                }
            }
            ToolKind::ImageSearch => {
                let key = self.creds.pexels_api_key.as_deref().unwrap_or_default();
                match req_str(input, "query") {
                    Ok(query) => web::pexels_search(key, query).await,
                    Err(e) => e,
                }
            }
            ToolKind::FetchHttp => match req_str(input, "url") {
                Ok(url) => web::fetch_http(url, input.get("options")).await,
                Err(e) => e,
            },
            ToolKind::CreateInfraStack => {
                match (req_str(input, "template"), req_str(input, "stackName")) {
                    (Ok(template), Ok(name)) => {
                        stack::create_stack(template, name, &str_array(input, "parameters")).await
                    }
                    (Err(e), _) | (_, Err(e)) => e,
                }
            }
            ToolKind::UpdateInfraStack => {
                match (req_str(input, "template"), req_str(input, "stackName")) {
                    (Ok(template), Ok(name)) => {
                        stack::update_stack(template, name, &str_array(input, "parameters")).await
                    }
                    (Err(e), _) | (_, Err(e)) => e,
                }
            }
            ToolKind::DescribeInfraStack => match req_str(input, "stackName") {
                Ok(name) => stack::describe_stack(name).await,
                Err(e) => e,
            },
            ToolKind::ListInfraStacks => {
                stack::list_stacks(&str_array(input, "statusFilter")).await
            }
            ToolKind::DescribeInfraStackEvents => match req_str(input, "stackName") {
                Ok(name) => stack::describe_stack_events(name).await,
                Err(e) => e,
            },
            ToolKind::ExecuteShellCommand => match req_str(input, "cmd") {
                Ok(cmd) => shell::exec_command(cmd).await,
                Err(e) => e,
            },
        };

        Ok(result)
    }
}

/// Required string field, or the error text the model will see.
fn req_str<'a>(input: &'a serde_json::Value, key: &str) -> std::result::Result<&'a str, String> {
    input
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("Error: missing required argument '{key}'"))
}

fn opt_str<'a>(input: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    input.get(key).and_then(|v| v.as_str())
}

fn str_array(input: &serde_json::Value, key: &str) -> Vec<String> {
    input
        .get(key)
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
