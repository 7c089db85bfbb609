//! The closed set of tool kinds and their model-facing descriptors.

use strum::EnumIter;

use crate::config::Credentials;
use crate::provider::ToolSpec;

use super::schema;

/// Every capability the engine can dispatch.
///
/// Dispatch is a closed enum rather than open-ended string matching: the
/// compiler checks exhaustiveness, and an unrecognized wire name has exactly
/// one error path in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum ToolKind {
    CreateFolder,
    CreateFile,
    WriteToFile,
    ReadFile,
    ListFiles,
    WebSearch,
    ImageSearch,
    FetchHttp,
    CreateInfraStack,
    UpdateInfraStack,
    DescribeInfraStack,
    ListInfraStacks,
    DescribeInfraStackEvents,
    ExecuteShellCommand,
}

impl ToolKind {
    /// The wire name the model uses to request this tool.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::CreateFolder => "createFolder",
            Self::CreateFile => "createFile",
            Self::WriteToFile => "writeToFile",
            Self::ReadFile => "readFile",
            Self::ListFiles => "listFiles",
            Self::WebSearch => "webSearch",
            Self::ImageSearch => "imageSearch",
            Self::FetchHttp => "fetchHttp",
            Self::CreateInfraStack => "createInfraStack",
            Self::UpdateInfraStack => "updateInfraStack",
            Self::DescribeInfraStack => "describeInfraStack",
            Self::ListInfraStacks => "listInfraStacks",
            Self::DescribeInfraStackEvents => "describeInfraStackEvents",
            Self::ExecuteShellCommand => "executeShellCommand",
        }
    }

    /// Resolve a wire name to a kind. `None` means the registry/model
    /// disagree about what exists.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name {
            "createFolder" => Some(Self::CreateFolder),
            "createFile" => Some(Self::CreateFile),
            "writeToFile" => Some(Self::WriteToFile),
            "readFile" => Some(Self::ReadFile),
            "listFiles" => Some(Self::ListFiles),
            "webSearch" => Some(Self::WebSearch),
            "imageSearch" => Some(Self::ImageSearch),
            "fetchHttp" => Some(Self::FetchHttp),
            "createInfraStack" => Some(Self::CreateInfraStack),
            "updateInfraStack" => Some(Self::UpdateInfraStack),
            "describeInfraStack" => Some(Self::DescribeInfraStack),
            "listInfraStacks" => Some(Self::ListInfraStacks),
            "describeInfraStackEvents" => Some(Self::DescribeInfraStackEvents),
            "executeShellCommand" => Some(Self::ExecuteShellCommand),
            _ => None,
        }
    }

    /// Whether this kind's prerequisite credential is present. Kinds that
    /// fail this check are left out of the session's registry entirely.
    pub fn available(self, creds: &Credentials) -> bool {
        match self {
            Self::WebSearch => creds.tavily_api_key.is_some(),
            Self::ImageSearch => creds.pexels_api_key.is_some(),
            _ => true,
        }
    }

    /// Whether executing this kind requires human confirmation when the
    /// session's confirmation flag is set.
    pub fn requires_confirmation(self) -> bool {
        matches!(self, Self::ExecuteShellCommand)
    }

    /// Build the model-facing descriptor for this kind.
    pub fn spec(self) -> ToolSpec {
        let (description, input_schema) = match self {
            Self::CreateFolder => (
                "Create a new folder at the specified path. Use this when you need to create a new directory in the project structure.",
                schema::object()
                    .string("path", "The path where the folder should be created", true)
                    .build(),
            ),
            Self::CreateFile => (
                "Create a new file at the specified path with the given content. Use this when you need to create a new file in the project structure.",
                schema::object()
                    .string("path", "The path where the file should be created", true)
                    .string("content", "The initial content of the file", true)
                    .build(),
            ),
            Self::WriteToFile => (
                "Write content to an existing file at the specified path. Use this when you need to add or update content in an existing file.",
                schema::object()
                    .string("path", "The path of the file to write to", true)
                    .string("content", "The content to write to the file", true)
                    .build(),
            ),
            Self::ReadFile => (
                "Read the contents of a file at the specified path. Use this when you need to examine the contents of an existing file.",
                schema::object()
                    .string("path", "The path of the file to read", true)
                    .build(),
            ),
            Self::ListFiles => (
                "List all files and directories in the specified folder. Use this when you need to see the contents of a directory.",
                schema::object()
                    .string("path", "The path of the folder to list (default: current directory)", false)
                    .build(),
            ),
            Self::WebSearch => (
                "Perform a web search to get up-to-date information or additional context. Use this when you need current information or feel a search could provide a better answer.",
                schema::object()
                    .string("query", "The search query", true)
                    .build(),
            ),
            Self::ImageSearch => (
                "Search for a stock photo matching the query. Use this when a web page or document you are building needs an image.",
                schema::object()
                    .string("query", "The image search query", true)
                    .build(),
            ),
            Self::FetchHttp => (
                "Fetch a URL over HTTP and return the response body. Use this to test a deployed web API or retrieve a resource.",
                schema::object()
                    .string("url", "The URL to fetch", true)
                    .object_value("options", "Optional request options: method, headers, body", false)
                    .build(),
            ),
            Self::CreateInfraStack => (
                "Deploy a CloudFormation template as a new stack. The template body must be provided inline.",
                schema::object()
                    .string("template", "The CloudFormation template body", true)
                    .string("stackName", "The name of the stack to create", true)
                    .string_array("parameters", "Stack parameters as KEY=VALUE strings", false)
                    .build(),
            ),
            Self::UpdateInfraStack => (
                "Update an existing CloudFormation stack with a new template body.",
                schema::object()
                    .string("template", "The CloudFormation template body", true)
                    .string("stackName", "The name of the stack to update", true)
                    .string_array("parameters", "Stack parameters as KEY=VALUE strings", false)
                    .build(),
            ),
            Self::DescribeInfraStack => (
                "Describe a CloudFormation stack, returning its status, outputs, and metadata as JSON.",
                schema::object()
                    .string("stackName", "The name of the stack to describe", true)
                    .build(),
            ),
            Self::ListInfraStacks => (
                "List CloudFormation stacks, optionally filtered by stack status.",
                schema::object()
                    .string_array("statusFilter", "Stack statuses to filter by (e.g. CREATE_COMPLETE)", false)
                    .build(),
            ),
            Self::DescribeInfraStackEvents => (
                "Describe the events of a CloudFormation stack as JSON, most recent first. Useful for debugging failed deployments.",
                schema::object()
                    .string("stackName", "The name of the stack whose events to describe", true)
                    .build(),
            ),
            Self::ExecuteShellCommand => (
                "Execute a CLI command and return its stdout and stderr. File paths must be specified as full paths.",
                schema::object()
                    .string("cmd", "The command to execute", true)
                    .build(),
            ),
        };

        ToolSpec {
            name: self.wire_name().to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}
