//! Core conversation types.

pub mod message;

pub use message::{ContentBlock, ResultStatus, Role, ToolResultBlock, ToolUseBlock, Turn};
