//! Stackwright — a terminal agent that drives filesystem, shell, web, and
//! CloudFormation tools through a model-backed conversation loop.
//!
//! The crate is organized around a small set of seams:
//!
//! - [`provider::ModelBackend`] abstracts the model API call.
//! - [`tools::ToolRegistry`] owns the closed set of tools and executes them.
//! - [`engine::TurnEngine`] orchestrates one user turn, following tool
//!   chains until the model stops asking for tools.
//! - [`engine::run_automode`] drives repeated turns against an iteration
//!   budget until the model signals completion.
//! - [`console::Console`] is the interactive front end.

pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod prompt;
pub mod provider;
pub mod tools;
pub mod transcript;
pub mod types;
