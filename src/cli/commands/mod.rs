//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands write
//! their report to a caller-supplied writer; logs go to stderr.

pub mod completions;
pub mod dispatcher;
pub mod list;
pub mod publish;
pub mod render;
pub mod setup;
pub mod show;
pub mod variables;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
