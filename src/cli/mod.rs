//! Command-line interface for the code registry.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    Cli, Commands, CompletionsArgs, ListArgs, ListKind, PublishArgs, RenderArgs, SetupArgs,
    ShowArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
