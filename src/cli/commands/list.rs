//! List command implementation.
//!
//! The `code-registry list` command prints one label per line.

use std::io::Write;

use crate::cli::args::{ListArgs, ListKind};
use crate::context::RegistryContext;
use crate::error::Result;

use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    context: RegistryContext,
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(context: RegistryContext, args: ListArgs) -> Self {
        Self { context, args }
    }
}

impl Command for ListCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let registry = self.context.registry();
        let labels = match self.args.kind {
            ListKind::Computers => registry.computer_list(),
            ListKind::Codes => registry.code_list(),
        };

        for label in labels {
            writeln!(out, "{}", label)?;
        }
        Ok(CommandResult::success())
    }
}
