//! Show command implementation.
//!
//! The `code-registry show` command prints the merged entry of a computer,
//! or of a code when the label contains `@`, as JSON.

use std::io::Write;

use crate::cli::args::ShowArgs;
use crate::context::RegistryContext;
use crate::error::Result;

use super::dispatcher::{Command, CommandResult};

/// The show command implementation.
pub struct ShowCommand {
    context: RegistryContext,
    args: ShowArgs,
}

impl ShowCommand {
    /// Create a new show command.
    pub fn new(context: RegistryContext, args: ShowArgs) -> Self {
        Self { context, args }
    }
}

impl Command for ShowCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let registry = self.context.registry();
        let label = &self.args.label;

        let json = if label.contains('@') {
            serde_json::to_string_pretty(registry.get_code(label)?)?
        } else {
            serde_json::to_string_pretty(registry.get_computer(label)?)?
        };

        writeln!(out, "{}", json)?;
        Ok(CommandResult::success())
    }
}
