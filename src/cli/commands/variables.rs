//! Variables command implementation.
//!
//! The `code-registry variables` command prints the template variables a
//! registry needs before it can be rendered.

use std::io::Write;

use crate::context::RegistryContext;
use crate::error::Result;

use super::dispatcher::{Command, CommandResult};

/// The variables command implementation.
pub struct VariablesCommand {
    context: RegistryContext,
}

impl VariablesCommand {
    /// Create a new variables command.
    pub fn new(context: RegistryContext) -> Self {
        Self { context }
    }
}

impl Command for VariablesCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        for name in self.context.registry().template_variables()? {
            writeln!(out, "{}", name)?;
        }
        Ok(CommandResult::success())
    }
}
