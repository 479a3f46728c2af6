//! Render command implementation.
//!
//! The `code-registry render` command prints the merged registry as JSON
//! after substituting `--var` values.

use std::io::Write;

use crate::cli::args::RenderArgs;
use crate::context::RegistryContext;
use crate::error::Result;
use crate::registry::TemplateVars;

use super::dispatcher::{Command, CommandResult};

/// The render command implementation.
pub struct RenderCommand {
    context: RegistryContext,
    args: RenderArgs,
}

impl RenderCommand {
    /// Create a new render command.
    pub fn new(context: RegistryContext, args: RenderArgs) -> Self {
        Self { context, args }
    }
}

impl Command for RenderCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let vars: TemplateVars = self.args.vars.iter().cloned().collect();
        let rendered = self.context.rendered(Some(&vars))?;

        writeln!(out, "{}", serde_json::to_string_pretty(&rendered.to_json()?)?)?;
        Ok(CommandResult::success())
    }
}
