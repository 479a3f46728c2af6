//! Publish command implementation.
//!
//! The `code-registry publish` command writes one JSON snapshot per schema
//! version, either from a library tree (`--library`) or from the registry.

use std::io::Write;

use crate::cli::args::PublishArgs;
use crate::context::RegistryContext;
use crate::error::{RegistryError, Result};
use crate::publish::{collect_library, write_snapshots, Database, SchemaVersion};

use super::dispatcher::{Command, CommandResult};

/// The publish command implementation.
pub struct PublishCommand {
    context: Option<RegistryContext>,
    args: PublishArgs,
}

impl PublishCommand {
    /// Create a new publish command.
    ///
    /// `context` is only consulted when no `--library` is given.
    pub fn new(context: Option<RegistryContext>, args: PublishArgs) -> Self {
        Self { context, args }
    }

    fn database(&self) -> Result<Database> {
        if let Some(library) = &self.args.library {
            return collect_library(library);
        }

        let context = self.context.as_ref().ok_or_else(|| RegistryError::Other(
            anyhow::anyhow!("publish needs either a registry or a --library directory"),
        ))?;
        Database::from_registry(context.registry(), &self.args.domain)
    }

    fn versions(&self) -> Vec<SchemaVersion> {
        if self.args.versions.is_empty() {
            SchemaVersion::ALL.to_vec()
        } else {
            self.args.versions.clone()
        }
    }
}

impl Command for PublishCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let database = self.database()?;
        for path in write_snapshots(&database, &self.args.out, &self.versions())? {
            writeln!(out, "{}", path.display())?;
        }
        Ok(CommandResult::success())
    }
}
