//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::io::Write;

use crate::cli::args::{Cli, Commands};
use crate::config::RegistryConfig;
use crate::context::RegistryContext;
use crate::error::Result;
use crate::registry::RegistryLoader;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command, writing its report to `out`.
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult>;
}

/// Result of command execution.
///
/// Failures are reported as errors; a result carries the exit code of a
/// command that ran to completion.
#[derive(Debug)]
pub struct CommandResult {
    /// Exit code to use.
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self { exit_code: 0 }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    config: RegistryConfig,
    loader: RegistryLoader,
}

impl CommandDispatcher {
    /// Create a dispatcher reading the registry named by `config`.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            loader: RegistryLoader::new(),
        }
    }

    /// Create a dispatcher from the global CLI flags.
    pub fn from_cli(cli: &Cli) -> Self {
        let config = match &cli.registry {
            Some(directory) => RegistryConfig::new(directory),
            None => RegistryConfig::from_env(),
        };
        Self::new(config)
    }

    /// Registry configuration in use.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn context(&self) -> Result<RegistryContext> {
        RegistryContext::from_config(&self.config, &self.loader)
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, out: &mut dyn Write) -> Result<CommandResult> {
        match &cli.command {
            Commands::List(args) => {
                let cmd = super::list::ListCommand::new(self.context()?, args.clone());
                cmd.execute(out)
            }
            Commands::Show(args) => {
                let cmd = super::show::ShowCommand::new(self.context()?, args.clone());
                cmd.execute(out)
            }
            Commands::Variables => {
                let cmd = super::variables::VariablesCommand::new(self.context()?);
                cmd.execute(out)
            }
            Commands::Render(args) => {
                let cmd = super::render::RenderCommand::new(self.context()?, args.clone());
                cmd.execute(out)
            }
            Commands::Setup(args) => {
                let cmd = super::setup::SetupCommand::new(self.context()?, args.clone());
                cmd.execute(out)
            }
            Commands::Publish(args) => {
                // A library publish never touches the registry directory
                let context = match args.library {
                    Some(_) => None,
                    None => Some(self.context()?),
                };
                let cmd = super::publish::PublishCommand::new(context, args.clone());
                cmd.execute(out)
            }
            Commands::Completions(args) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        assert_eq!(CommandResult::success().exit_code, 0);
    }

    #[test]
    fn dispatcher_uses_registry_flag() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("a.yaml"),
            "computers:\n  - label: box\n    setup:\n      hostname: box\n      transport: core.local\n",
        )
        .unwrap();
        let registry = temp.path().to_string_lossy().into_owned();
        let cli = Cli::parse_from(["code-registry", "--registry", registry.as_str(), "list"]);

        let dispatcher = CommandDispatcher::from_cli(&cli);
        assert_eq!(dispatcher.config().directory, temp.path());

        let mut out = Vec::new();
        let result = dispatcher.dispatch(&cli, &mut out).unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "box\n");
    }

    #[test]
    fn dispatcher_propagates_registry_errors() {
        let temp = TempDir::new().unwrap();
        let registry = temp.path().to_string_lossy().into_owned();
        let cli = Cli::parse_from(["code-registry", "--registry", registry.as_str(), "variables"]);

        let mut out = Vec::new();
        let result = CommandDispatcher::from_cli(&cli).dispatch(&cli, &mut out);
        assert!(matches!(
            result,
            Err(crate::error::RegistryError::EmptyRegistry { .. })
        ));
    }
}
