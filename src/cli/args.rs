//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::error::REGISTRY_ENV_VAR;
use crate::publish::SchemaVersion;

/// Inspect, preview, and publish a registry of computers and codes.
#[derive(Debug, Parser)]
#[command(name = "code-registry")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Registry directory (defaults to the bundled configurations)
    #[arg(short, long, global = true, env = REGISTRY_ENV_VAR)]
    pub registry: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List computers or codes
    List(ListArgs),

    /// Show the merged entry of a computer or code
    Show(ShowArgs),

    /// List template variables used by the registry
    Variables,

    /// Print the registry with template variables substituted
    Render(RenderArgs),

    /// Preview the backend objects created for a computer or code
    Setup(SetupArgs),

    /// Write versioned JSON snapshots
    Publish(PublishArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// What the `list` command lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ListKind {
    #[default]
    Computers,
    Codes,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Kind of entry to list
    #[arg(value_enum, default_value_t = ListKind::Computers)]
    pub kind: ListKind,
}

/// Arguments for the `show` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ShowArgs {
    /// Computer label, or `code@computer`
    pub label: String,
}

/// Arguments for the `render` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RenderArgs {
    /// Template variable as KEY=VALUE (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,
}

/// Arguments for the `setup` command.
#[derive(Debug, Clone, clap::Args)]
pub struct SetupArgs {
    /// Computer label, or `code@computer`
    pub label: String,

    /// Template variable as KEY=VALUE (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// Backend user the computer is configured for
    #[arg(long)]
    pub user: Option<String>,
}

/// Arguments for the `publish` command.
#[derive(Debug, Clone, clap::Args)]
pub struct PublishArgs {
    /// Library tree (`domain/computer/section.yaml`) to publish instead of the registry
    #[arg(long)]
    pub library: Option<PathBuf>,

    /// Output directory for the snapshots
    #[arg(short, long)]
    pub out: PathBuf,

    /// Domain name used when publishing the registry
    #[arg(long, default_value = "default")]
    pub domain: String,

    /// Snapshot versions to write (comma-separated, default: all)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub versions: Vec<SchemaVersion>,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Parse a `KEY=VALUE` template variable.
fn parse_var(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty variable name in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_list_codes() {
        let cli = Cli::parse_from(["code-registry", "list", "codes"]);
        match cli.command {
            Commands::List(args) => assert_eq!(args.kind, ListKind::Codes),
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn parses_repeated_vars() {
        let cli = Cli::parse_from([
            "code-registry",
            "render",
            "--var",
            "username=alice",
            "--var",
            "account=s1=2",
        ]);
        match cli.command {
            Commands::Render(args) => assert_eq!(
                args.vars,
                vec![
                    ("username".to_string(), "alice".to_string()),
                    ("account".to_string(), "s1=2".to_string()),
                ]
            ),
            other => panic!("expected render, got {:?}", other),
        }
    }

    #[test]
    fn rejects_var_without_equals() {
        let result = Cli::try_parse_from(["code-registry", "render", "--var", "username"]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_publish_versions() {
        let cli = Cli::parse_from(["code-registry", "publish", "--out", "dist", "--versions", "v2"]);
        match cli.command {
            Commands::Publish(args) => {
                assert_eq!(args.versions, vec![SchemaVersion::V2]);
                assert_eq!(args.domain, "default");
            }
            other => panic!("expected publish, got {:?}", other),
        }
    }

    #[test]
    fn registry_flag_is_global() {
        let cli = Cli::parse_from(["code-registry", "variables", "--registry", "/tmp/reg"]);
        assert_eq!(cli.registry, Some(PathBuf::from("/tmp/reg")));
    }

    #[test]
    fn parse_var_rejects_empty_name() {
        assert!(parse_var("=x").is_err());
        assert_eq!(parse_var("a=").unwrap(), ("a".to_string(), String::new()));
    }
}
