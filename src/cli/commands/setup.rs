//! Setup command implementation.
//!
//! The `code-registry setup` command resolves a computer or code against an
//! empty in-memory backend and prints everything that would be created.
//! Nothing is persisted.

use std::io::Write;

use crate::backend::MemoryBackend;
use crate::cli::args::SetupArgs;
use crate::context::RegistryContext;
use crate::error::Result;
use crate::registry::TemplateVars;

use super::dispatcher::{Command, CommandResult};

/// The setup command implementation.
pub struct SetupCommand {
    context: RegistryContext,
    args: SetupArgs,
}

impl SetupCommand {
    /// Create a new setup command.
    pub fn new(context: RegistryContext, args: SetupArgs) -> Self {
        Self { context, args }
    }

    fn backend(&self) -> MemoryBackend {
        match &self.args.user {
            Some(user) => MemoryBackend::with_user(user.clone()),
            None => MemoryBackend::new(),
        }
    }
}

impl Command for SetupCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let vars: TemplateVars = self.args.vars.iter().cloned().collect();
        let mut backend = self.backend();

        if self.args.label.contains('@') {
            self.context
                .load_code(&mut backend, &self.args.label, Some(&vars))?;
        } else {
            self.context
                .load_computer(&mut backend, &self.args.label, Some(&vars))?;
        }

        writeln!(out, "{}", serde_json::to_string_pretty(&backend)?)?;
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use crate::registry::{CodeRegistry, RawRegistry};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn context() -> RegistryContext {
        let raw: RawRegistry = [(
            "a.yaml".to_string(),
            json!({
                "computers": [{
                    "label": "localhost",
                    "setup": {"hostname": "localhost", "transport": "core.local"},
                    "configure": {"core.local": {"safe_interval": 0}},
                    "codes": [{
                        "label": "bash",
                        "input_plugin": "core.shell",
                        "remote_abs_path": "/bin/bash"
                    }]
                }]
            }),
        )]
        .into_iter()
        .collect();
        RegistryContext::new(CodeRegistry::build(Arc::new(raw)).unwrap())
    }

    fn setup(label: &str, user: Option<&str>) -> Result<Value> {
        let args = SetupArgs {
            label: label.to_string(),
            vars: Vec::new(),
            user: user.map(str::to_string),
        };
        let mut out = Vec::new();
        SetupCommand::new(context(), args).execute(&mut out)?;
        Ok(serde_json::from_slice(&out)?)
    }

    #[test]
    fn computer_preview_includes_configuration() {
        let value = setup("localhost", Some("alice@example.com")).unwrap();
        let computer = &value["computers"]["localhost"];
        assert_eq!(computer["setup"]["transport"], "core.local");
        assert_eq!(computer["configuration"]["user"], "alice@example.com");
        assert_eq!(value["codes"], json!({}));
    }

    #[test]
    fn code_preview_includes_its_computer() {
        let value = setup("bash@localhost", None).unwrap();
        assert!(value["computers"].get("localhost").is_some());
        assert_eq!(value["codes"]["bash@localhost"]["code_type"], "on_computer");
    }

    #[test]
    fn unknown_computer_fails() {
        assert!(matches!(
            setup("fidis", None),
            Err(RegistryError::NotExistent { .. })
        ));
    }
}
