//! The registry a process resolves labels against.
//!
//! A [`RegistryContext`] is built once at start-up and passed by reference
//! to every resolution call, so tests and tools can hold several registries
//! side by side.

use crate::backend::Backend;
use crate::config::RegistryConfig;
use crate::error::Result;
use crate::registry::{CodeRegistry, RegistryLoader, TemplateVars};
use crate::resolve;

/// A loaded registry and the operations that resolve against it.
#[derive(Debug, Clone)]
pub struct RegistryContext {
    registry: CodeRegistry,
}

impl RegistryContext {
    /// Wrap an already merged registry.
    pub fn new(registry: CodeRegistry) -> Self {
        Self { registry }
    }

    /// Load the registry named by `config` through `loader`.
    pub fn from_config(config: &RegistryConfig, loader: &RegistryLoader) -> Result<Self> {
        tracing::debug!("Using registry at {}", config.directory.display());
        Ok(Self::new(CodeRegistry::from_loader(loader, &config.directory)?))
    }

    /// Load the registry named by the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&RegistryConfig::from_env(), &RegistryLoader::new())
    }

    /// The unrendered registry.
    pub fn registry(&self) -> &CodeRegistry {
        &self.registry
    }

    /// The registry with `vars` substituted.
    pub fn rendered(&self, vars: Option<&TemplateVars>) -> Result<CodeRegistry> {
        self.registry.render(vars)
    }

    /// See [`resolve::load_computer`].
    pub fn load_computer<B: Backend>(
        &self,
        backend: &mut B,
        label: &str,
        vars: Option<&TemplateVars>,
    ) -> Result<B::Computer> {
        resolve::load_computer(self, backend, label, vars)
    }

    /// See [`resolve::load_code`].
    pub fn load_code<B: Backend>(
        &self,
        backend: &mut B,
        label: &str,
        vars: Option<&TemplateVars>,
    ) -> Result<B::Code> {
        resolve::load_code(self, backend, label, vars)
    }
}
