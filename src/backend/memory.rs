//! In-process backend.

use super::{Backend, CodeBuilder, ComputerBuilder};
use crate::error::{RegistryError, Result};
use crate::registry::model::ConfigureParams;
use indexmap::IndexMap;
use serde::Serialize;

/// User new computers are configured for unless another is set.
pub const DEFAULT_USER: &str = "aiida@localhost";

/// Handle to a computer stored in a [`MemoryBackend`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputerHandle {
    pub id: u64,
    pub label: String,
}

/// Handle to a code stored in a [`MemoryBackend`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeHandle {
    pub id: u64,
    /// `code@computer`
    pub label: String,
    pub computer: ComputerHandle,
}

/// A stored computer and, once configured, its transport settings.
#[derive(Debug, Clone, Serialize)]
pub struct StoredComputer {
    pub id: u64,
    pub setup: ComputerBuilder,
    pub configuration: Option<Configuration>,
}

/// Transport settings of a configured computer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Configuration {
    pub user: String,
    pub params: ConfigureParams,
}

/// A stored code.
#[derive(Debug, Clone, Serialize)]
pub struct StoredCode {
    pub id: u64,
    #[serde(flatten)]
    pub code: CodeBuilder<ComputerHandle>,
}

/// Backend that keeps computers and codes in memory.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryBackend {
    user: String,
    computers: IndexMap<String, StoredComputer>,
    codes: IndexMap<String, StoredCode>,
    #[serde(skip)]
    next_id: u64,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::with_user(DEFAULT_USER)
    }

    /// Create an empty backend whose default user is `user`.
    pub fn with_user(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            computers: IndexMap::new(),
            codes: IndexMap::new(),
            next_id: 1,
        }
    }

    /// Stored computers keyed by label.
    pub fn computers(&self) -> &IndexMap<String, StoredComputer> {
        &self.computers
    }

    /// Stored codes keyed by `code@computer`.
    pub fn codes(&self) -> &IndexMap<String, StoredCode> {
        &self.codes
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MemoryBackend {
    type Computer = ComputerHandle;
    type Code = CodeHandle;

    fn find_computer(&self, label: &str) -> Result<Option<ComputerHandle>> {
        Ok(self.computers.get(label).map(|stored| ComputerHandle {
            id: stored.id,
            label: label.to_string(),
        }))
    }

    fn store_computer(&mut self, builder: ComputerBuilder) -> Result<ComputerHandle> {
        if self.computers.contains_key(&builder.label) {
            return Err(RegistryError::Backend {
                message: format!("computer '{}' already exists", builder.label),
            });
        }

        let id = self.allocate_id();
        let handle = ComputerHandle {
            id,
            label: builder.label.clone(),
        };
        self.computers.insert(
            builder.label.clone(),
            StoredComputer {
                id,
                setup: builder,
                configuration: None,
            },
        );
        Ok(handle)
    }

    fn default_user(&self) -> Result<String> {
        Ok(self.user.clone())
    }

    fn configure_computer(
        &mut self,
        computer: &ComputerHandle,
        user: &str,
        params: &ConfigureParams,
    ) -> Result<()> {
        let stored =
            self.computers
                .get_mut(&computer.label)
                .ok_or_else(|| RegistryError::Backend {
                    message: format!("computer '{}' is not stored", computer.label),
                })?;
        stored.configuration = Some(Configuration {
            user: user.to_string(),
            params: params.clone(),
        });
        Ok(())
    }

    fn find_code(&self, label: &str) -> Result<Option<CodeHandle>> {
        Ok(self.codes.get(label).map(|stored| CodeHandle {
            id: stored.id,
            label: label.to_string(),
            computer: stored.code.computer.clone(),
        }))
    }

    fn store_code(&mut self, builder: CodeBuilder<ComputerHandle>) -> Result<CodeHandle> {
        let label = format!("{}@{}", builder.label, builder.computer.label);
        if self.codes.contains_key(&label) {
            return Err(RegistryError::Backend {
                message: format!("code '{}' already exists", label),
            });
        }

        let id = self.allocate_id();
        let handle = CodeHandle {
            id,
            label: label.clone(),
            computer: builder.computer.clone(),
        };
        self.codes.insert(label, StoredCode { id, code: builder });
        Ok(handle)
    }
}
