//! Persistence boundary for computers and codes.
//!
//! The registry only describes computers and codes; creating them is the
//! job of an external framework. [`Backend`] is the seam: resolution asks it
//! whether an object exists, and if not, hands it a builder to store.
//!
//! [`MemoryBackend`] keeps everything in process and is what the tests and
//! the CLI's dry-run preview use.

pub mod memory;

pub use memory::{CodeHandle, ComputerHandle, MemoryBackend};

use crate::error::Result;
use crate::registry::model::{CodeEntry, ComputerEntry, ConfigureParams};
use serde::Serialize;

/// How a code's executable gets onto its computer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeType {
    /// The executable is already installed at a remote path
    OnComputer,
    /// The executable is stored by the framework and uploaded on use
    StoreAndUpload,
}

/// Arguments for creating a computer.
///
/// Built from a registry `setup` section. `extras` is left out; it belongs
/// to a separate post-setup step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputerBuilder {
    pub label: String,
    pub hostname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub transport: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepend_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shebang: Option<String>,
    pub use_double_quotes: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mpirun_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mpiprocs_per_machine: Option<i64>,
    pub default_memory_per_machine: Option<i64>,
}

impl ComputerBuilder {
    /// Builder for a merged computer entry.
    pub fn from_entry(entry: &ComputerEntry) -> Self {
        let setup = &entry.setup;
        Self {
            label: setup.label.clone().unwrap_or_else(|| entry.label.clone()),
            hostname: setup.hostname.clone(),
            description: setup.description.clone(),
            transport: setup.transport.clone(),
            scheduler: setup.scheduler.clone(),
            work_dir: setup.work_dir.clone(),
            prepend_text: setup.prepend_text.clone(),
            append_text: setup.append_text.clone(),
            shebang: setup.shebang.clone(),
            use_double_quotes: setup.use_double_quotes,
            mpirun_command: setup.mpirun_command.clone(),
            mpiprocs_per_machine: setup.mpiprocs_per_machine,
            default_memory_per_machine: setup.default_memory_per_machine,
        }
    }
}

/// Arguments for creating a code on an already resolved computer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeBuilder<C> {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub computer: C,
    pub code_type: CodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_abs_path: Option<String>,
    pub input_plugin: String,
    pub use_double_quotes: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepend_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append_text: Option<String>,
}

impl<C> CodeBuilder<C> {
    /// Builder for a merged code entry bound to `computer`.
    pub fn from_entry(entry: &CodeEntry, computer: C) -> Self {
        let code_type = if entry.is_on_computer() {
            CodeType::OnComputer
        } else {
            CodeType::StoreAndUpload
        };

        Self {
            label: entry.label.clone(),
            description: entry.description.clone(),
            computer,
            code_type,
            remote_abs_path: entry.remote_abs_path.clone(),
            input_plugin: entry.input_plugin.clone(),
            use_double_quotes: entry.use_double_quotes,
            prepend_text: entry.prepend_text.clone(),
            append_text: entry.append_text.clone(),
        }
    }
}

/// External store of computers and codes.
pub trait Backend {
    /// Handle to a stored computer
    type Computer: Clone;
    /// Handle to a stored code
    type Code;

    /// Look up a stored computer by label.
    fn find_computer(&self, label: &str) -> Result<Option<Self::Computer>>;

    /// Create and persist a computer.
    fn store_computer(&mut self, builder: ComputerBuilder) -> Result<Self::Computer>;

    /// The user that new computers are configured for.
    fn default_user(&self) -> Result<String>;

    /// Configure a stored computer's transport for `user`.
    fn configure_computer(
        &mut self,
        computer: &Self::Computer,
        user: &str,
        params: &ConfigureParams,
    ) -> Result<()>;

    /// Look up a stored code by its `code@computer` label.
    fn find_code(&self, label: &str) -> Result<Option<Self::Code>>;

    /// Create and persist a code.
    fn store_code(&mut self, builder: CodeBuilder<Self::Computer>) -> Result<Self::Code>;
}
