//! Registry of computers and codes.
//!
//! This module handles everything between YAML files on disk and a merged,
//! queryable registry:
//! - Schema declarations in [`schema`], evaluated by [`validator`]
//! - `{{ variable }}` substitution in [`template`]
//! - Directory loading and caching in [`loader`]
//! - Merging of source documents in [`merger`]
//! - The merged [`CodeRegistry`] in [`code_registry`]
//!
//! # Example
//!
//! ```
//! use code_registry::registry::CodeRegistry;
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(
//!     temp.path().join("localhost.yaml"),
//!     "computers:\n  - label: localhost\n    setup:\n      hostname: localhost\n      transport: core.local\ncodes:\n  - label: bash\n    input_plugin: core.shell\n",
//! )
//! .unwrap();
//!
//! let registry = CodeRegistry::from_directory(temp.path()).unwrap();
//! assert_eq!(registry.computer_list(), vec!["localhost"]);
//! assert_eq!(registry.code_list(), vec!["bash@localhost"]);
//! ```

pub mod code_registry;
pub mod loader;
pub mod merger;
pub mod model;
pub mod schema;
pub mod template;
pub mod validator;

// Re-exports
pub use code_registry::CodeRegistry;
pub use loader::{load_code_registry, RawRegistry, RegistryLoader};
pub use model::{split_code_label, CodeEntry, ComputerEntry, ComputerSetup, ConfigureParams};
pub use template::{replace_template_vars, undeclared_variables, TemplateVars};
pub use validator::{SchemaError, SchemaErrorKind};
