//! Code Registry - a YAML registry of compute resources and the codes
//! installed on them.
//!
//! Computers and codes are described in YAML files, merged into a single
//! label-indexed registry, optionally rendered with template variables, and
//! resolved lazily into objects of a persistence backend.
//!
//! # Modules
//!
//! - [`backend`] - Persistence boundary and an in-memory implementation
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Registry location configuration
//! - [`context`] - The registry a process resolves labels against
//! - [`error`] - Error types and result aliases
//! - [`publish`] - Versioned JSON snapshots of registry data
//! - [`registry`] - Loading, validation, merging, and templating
//! - [`resolve`] - Lazy creation of computers and codes
//!
//! # Example
//!
//! ```
//! use code_registry::registry::{replace_template_vars, TemplateVars};
//! use serde_json::json;
//!
//! let mut vars = TemplateVars::new();
//! vars.insert("username".to_string(), "alice".to_string());
//! let setup = json!({"work_dir": "/scratch/{{ username }}"});
//! let rendered = replace_template_vars(&setup, Some(&vars)).unwrap();
//! assert_eq!(rendered["work_dir"], "/scratch/alice");
//! ```
//!
//! For directory-based loading, see the integration tests.

pub mod backend;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod publish;
pub mod registry;
pub mod resolve;

pub use context::RegistryContext;
pub use error::{RegistryError, Result};
pub use registry::CodeRegistry;
pub use resolve::{load_code, load_computer};
