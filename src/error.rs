//! Error types for code registry operations.
//!
//! This module defines [`RegistryError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `RegistryError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `RegistryError::Other`) for unexpected errors
//! - Every error names the key it concerns (file, label, or directory) so an
//!   operator can fix the registry without further digging

use std::path::PathBuf;
use thiserror::Error;

use crate::registry::validator::SchemaError;

/// Environment variable pointing at the registry directory.
pub const REGISTRY_ENV_VAR: &str = "AIIDA_CODE_REGISTRY";

/// Core error type for code registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A registry file could not be decoded as YAML.
    #[error("Failed to parse registry file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A registry file could not be read as UTF-8 text.
    #[error("Failed to read registry file {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A registry document does not match the registry schema.
    #[error("Invalid registry file '{file}': {source}")]
    Schema {
        file: String,
        #[source]
        source: SchemaError,
    },

    /// Template substitution failed.
    #[error("Template error: {message}")]
    Template { message: String },

    /// The registry location is not a directory.
    #[error("{} is not a directory. Use the '{}' variable to point to a directory.", path.display(), REGISTRY_ENV_VAR)]
    NotADirectory { path: PathBuf },

    /// The registry directory holds no YAML files.
    #[error("No YAML files found in {}.", path.display())]
    EmptyRegistry { path: PathBuf },

    /// A computer or code label is not present in the registry.
    #[error("{kind} '{key}' not found in registry")]
    KeyNotFound { kind: &'static str, key: String },

    /// A code label is not of the form `code@computer`.
    #[error("Label '{label}' is not of form 'code@computer'.")]
    InvalidLabelFormat { label: String },

    /// A computer has no configure parameters for its transport.
    #[error("Computer '{computer}' is missing configure info for transport '{transport}'.")]
    MissingConfiguration { computer: String, transport: String },

    /// An object exists neither in the backend nor in the registry.
    #[error("{kind} '{label}' found neither in backend nor in registry. {kind}s in registry: {known:?}")]
    NotExistent {
        kind: &'static str,
        label: String,
        known: Vec<String>,
    },

    /// The persistence backend rejected an operation.
    #[error("Backend error: {message}")]
    Backend { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error wrapper.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for code registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
