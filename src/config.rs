//! Registry location configuration.
//!
//! The registry directory is resolved in this order:
//! 1. An explicit path (e.g. the `--registry` CLI flag)
//! 2. The `AIIDA_CODE_REGISTRY` environment variable
//! 3. The `configurations/` directory shipped with this crate

use crate::error::REGISTRY_ENV_VAR;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Where to find the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Directory holding the registry YAML files
    pub directory: PathBuf,
}

impl RegistryConfig {
    /// Use an explicit registry directory.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Resolve the registry directory from the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Resolve the registry directory using a custom variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        match lookup(REGISTRY_ENV_VAR) {
            Some(dir) if !dir.is_empty() => Self::new(dir),
            _ => Self::new(Self::default_directory()),
        }
    }

    /// The registry bundled with the crate.
    pub fn default_directory() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("configurations")
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new(Self::default_directory())
    }
}
