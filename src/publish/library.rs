//! Collection of a library tree into a [`Database`].
//!
//! Layout:
//!
//! ```text
//! <root>/
//!   <domain>/
//!     default -> ./<computer>      (symlink, optional)
//!     <computer>/
//!       computer-setup.yaml
//!       computer-configure.yaml
//!       <code>.yaml
//! ```
//!
//! Hidden entries are skipped at every level.

use super::{Database, Domain, Sections};
use crate::error::{RegistryError, Result};
use crate::registry::loader::read_registry_text;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the symlink marking a domain's default computer.
const DEFAULT_LINK: &str = "default";

/// Read every domain under `root`.
pub fn collect_library(root: &Path) -> Result<Database> {
    if !root.is_dir() {
        return Err(RegistryError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut database = Database::default();
    for domain_dir in visible_dirs(root)? {
        let name = entry_name(&domain_dir);
        let domain = collect_domain(&domain_dir)?;
        tracing::debug!(
            "Collected domain '{}' with {} computer(s)",
            name,
            domain.computers.len()
        );
        database.domains.insert(name, domain);
    }

    Ok(database)
}

fn collect_domain(dir: &Path) -> Result<Domain> {
    let mut domain = Domain::default();

    for computer_dir in visible_dirs(dir)? {
        let name = entry_name(&computer_dir);
        if name == DEFAULT_LINK {
            continue;
        }
        domain
            .computers
            .insert(name, collect_sections(&computer_dir)?);
    }

    domain.default = default_computer(dir)?;
    Ok(domain)
}

fn collect_sections(dir: &Path) -> Result<Sections> {
    let mut sections = Sections::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let name = entry_name(&path);
        if name.starts_with('.') || !path.is_file() || !is_yaml(&path) {
            continue;
        }

        let content = read_registry_text(&path)?;
        let value: Value = serde_yaml::from_str(&content).map_err(|e| RegistryError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        sections.insert(name, value);
    }

    Ok(sections)
}

/// Target of the domain's `default` symlink, without a leading `./`.
fn default_computer(dir: &Path) -> Result<Option<String>> {
    let link = dir.join(DEFAULT_LINK);
    if !link.is_symlink() {
        return Ok(None);
    }

    let target = fs::read_link(&link)?;
    let target = target.to_string_lossy();
    let target = target.strip_prefix("./").unwrap_or(&target);
    Ok(Some(target.trim_end_matches('/').to_string()))
}

fn visible_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() && !entry_name(&path).starts_with('.') {
            dirs.push(path);
        }
    }
    Ok(dirs)
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yml" || e == "yaml")
        .unwrap_or(false)
}
