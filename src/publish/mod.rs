//! Flattening of registry data into versioned JSON snapshots.
//!
//! A snapshot is a [`Database`]: domains, each holding computers, each
//! holding named sections (typically one per source file). Snapshots can be
//! built from a library tree on disk ([`collect_library`]) or from a merged
//! [`CodeRegistry`](crate::registry::CodeRegistry) ([`Database::from_registry`]),
//! then rewritten for newer consumers by [`migrate`].

pub mod library;
pub mod migrate;

pub use library::collect_library;
pub use migrate::{migrate, SchemaVersion};

use crate::error::Result;
use crate::registry::CodeRegistry;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Sections of one computer keyed by section name.
pub type Sections = BTreeMap<String, Value>;

/// Computers of one domain, plus the domain's default computer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Domain {
    #[serde(flatten)]
    pub computers: BTreeMap<String, Sections>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// A full snapshot keyed by domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Database {
    pub domains: BTreeMap<String, Domain>,
}

impl Database {
    /// Snapshot of a merged registry under a single domain.
    ///
    /// Each computer gets `setup`, `configure`, and `codes` sections.
    pub fn from_registry(registry: &CodeRegistry, domain: &str) -> Result<Self> {
        let mut computers = BTreeMap::new();

        for (label, entry) in registry.computers() {
            let mut sections = Sections::new();
            sections.insert("setup".to_string(), serde_json::to_value(&entry.setup)?);
            sections.insert(
                "configure".to_string(),
                serde_json::to_value(&entry.configure)?,
            );
            sections.insert("codes".to_string(), serde_json::to_value(&entry.codes)?);
            computers.insert(label.clone(), sections);
        }

        let mut domains = BTreeMap::new();
        domains.insert(
            domain.to_string(),
            Domain {
                computers,
                default: None,
            },
        );
        Ok(Self { domains })
    }

    /// Pretty-printed JSON with four-space indentation.
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

/// Write one snapshot file per schema version into `out_dir`.
///
/// Returns the written paths in the order of `versions`.
pub fn write_snapshots(
    database: &Database,
    out_dir: &Path,
    versions: &[SchemaVersion],
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;

    let mut written = Vec::with_capacity(versions.len());
    for version in versions {
        let path = out_dir.join(version.file_name());
        fs::write(&path, migrate(database, *version).to_json_pretty()?)?;
        tracing::info!("Wrote {} snapshot to {}", version, path.display());
        written.push(path);
    }

    Ok(written)
}
