//! Versioned compatibility rewrites of snapshots.
//!
//! Newer versions of the framework that consumes snapshots renamed some
//! fields and namespaced its built-in plugin names. Each [`SchemaVersion`]
//! describes the shape a consumer expects; [`migrate`] produces a rewritten
//! copy and leaves the input untouched.
//!
//! The rewrite is applied to every mapping in the snapshot, so it works on
//! per-file sections as well as on whole registry documents.

use super::Database;
use serde_json::{Map, Value};
use std::fmt;

/// Transports shipped with the framework core.
const CORE_TRANSPORTS: &[&str] = &["local", "ssh"];

/// Schedulers shipped with the framework core.
const CORE_SCHEDULERS: &[&str] = &["direct", "lsf", "pbspro", "sge", "slurm", "torque"];

const CORE_PREFIX: &str = "core.";

/// Snapshot shape expected by a consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum SchemaVersion {
    /// Registry fields as authored
    V1,
    /// Namespaced core plugins and renamed code fields
    V2,
}

impl SchemaVersion {
    /// Every known version, oldest first.
    pub const ALL: [SchemaVersion; 2] = [SchemaVersion::V1, SchemaVersion::V2];

    /// File name of this version's snapshot.
    pub fn file_name(self) -> &'static str {
        match self {
            SchemaVersion::V1 => "database.json",
            SchemaVersion::V2 => "database_v2.json",
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::V1 => write!(f, "v1"),
            SchemaVersion::V2 => write!(f, "v2"),
        }
    }
}

/// Rewrite a snapshot for `version`.
pub fn migrate(database: &Database, version: SchemaVersion) -> Database {
    let mut migrated = database.clone();
    if version == SchemaVersion::V1 {
        return migrated;
    }

    for domain in migrated.domains.values_mut() {
        for sections in domain.computers.values_mut() {
            for section in sections.values_mut() {
                migrate_value_v2(section);
            }
        }
    }
    migrated
}

fn migrate_value_v2(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.contains_key("hostname") && map.contains_key("transport") {
                namespace(map, "transport", CORE_TRANSPORTS);
                namespace(map, "scheduler", CORE_SCHEDULERS);
            }
            if map.contains_key("input_plugin") {
                migrate_code_v2(map);
            }
            for nested in map.values_mut() {
                migrate_value_v2(nested);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(migrate_value_v2),
        _ => {}
    }
}

/// Prefix a core plugin name with `core.`; other names are left alone.
fn namespace(map: &mut Map<String, Value>, key: &str, core_names: &[&str]) {
    if let Some(Value::String(name)) = map.get_mut(key) {
        if core_names.contains(&name.as_str()) {
            *name = format!("{}{}", CORE_PREFIX, name);
        }
    }
}

fn migrate_code_v2(map: &mut Map<String, Value>) {
    rename(map, "input_plugin", "default_calc_job_plugin");
    rename(map, "remote_abs_path", "filepath_executable");
    map.remove("on_computer");
}

fn rename(map: &mut Map<String, Value>, from: &str, to: &str) {
    if let Some(value) = map.remove(from) {
        map.insert(to.to_string(), value);
    }
}
