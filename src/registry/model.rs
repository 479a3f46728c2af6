//! Typed view of merged registry entries.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Transport-specific configure parameters, passed through as keyword
/// arguments when a computer is configured.
pub type ConfigureParams = Map<String, Value>;

/// A computer together with its configure parameters and codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComputerEntry {
    pub label: String,
    pub setup: ComputerSetup,

    /// Configure parameters keyed by transport (e.g. `core.ssh`)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub configure: IndexMap<String, ConfigureParams>,

    /// Codes keyed by code label
    #[serde(default)]
    pub codes: IndexMap<String, CodeEntry>,
}

impl ComputerEntry {
    /// Configure parameters for this computer's own transport.
    pub fn transport_params(&self) -> Option<&ConfigureParams> {
        self.configure.get(&self.setup.transport)
    }
}

/// Arguments used to create a computer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComputerSetup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub transport: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub append_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepend_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shebang: Option<String>,
    #[serde(default)]
    pub use_double_quotes: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpirun_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpiprocs_per_machine: Option<i64>,
    #[serde(default)]
    pub default_memory_per_machine: Option<i64>,

    /// Free-form data for post-setup steps; never passed to the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Map<String, Value>>,
}

/// A code bound to exactly one computer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodeEntry {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Label of the owning computer, set during merge
    pub computer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_computer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_abs_path: Option<String>,
    pub input_plugin: String,
    #[serde(default)]
    pub use_double_quotes: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepend_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub append_text: Option<String>,
}

impl CodeEntry {
    /// The external address of this code: `code@computer`.
    pub fn full_label(&self) -> String {
        format!("{}@{}", self.label, self.computer)
    }

    /// Whether the executable already lives on the computer.
    ///
    /// An entry that does not say falls back to whether it names a remote
    /// path.
    pub fn is_on_computer(&self) -> bool {
        self.on_computer
            .unwrap_or_else(|| self.remote_abs_path.is_some())
    }
}

/// Split `code@computer` into its two labels.
///
/// Returns `None` unless there is exactly one `@` with text on both sides.
pub fn split_code_label(label: &str) -> Option<(&str, &str)> {
    let (code, computer) = label.split_once('@')?;
    if code.is_empty() || computer.is_empty() || computer.contains('@') {
        return None;
    }
    Some((code, computer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn code(value: Value) -> CodeEntry {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn split_accepts_well_formed_labels() {
        assert_eq!(split_code_label("cp2k@daint"), Some(("cp2k", "daint")));
    }

    #[test]
    fn split_rejects_malformed_labels() {
        assert_eq!(split_code_label("bad-label-no-at"), None);
        assert_eq!(split_code_label("@daint"), None);
        assert_eq!(split_code_label("cp2k@"), None);
        assert_eq!(split_code_label("a@b@c"), None);
    }

    #[test]
    fn full_label_joins_code_and_computer() {
        let entry = code(json!({"label": "cp2k", "computer": "daint", "input_plugin": "cp2k"}));
        assert_eq!(entry.full_label(), "cp2k@daint");
    }

    #[test]
    fn on_computer_falls_back_to_remote_path() {
        let entry = code(json!({
            "label": "cp2k", "computer": "daint", "input_plugin": "cp2k",
            "remote_abs_path": "/apps/cp2k"
        }));
        assert!(entry.is_on_computer());

        let entry = code(json!({"label": "x", "computer": "c", "input_plugin": "p"}));
        assert!(!entry.is_on_computer());

        let entry = code(json!({
            "label": "x", "computer": "c", "input_plugin": "p",
            "on_computer": false, "remote_abs_path": "/bin/x"
        }));
        assert!(!entry.is_on_computer());
    }

    #[test]
    fn transport_params_follow_setup_transport() {
        let computer: ComputerEntry = serde_json::from_value(json!({
            "label": "daint",
            "setup": {"hostname": "daint.cscs.ch", "transport": "core.ssh"},
            "configure": {"core.local": {}, "core.ssh": {"safe_interval": 5}}
        }))
        .unwrap();
        assert_eq!(computer.transport_params().unwrap()["safe_interval"], 5);
    }
}
