//! Merging of registry source documents into one label-indexed registry.
//!
//! # Merge Rules
//!
//! - Documents are processed in load order, computers in file order
//! - `setup.label` defaults to the computer label
//! - File-scope `codes` are copied into every computer of the same file
//! - Every code's `computer` is overwritten with its owner's label
//! - Codes are keyed by label; a later duplicate within a computer wins
//! - A computer label seen again replaces the earlier entry wholesale
//!   (codes included) and is reported as overwritten

use crate::error::{RegistryError, Result};
use crate::registry::loader::RawRegistry;
use crate::registry::model::ComputerEntry;
use crate::registry::validator::{SchemaError, SchemaErrorKind};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Result of merging a set of source documents.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Merged computers keyed by label, in first-seen order
    pub computers: IndexMap<String, ComputerEntry>,

    /// Labels that were defined more than once, in the order of redefinition
    pub overwritten: Vec<String>,
}

/// Merge validated source documents.
pub fn merge_documents(raw: &RawRegistry) -> Result<MergeOutcome> {
    let mut outcome = MergeOutcome::default();

    for (file, document) in raw {
        let shared_codes = array_field(document, "codes");

        for (index, computer) in array_field(document, "computers").iter().enumerate() {
            let entry = merge_computer(file, index, computer, shared_codes)?;

            if outcome.computers.contains_key(&entry.label) {
                tracing::warn!(
                    "Computer '{}' found in registry multiple times, overwriting.",
                    entry.label
                );
                outcome.overwritten.push(entry.label.clone());
            }
            outcome.computers.insert(entry.label.clone(), entry);
        }
    }

    Ok(outcome)
}

fn array_field<'a>(document: &'a Value, key: &str) -> &'a [Value] {
    document
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn merge_computer(
    file: &str,
    index: usize,
    computer: &Value,
    shared_codes: &[Value],
) -> Result<ComputerEntry> {
    let path = format!("computers[{}]", index);
    let mut computer = as_object(file, &path, computer)?.clone();

    let label = computer
        .get("label")
        .and_then(Value::as_str)
        .ok_or_else(|| schema_error(file, format!("{}.label", path), SchemaErrorKind::MissingKey))?
        .to_string();

    if let Some(setup) = computer.get_mut("setup").and_then(Value::as_object_mut) {
        // The backend stores computers under the setup label
        match setup.get("label") {
            Some(Value::String(setup_label)) if *setup_label != label => {
                return Err(schema_error(
                    file,
                    format!("{}.setup.label", path),
                    SchemaErrorKind::LabelMismatch {
                        expected: label.clone(),
                    },
                ));
            }
            Some(_) => {}
            None => {
                setup.insert("label".to_string(), Value::String(label.clone()));
            }
        }
    }

    let own_codes = match computer.remove("codes") {
        Some(Value::Array(codes)) => codes,
        _ => Vec::new(),
    };
    let own_count = own_codes.len();

    let mut codes = Map::new();
    for (i, code) in own_codes
        .into_iter()
        .chain(shared_codes.iter().cloned())
        .enumerate()
    {
        let code_path = if i < own_count {
            format!("{}.codes[{}]", path, i)
        } else {
            format!("codes[{}]", i - own_count)
        };

        let mut code = match code {
            Value::Object(code) => code,
            other => return Err(schema_error(file, code_path, wrong_mapping(&other))),
        };
        code.insert("computer".to_string(), Value::String(label.clone()));

        let code_label = code
            .get("label")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                schema_error(file, format!("{}.label", code_path), SchemaErrorKind::MissingKey)
            })?
            .to_string();
        codes.insert(code_label, Value::Object(code));
    }
    computer.insert("codes".to_string(), Value::Object(codes));

    serde_json::from_value(Value::Object(computer)).map_err(|e| RegistryError::Parse {
        path: PathBuf::from(file),
        message: format!("computer '{}': {}", label, e),
    })
}

fn as_object<'a>(file: &str, path: &str, value: &'a Value) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| schema_error(file, path.to_string(), wrong_mapping(value)))
}

fn wrong_mapping(value: &Value) -> SchemaErrorKind {
    SchemaErrorKind::WrongType {
        expected: "mapping",
        found: if value.is_array() { "sequence" } else { "scalar" },
    }
}

fn schema_error(file: &str, path: String, kind: SchemaErrorKind) -> RegistryError {
    RegistryError::Schema {
        file: file.to_string(),
        source: SchemaError { path, kind },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(files: Vec<(&str, Value)>) -> RawRegistry {
        files
            .into_iter()
            .map(|(name, doc)| (name.to_string(), doc))
            .collect()
    }

    fn computer(label: &str, hostname: &str) -> Value {
        json!({"label": label, "setup": {"hostname": hostname, "transport": "core.local"}})
    }

    #[test]
    fn setup_label_defaults_to_computer_label() {
        let outcome = merge_documents(&raw(vec![(
            "a.yaml",
            json!({"computers": [computer("localhost", "localhost")]}),
        )]))
        .unwrap();
        let entry = &outcome.computers["localhost"];
        assert_eq!(entry.setup.label.as_deref(), Some("localhost"));
        assert!(entry.codes.is_empty());
    }

    #[test]
    fn matching_setup_label_is_kept() {
        let mut doc = computer("localhost", "localhost");
        doc["setup"]["label"] = json!("localhost");
        let outcome =
            merge_documents(&raw(vec![("a.yaml", json!({"computers": [doc]}))])).unwrap();
        assert_eq!(
            outcome.computers["localhost"].setup.label.as_deref(),
            Some("localhost")
        );
    }

    #[test]
    fn differing_setup_label_is_rejected() {
        let mut doc = computer("localhost", "localhost");
        doc["setup"]["label"] = json!("local-machine");
        match merge_documents(&raw(vec![("a.yaml", json!({"computers": [doc]}))])) {
            Err(RegistryError::Schema { file, source }) => {
                assert_eq!(file, "a.yaml");
                assert_eq!(source.path, "computers[0].setup.label");
                assert_eq!(
                    source.kind,
                    SchemaErrorKind::LabelMismatch {
                        expected: "localhost".to_string()
                    }
                );
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn file_scope_codes_are_copied_into_every_computer() {
        let outcome = merge_documents(&raw(vec![(
            "a.yaml",
            json!({
                "computers": [computer("a", "a.example.com"), computer("b", "b.example.com")],
                "codes": [{"label": "bash", "input_plugin": "core.shell", "computer": "elsewhere"}]
            }),
        )]))
        .unwrap();

        assert_eq!(outcome.computers["a"].codes["bash"].computer, "a");
        assert_eq!(outcome.computers["b"].codes["bash"].computer, "b");
    }

    #[test]
    fn file_scope_codes_do_not_leak_across_files() {
        let outcome = merge_documents(&raw(vec![
            (
                "a.yaml",
                json!({
                    "computers": [computer("a", "a.example.com")],
                    "codes": [{"label": "bash", "input_plugin": "core.shell"}]
                }),
            ),
            ("b.yaml", json!({"computers": [computer("b", "b.example.com")]})),
        ]))
        .unwrap();

        assert!(outcome.computers["a"].codes.contains_key("bash"));
        assert!(outcome.computers["b"].codes.is_empty());
    }

    #[test]
    fn own_codes_come_before_file_scope_codes() {
        let mut doc = computer("a", "a.example.com");
        doc["codes"] = json!([{"label": "cp2k", "input_plugin": "cp2k"}]);
        let outcome = merge_documents(&raw(vec![(
            "a.yaml",
            json!({
                "computers": [doc],
                "codes": [{"label": "bash", "input_plugin": "core.shell"}]
            }),
        )]))
        .unwrap();

        let labels: Vec<_> = outcome.computers["a"].codes.keys().cloned().collect();
        assert_eq!(labels, vec!["cp2k", "bash"]);
    }

    #[test]
    fn duplicate_code_label_last_wins() {
        let mut doc = computer("a", "a.example.com");
        doc["codes"] = json!([
            {"label": "cp2k", "input_plugin": "cp2k", "description": "first"},
            {"label": "cp2k", "input_plugin": "cp2k", "description": "second"}
        ]);
        let outcome =
            merge_documents(&raw(vec![("a.yaml", json!({"computers": [doc]}))])).unwrap();

        let codes = &outcome.computers["a"].codes;
        assert_eq!(codes.len(), 1);
        assert_eq!(codes["cp2k"].description.as_deref(), Some("second"));
        assert!(outcome.overwritten.is_empty());
    }

    #[test]
    fn duplicate_computer_is_replaced_wholesale() {
        let mut first = computer("foo", "one.example.com");
        first["codes"] = json!([{"label": "old", "input_plugin": "x"}]);
        let outcome = merge_documents(&raw(vec![
            ("file1.yaml", json!({"computers": [first, computer("bar", "bar")]})),
            ("file2.yaml", json!({"computers": [computer("foo", "two.example.com")]})),
        ]))
        .unwrap();

        let foo = &outcome.computers["foo"];
        assert_eq!(foo.setup.hostname, "two.example.com");
        assert!(foo.codes.is_empty());
        assert_eq!(outcome.overwritten, vec!["foo".to_string()]);
        // first-seen position is kept
        let labels: Vec<_> = outcome.computers.keys().cloned().collect();
        assert_eq!(labels, vec!["foo", "bar"]);
    }

    #[test]
    fn code_without_label_is_a_schema_error() {
        let outcome = merge_documents(&raw(vec![(
            "a.yaml",
            json!({
                "computers": [computer("a", "a")],
                "codes": [{"input_plugin": "core.shell"}]
            }),
        )]));

        match outcome {
            Err(RegistryError::Schema { file, source }) => {
                assert_eq!(file, "a.yaml");
                assert_eq!(source.path, "codes[0].label");
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }
}
