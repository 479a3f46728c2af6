//! The merged, label-indexed registry of computers and codes.

use crate::error::{RegistryError, Result};
use crate::registry::loader::{load_code_registry, RawRegistry, RegistryLoader};
use crate::registry::merger::merge_documents;
use crate::registry::model::{split_code_label, CodeEntry, ComputerEntry};
use crate::registry::template::{document_variables, replace_template_vars, TemplateVars};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// Registry of computers and their codes, merged from source documents.
///
/// The source documents are kept alongside the merged view so that
/// [`CodeRegistry::render`] can always start from the unrendered text.
/// Clones share all state.
#[derive(Debug, Clone)]
pub struct CodeRegistry {
    raw: Arc<RawRegistry>,
    computers: Arc<IndexMap<String, ComputerEntry>>,
    overwritten: Arc<Vec<String>>,
}

impl CodeRegistry {
    /// Merge validated source documents into a registry.
    pub fn build(raw: Arc<RawRegistry>) -> Result<Self> {
        let outcome = merge_documents(&raw)?;
        Ok(Self {
            raw,
            computers: Arc::new(outcome.computers),
            overwritten: Arc::new(outcome.overwritten),
        })
    }

    /// Load and merge a registry directory, bypassing any cache.
    pub fn from_directory(directory: &Path) -> Result<Self> {
        Self::build(Arc::new(load_code_registry(directory)?))
    }

    /// Load and merge a registry directory through a caching loader.
    pub fn from_loader(loader: &RegistryLoader, directory: &Path) -> Result<Self> {
        Self::build(loader.load(directory)?)
    }

    /// The source documents this registry was merged from.
    pub fn raw(&self) -> &RawRegistry {
        &self.raw
    }

    /// Merged computers keyed by label.
    pub fn computers(&self) -> &IndexMap<String, ComputerEntry> {
        &self.computers
    }

    /// Computer labels that were defined more than once while merging.
    pub fn overwritten(&self) -> &[String] {
        &self.overwritten
    }

    /// Labels of all computers, in registry order.
    pub fn computer_list(&self) -> Vec<String> {
        self.computers.keys().cloned().collect()
    }

    /// Configuration of a computer.
    ///
    /// # Errors
    ///
    /// Returns `KeyNotFound` if no computer has this label.
    pub fn get_computer(&self, label: &str) -> Result<&ComputerEntry> {
        self.computers
            .get(label)
            .ok_or_else(|| RegistryError::KeyNotFound {
                kind: "Computer",
                key: label.to_string(),
            })
    }

    /// Labels of all codes as `code@computer`.
    pub fn code_list(&self) -> Vec<String> {
        self.computers
            .iter()
            .flat_map(|(computer_label, computer)| {
                computer
                    .codes
                    .keys()
                    .map(move |code_label| format!("{}@{}", code_label, computer_label))
            })
            .collect()
    }

    /// Configuration of a code addressed as `code@computer`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLabelFormat` if the label is not `code@computer` and
    /// `KeyNotFound` if the computer or the code does not exist.
    pub fn get_code(&self, label: &str) -> Result<&CodeEntry> {
        let (code_label, computer_label) =
            split_code_label(label).ok_or_else(|| RegistryError::InvalidLabelFormat {
                label: label.to_string(),
            })?;

        self.get_computer(computer_label)?
            .codes
            .get(code_label)
            .ok_or_else(|| RegistryError::KeyNotFound {
                kind: "Code",
                key: label.to_string(),
            })
    }

    /// Registry with template variables replaced.
    ///
    /// Without variables this is a cheap clone of `self`. Otherwise the
    /// source documents are rendered and merged again, so rendering twice
    /// with different variables never compounds.
    pub fn render(&self, vars: Option<&TemplateVars>) -> Result<Self> {
        let vars = match vars {
            Some(vars) if !vars.is_empty() => vars,
            _ => return Ok(self.clone()),
        };

        let source = serde_json::to_value(&*self.raw)?;
        let rendered: RawRegistry =
            serde_json::from_value(replace_template_vars(&source, Some(vars))?)?;
        tracing::debug!("Rendered registry with {} variable(s)", vars.len());
        Self::build(Arc::new(rendered))
    }

    /// Template variables used anywhere in the source documents.
    pub fn template_variables(&self) -> Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for document in self.raw.values() {
            names.extend(document_variables(document)?);
        }
        Ok(names)
    }

    /// Whether two registries share the same merged state.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.computers, &other.computers)
    }

    /// Merged registry as a JSON value.
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(&*self.computers)?)
    }
}

impl PartialEq for CodeRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.computers == other.computers
    }
}
