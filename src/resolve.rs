//! Resolution of registry labels to backend objects.
//!
//! Resolution order for a label:
//! 1. Backend - an object that already exists is returned untouched
//! 2. Registry - otherwise the rendered registry entry is built and stored
//!
//! A code always resolves its computer first, so a computer exists before
//! any code that runs on it.

use crate::backend::{Backend, CodeBuilder, ComputerBuilder};
use crate::context::RegistryContext;
use crate::error::{RegistryError, Result};
use crate::registry::model::split_code_label;
use crate::registry::template::TemplateVars;

/// Load a computer from the backend, creating it from the registry if needed.
///
/// # Errors
///
/// Returns `NotExistent` (listing the registry's computers) if the label is
/// unknown, and `MissingConfiguration` if the entry has no configure
/// parameters for its transport. Nothing is stored in either case.
pub fn load_computer<B: Backend>(
    ctx: &RegistryContext,
    backend: &mut B,
    label: &str,
    vars: Option<&TemplateVars>,
) -> Result<B::Computer> {
    if let Some(existing) = backend.find_computer(label)? {
        tracing::debug!("Computer '{}' already exists", label);
        return Ok(existing);
    }

    let registry = ctx.rendered(vars)?;
    let entry = registry
        .computers()
        .get(label)
        .ok_or_else(|| RegistryError::NotExistent {
            kind: "Computer",
            label: label.to_string(),
            known: registry.computer_list(),
        })?;

    let transport = &entry.setup.transport;
    let params = entry
        .transport_params()
        .ok_or_else(|| RegistryError::MissingConfiguration {
            computer: label.to_string(),
            transport: transport.clone(),
        })?;

    tracing::info!("Setting up computer '{}'.", label);
    let computer = backend.store_computer(ComputerBuilder::from_entry(entry))?;

    let user = backend.default_user()?;
    tracing::info!(
        "Configuring computer '{}' for '{}' transport.",
        label,
        transport
    );
    backend.configure_computer(&computer, &user, params)?;

    Ok(computer)
}

/// Load a code from the backend, creating it (and its computer) if needed.
///
/// # Errors
///
/// Returns `InvalidLabelFormat` unless `label` is `code@computer`, and
/// `NotExistent` (listing the registry's codes) if the code is unknown.
pub fn load_code<B: Backend>(
    ctx: &RegistryContext,
    backend: &mut B,
    label: &str,
    vars: Option<&TemplateVars>,
) -> Result<B::Code> {
    if split_code_label(label).is_none() {
        return Err(RegistryError::InvalidLabelFormat {
            label: label.to_string(),
        });
    }

    if let Some(existing) = backend.find_code(label)? {
        tracing::debug!("Code '{}' already exists", label);
        return Ok(existing);
    }

    let registry = ctx.rendered(vars)?;
    let entry = match registry.get_code(label) {
        Ok(entry) => entry,
        Err(RegistryError::KeyNotFound { .. }) => {
            return Err(RegistryError::NotExistent {
                kind: "Code",
                label: label.to_string(),
                known: registry.code_list(),
            })
        }
        Err(e) => return Err(e),
    };

    let computer = load_computer(ctx, backend, &entry.computer, vars)?;

    tracing::info!("Setting up code '{}'.", label);
    backend.store_code(CodeBuilder::from_entry(entry, computer))
}
