//! Schema declarations for registry documents.
//!
//! A registry file has the shape:
//!
//! ```yaml
//! computers:
//!   - label: daint
//!     setup:
//!       hostname: daint.cscs.ch
//!       transport: core.ssh
//!       scheduler: core.slurm
//!     configure:
//!       core.ssh:
//!         safe_interval: 5
//!     codes:
//!       - label: cp2k
//!         input_plugin: cp2k
//!         on_computer: true
//!         remote_abs_path: /apps/cp2k/bin/cp2k.psmp
//! codes: []  # replicated into every computer of this file
//! ```

use super::validator::{DefaultValue, FieldKind, FieldSpec, Schema};

/// A code installed on (or uploaded to) a computer.
pub static CODE_SCHEMA: Schema = Schema {
    name: "code",
    fields: &[
        FieldSpec::optional("label", FieldKind::Str),
        FieldSpec::optional("description", FieldKind::Str),
        FieldSpec::optional("computer", FieldKind::Str),
        FieldSpec::optional("on_computer", FieldKind::Bool),
        FieldSpec::optional("remote_abs_path", FieldKind::Str),
        FieldSpec::required("input_plugin", FieldKind::Str),
        FieldSpec::with_default(
            "use_double_quotes",
            FieldKind::Bool,
            DefaultValue::Bool(false),
        ),
        FieldSpec::optional("prepend_text", FieldKind::Str),
        FieldSpec::optional("append_text", FieldKind::Str),
    ],
};

/// Arguments for creating a computer.
pub static COMPUTER_SETUP_SCHEMA: Schema = Schema {
    name: "setup",
    fields: &[
        FieldSpec::optional("label", FieldKind::Str),
        FieldSpec::required("hostname", FieldKind::Str),
        FieldSpec::optional("description", FieldKind::Str),
        FieldSpec::required("transport", FieldKind::Str),
        FieldSpec::optional("scheduler", FieldKind::Str),
        FieldSpec::optional("work_dir", FieldKind::Str),
        FieldSpec::optional("append_text", FieldKind::Str),
        FieldSpec::optional("prepend_text", FieldKind::Str),
        FieldSpec::optional("shebang", FieldKind::Str),
        FieldSpec::with_default(
            "use_double_quotes",
            FieldKind::Bool,
            DefaultValue::Bool(false),
        ),
        FieldSpec::optional("mpirun_command", FieldKind::Str),
        FieldSpec::optional("mpiprocs_per_machine", FieldKind::Int),
        FieldSpec::with_default(
            "default_memory_per_machine",
            FieldKind::NullableInt,
            DefaultValue::Null,
        ),
        FieldSpec::optional("extras", FieldKind::Map),
    ],
};

/// Configure parameters of the SSH transport.
pub static CONFIGURE_SSH_SCHEMA: Schema = Schema {
    name: "core.ssh",
    fields: &[
        FieldSpec::optional("timeout", FieldKind::Number),
        FieldSpec::optional("safe_interval", FieldKind::Number),
        FieldSpec::optional("compress", FieldKind::Bool),
        FieldSpec::optional("key_policy", FieldKind::Str),
    ],
};

/// The local transport takes no parameters.
pub static CONFIGURE_LOCAL_SCHEMA: Schema = Schema {
    name: "core.local",
    fields: &[],
};

/// Transport name to configure-parameter schema.
pub static TRANSPORTS: [(&str, &Schema); 2] = [
    ("core.local", &CONFIGURE_LOCAL_SCHEMA),
    ("core.ssh", &CONFIGURE_SSH_SCHEMA),
];

pub static COMPUTER_SCHEMA: Schema = Schema {
    name: "computer",
    fields: &[
        FieldSpec::required("label", FieldKind::Str),
        FieldSpec::required("setup", FieldKind::Object(&COMPUTER_SETUP_SCHEMA)),
        FieldSpec::optional("configure", FieldKind::Keyed(&TRANSPORTS)),
        FieldSpec::optional("codes", FieldKind::List(&CODE_SCHEMA)),
    ],
};

/// Root of a registry file.
pub static REGISTRY_SCHEMA: Schema = Schema {
    name: "registry",
    fields: &[
        FieldSpec::required("computers", FieldKind::List(&COMPUTER_SCHEMA)),
        FieldSpec::optional("codes", FieldKind::List(&CODE_SCHEMA)),
    ],
};
