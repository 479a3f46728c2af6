//! Declarative schema validation for registry documents.
//!
//! A [`Schema`] is a static table of [`FieldSpec`]s. [`validate`] walks a
//! decoded document against it, rejecting missing required keys, values of
//! the wrong type, and keys the schema does not know about. Optional fields
//! with a default are filled in on the way, so the returned value is the
//! coerced document.
//!
//! # Example
//!
//! ```
//! use code_registry::registry::schema::CODE_SCHEMA;
//! use code_registry::registry::validator::validate;
//! use serde_json::json;
//!
//! let code = validate(&CODE_SCHEMA, &json!({"input_plugin": "core.arithmetic.add"})).unwrap();
//! assert_eq!(code["use_double_quotes"], false);
//! ```

use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Type a field value must have.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A string
    Str,
    /// A boolean
    Bool,
    /// An integer
    Int,
    /// An integer or a float
    Number,
    /// An integer or null
    NullableInt,
    /// A free-form mapping
    Map,
    /// A nested document
    Object(&'static Schema),
    /// A sequence of nested documents
    List(&'static Schema),
    /// A mapping whose keys each select their own nested schema
    Keyed(&'static [(&'static str, &'static Schema)]),
}

/// Fallback value for an absent optional field.
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Bool(bool),
    Null,
}

impl DefaultValue {
    fn to_value(self) -> Value {
        match self {
            DefaultValue::Bool(b) => Value::Bool(b),
            DefaultValue::Null => Value::Null,
        }
    }
}

/// Whether a field must be present.
#[derive(Debug, Clone, Copy)]
pub enum Presence {
    Required,
    Optional,
    Default(DefaultValue),
}

/// A single field of a schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Required,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Optional,
        }
    }

    pub const fn with_default(name: &'static str, kind: FieldKind, default: DefaultValue) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Default(default),
        }
    }
}

/// A named document shape.
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A document did not match its schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at '{path}'")]
pub struct SchemaError {
    /// Dotted path of the offending field, e.g. `computers[0].setup.hostname`
    pub path: String,
    pub kind: SchemaErrorKind,
}

/// What went wrong during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaErrorKind {
    MissingKey,
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    UnexpectedKey,
    UnknownTransport,
    LabelMismatch {
        expected: String,
    },
}

impl fmt::Display for SchemaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaErrorKind::MissingKey => write!(f, "required key missing"),
            SchemaErrorKind::WrongType { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            SchemaErrorKind::UnexpectedKey => write!(f, "unexpected key"),
            SchemaErrorKind::UnknownTransport => write!(f, "unknown transport"),
            SchemaErrorKind::LabelMismatch { expected } => {
                write!(f, "label must match computer label '{}'", expected)
            }
        }
    }
}

/// Validate a document against a schema and return it with defaults applied.
pub fn validate(schema: &Schema, value: &Value) -> Result<Value, SchemaError> {
    validate_at(schema, value, "")
}

fn validate_at(schema: &Schema, value: &Value, path: &str) -> Result<Value, SchemaError> {
    let object = value.as_object().ok_or_else(|| SchemaError {
        path: display_path(path, schema.name),
        kind: wrong_type("mapping", value),
    })?;

    let mut out = Map::new();

    for (key, field_value) in object {
        let field_path = join(path, key);
        let spec = schema.field(key).ok_or_else(|| SchemaError {
            path: field_path.clone(),
            kind: SchemaErrorKind::UnexpectedKey,
        })?;
        out.insert(key.clone(), check_kind(spec.kind, field_value, &field_path)?);
    }

    for spec in schema.fields {
        if out.contains_key(spec.name) {
            continue;
        }
        match spec.presence {
            Presence::Required => {
                return Err(SchemaError {
                    path: join(path, spec.name),
                    kind: SchemaErrorKind::MissingKey,
                })
            }
            Presence::Default(default) => {
                out.insert(spec.name.to_string(), default.to_value());
            }
            Presence::Optional => {}
        }
    }

    Ok(Value::Object(out))
}

fn check_kind(kind: FieldKind, value: &Value, path: &str) -> Result<Value, SchemaError> {
    let mismatch = |expected: &'static str| SchemaError {
        path: path.to_string(),
        kind: wrong_type(expected, value),
    };

    match kind {
        FieldKind::Str if value.is_string() => Ok(value.clone()),
        FieldKind::Str => Err(mismatch("string")),
        FieldKind::Bool if value.is_boolean() => Ok(value.clone()),
        FieldKind::Bool => Err(mismatch("boolean")),
        FieldKind::Int if is_int(value) => Ok(value.clone()),
        FieldKind::Int => Err(mismatch("integer")),
        FieldKind::Number if value.is_number() => Ok(value.clone()),
        FieldKind::Number => Err(mismatch("number")),
        FieldKind::NullableInt if value.is_null() || is_int(value) => Ok(value.clone()),
        FieldKind::NullableInt => Err(mismatch("integer or null")),
        FieldKind::Map if value.is_object() => Ok(value.clone()),
        FieldKind::Map => Err(mismatch("mapping")),
        FieldKind::Object(schema) => validate_at(schema, value, path),
        FieldKind::List(schema) => {
            let items = value.as_array().ok_or_else(|| mismatch("sequence"))?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| validate_at(schema, item, &format!("{}[{}]", path, i)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        FieldKind::Keyed(choices) => {
            let object = value.as_object().ok_or_else(|| mismatch("mapping"))?;
            let mut out = Map::new();
            for (key, nested) in object {
                let nested_path = format!("{}[\"{}\"]", path, key);
                let (_, schema) =
                    choices
                        .iter()
                        .find(|(k, _)| *k == key.as_str())
                        .ok_or_else(|| SchemaError {
                            path: nested_path.clone(),
                            kind: SchemaErrorKind::UnknownTransport,
                        })?;
                out.insert(key.clone(), validate_at(schema, nested, &nested_path)?);
            }
            Ok(Value::Object(out))
        }
    }
}

fn is_int(value: &Value) -> bool {
    value.is_i64() || value.is_u64()
}

fn wrong_type(expected: &'static str, found: &Value) -> SchemaErrorKind {
    SchemaErrorKind::WrongType {
        expected,
        found: type_name(found),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn display_path(path: &str, schema_name: &str) -> String {
    if path.is_empty() {
        format!("<{}>", schema_name)
    } else {
        path.to_string()
    }
}
