//! Template variable substitution for registry documents.
//!
//! Registry files may contain `{{ variable }}` placeholders, for example a
//! username or a project account that differs between operators. Rendering is
//! strict: a placeholder with no value is an error rather than an empty
//! string.
//!
//! Whole documents are rendered by serializing them to JSON text, rendering
//! the text, and parsing the result back. Substituted values are escaped as
//! JSON string content, so a value containing quotes cannot break the
//! document.
//!
//! # Example
//!
//! ```
//! use code_registry::registry::template::{render_str, undeclared_variables, TemplateVars};
//!
//! let text = "ssh {{ user }}@{{host}}";
//! let names = undeclared_variables(text).unwrap();
//! assert_eq!(names.len(), 2);
//!
//! let mut vars = TemplateVars::new();
//! vars.insert("user".into(), "alice".into());
//! vars.insert("host".into(), "daint".into());
//! assert_eq!(render_str(text, &vars).unwrap(), "ssh alice@daint");
//! ```

use crate::error::{RegistryError, Result};
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// Substitution values keyed by variable name.
pub type TemplateVars = BTreeMap<String, String>;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(.*?)\}\}").expect("placeholder pattern is valid"));

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// A segment of a template string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Variable reference: {{ name }}
    Variable(String),
}

/// Parse a string containing `{{ name }}` placeholders.
///
/// # Errors
///
/// Returns `Template` if a `{{` is never closed or a placeholder holds
/// anything other than a variable name.
pub fn parse_template(input: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(input) {
        let whole = caps.get(0).expect("group 0 always matches");
        push_literal(&mut segments, &input[last..whole.start()])?;

        let name = caps[1].trim();
        if !IDENTIFIER.is_match(name) {
            return Err(RegistryError::Template {
                message: format!("unsupported placeholder '{}'", whole.as_str()),
            });
        }
        segments.push(Segment::Variable(name.to_string()));
        last = whole.end();
    }

    push_literal(&mut segments, &input[last..])?;
    Ok(segments)
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) -> Result<()> {
    if let Some(pos) = text.find("{{") {
        let snippet: String = text[pos..].chars().take(20).collect();
        return Err(RegistryError::Template {
            message: format!("unterminated placeholder near '{}'", snippet),
        });
    }
    if !text.is_empty() {
        segments.push(Segment::Literal(text.to_string()));
    }
    Ok(())
}

/// Variable names a template needs before it can be rendered.
///
/// This is the query behind interactive prompting: callers ask for every
/// name, collect values, then render.
pub fn undeclared_variables(input: &str) -> Result<BTreeSet<String>> {
    Ok(parse_template(input)?
        .into_iter()
        .filter_map(|seg| match seg {
            Segment::Variable(name) => Some(name),
            Segment::Literal(_) => None,
        })
        .collect())
}

/// Variable names used anywhere inside a nested document.
pub fn document_variables(document: &Value) -> Result<BTreeSet<String>> {
    undeclared_variables(&serde_json::to_string(document)?)
}

/// Render a template string, failing on any variable without a value.
pub fn render_str(input: &str, vars: &TemplateVars) -> Result<String> {
    render_with(input, vars, |value| Ok(value.to_string()))
}

fn render_with<F>(input: &str, vars: &TemplateVars, escape: F) -> Result<String>
where
    F: Fn(&str) -> Result<String>,
{
    let mut result = String::with_capacity(input.len());

    for segment in parse_template(input)? {
        match segment {
            Segment::Literal(text) => result.push_str(&text),
            Segment::Variable(name) => {
                let value = vars.get(&name).ok_or_else(|| RegistryError::Template {
                    message: format!("'{}' is undefined", name),
                })?;
                result.push_str(&escape(value)?);
            }
        }
    }

    Ok(result)
}

/// Replace template variables anywhere in a JSON-serializable document.
///
/// Rendering happens even without variables, so a document that still needs
/// values is reported instead of passing through with placeholders intact.
pub fn replace_template_vars(document: &Value, vars: Option<&TemplateVars>) -> Result<Value> {
    let empty = TemplateVars::new();
    let vars = vars.unwrap_or(&empty);

    let text = serde_json::to_string(document)?;
    let rendered = render_with(&text, vars, json_escape)?;

    Ok(serde_json::from_str(&rendered)?)
}

/// Escape a value for insertion inside a JSON string literal.
fn json_escape(value: &str) -> Result<String> {
    let quoted = serde_json::to_string(value)?;
    Ok(quoted[1..quoted.len() - 1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> TemplateVars {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parse_literal_only() {
        let result = parse_template("hello world").unwrap();
        assert_eq!(result, vec![Segment::Literal("hello world".to_string())]);
    }

    #[test]
    fn parse_variable_with_surrounding_text() {
        let result = parse_template("/scratch/{{ user }}/aiida").unwrap();
        assert_eq!(
            result,
            vec![
                Segment::Literal("/scratch/".to_string()),
                Segment::Variable("user".to_string()),
                Segment::Literal("/aiida".to_string()),
            ]
        );
    }

    #[test]
    fn whitespace_inside_braces_is_optional() {
        let names = undeclared_variables("{{a}} {{  b  }}").unwrap();
        assert_eq!(names, BTreeSet::from(["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn repeated_variables_are_reported_once() {
        let names = undeclared_variables("{{ user }}-{{ user }}").unwrap();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn unterminated_placeholder_is_an_error() {
        let result = parse_template("hello {{ user");
        assert!(matches!(result, Err(RegistryError::Template { .. })));
    }

    #[test]
    fn expressions_are_rejected() {
        let result = parse_template("{{ user | upper }}");
        assert!(matches!(result, Err(RegistryError::Template { .. })));
    }

    #[test]
    fn render_missing_variable_fails() {
        let err = render_str("{{ user }}", &TemplateVars::new()).unwrap_err();
        assert!(err.to_string().contains("user"));
    }

    #[test]
    fn render_substitutes_values() {
        let out = render_str("{{ user }}", &vars(&[("user", "alice")])).unwrap();
        assert_eq!(out, "alice");
    }

    #[test]
    fn document_without_placeholders_is_identity() {
        let doc = json!({"computers": [{"label": "localhost"}], "n": 4});
        assert_eq!(replace_template_vars(&doc, None).unwrap(), doc);
    }

    #[test]
    fn document_with_placeholder_and_no_vars_fails() {
        let doc = json!({"setup": {"work_dir": "/scratch/{{ user }}"}});
        let result = replace_template_vars(&doc, None);
        assert!(matches!(result, Err(RegistryError::Template { .. })));
    }

    #[test]
    fn document_values_are_substituted_in_place() {
        let doc = json!({"setup": {"work_dir": "/scratch/{{ user }}", "hostname": "h"}});
        let out = replace_template_vars(&doc, Some(&vars(&[("user", "alice")]))).unwrap();
        assert_eq!(out["setup"]["work_dir"], "/scratch/alice");
        assert_eq!(out["setup"]["hostname"], "h");
    }

    #[test]
    fn quotes_in_values_do_not_break_documents() {
        let doc = json!({"prepend_text": "echo {{ msg }}"});
        let out = replace_template_vars(&doc, Some(&vars(&[("msg", "say \"hi\"\\n")]))).unwrap();
        assert_eq!(out["prepend_text"], "echo say \"hi\"\\n");
    }

    #[test]
    fn document_variables_walks_nested_values() {
        let doc = json!({"a": ["{{ x }}", {"b": "{{ y }}"}]});
        let names = document_variables(&doc).unwrap();
        assert_eq!(names, BTreeSet::from(["x".to_string(), "y".to_string()]));
    }
}
