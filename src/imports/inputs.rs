//! Parameterised imports.
//!
//! An imported file may declare inputs in its frontmatter:
//!
//! ```yaml
//! inputs:
//!   depth:
//!     default: 1
//!   label:
//!     required: true
//! ```
//!
//! Values are substituted into `${{ github.aw.inputs.<name> }}` expressions
//! of the imported file's text before it is parsed.

use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;

use super::error::ImportFailure;
use crate::yaml::{key_to_string, lenient_mapping};

/// One declared input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputDeclaration {
    /// Value used when the importer provides none
    pub default: Option<Value>,
    /// The importer must provide a value
    pub required: bool,
}

/// Read the `inputs:` declarations of a frontmatter mapping.
///
/// A scalar declaration is shorthand for its default value.
pub fn declared_inputs(origin: &str, frontmatter: &Mapping) -> BTreeMap<String, InputDeclaration> {
    lenient_mapping(origin, frontmatter, "inputs")
        .iter()
        .map(|(name, declaration)| {
            let declaration = match declaration {
                Value::Mapping(fields) => InputDeclaration {
                    default: fields.get("default").filter(|v| !v.is_null()).cloned(),
                    required: fields.get("required").and_then(Value::as_bool).unwrap_or(false),
                },
                Value::Null => InputDeclaration::default(),
                scalar => InputDeclaration {
                    default: Some(scalar.clone()),
                    required: false,
                },
            };
            (key_to_string(name), declaration)
        })
        .collect()
}

/// Combine provided values with declared defaults.
///
/// Provided values win; undeclared provided values are kept. A required
/// input with neither is a failure.
pub fn effective_inputs(
    origin: &str,
    declared: &BTreeMap<String, InputDeclaration>,
    provided: &Mapping,
) -> Result<BTreeMap<String, Value>, ImportFailure> {
    let mut values: BTreeMap<String, Value> =
        provided.iter().map(|(k, v)| (key_to_string(k), v.clone())).collect();

    for (name, declaration) in declared {
        if values.contains_key(name) {
            continue;
        }
        match &declaration.default {
            Some(default) => {
                values.insert(name.clone(), default.clone());
            }
            None if declaration.required => {
                return Err(ImportFailure::MissingInput {
                    path: origin.to_string(),
                    name: name.clone(),
                });
            }
            None => {}
        }
    }

    Ok(values)
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Replace `${{ github.aw.inputs.<name> }}` expressions in `text`.
///
/// Expressions naming unknown inputs are left untouched.
pub fn substitute_inputs<'a>(text: &'a str, values: &BTreeMap<String, Value>) -> Cow<'a, str> {
    if values.is_empty() || !text.contains("github.aw.inputs.") {
        return Cow::Borrowed(text);
    }
    let Ok(expression) = Regex::new(r"\$\{\{\s*github\.aw\.inputs\.([A-Za-z0-9_-]+)\s*\}\}") else {
        return Cow::Borrowed(text);
    };

    expression.replace_all(text, |caps: &regex::Captures<'_>| match values.get(&caps[1]) {
        Some(value) => render_value(value),
        None => caps[0].to_string(),
    })
}
