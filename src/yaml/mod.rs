//! Shape-checked access to loosely typed YAML frontmatter.
//!
//! Frontmatter is an open mapping whose values can be any YAML shape. Every
//! read goes through an accessor that either returns the expected shape or a
//! [`ShapeError`]; the lenient variants recover a wrong shape as an empty
//! value and log a warning, so one malformed section never aborts the merge of
//! unrelated sections.

pub mod error_position;

use serde_yaml::{Mapping, Value};
use thiserror::Error;

pub use error_position::{YamlErrorPosition, normalize_yaml_error, normalize_yaml_message};

/// A frontmatter section had a different YAML shape than required.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{section}' must be {expected}, found {found}")]
pub struct ShapeError {
    /// Name of the section (frontmatter key)
    pub section: String,
    /// Shape that was required
    pub expected: &'static str,
    /// Shape that was found
    pub found: &'static str,
}

impl ShapeError {
    fn new(section: &str, expected: &'static str, found: &Value) -> Self {
        Self {
            section: section.to_string(),
            expected,
            found: kind_name(found),
        }
    }
}

/// Human-readable name of a value's shape.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Require a mapping.
pub fn expect_mapping<'a>(section: &str, value: &'a Value) -> Result<&'a Mapping, ShapeError> {
    value.as_mapping().ok_or_else(|| ShapeError::new(section, "a mapping", value))
}

/// Require a sequence.
pub fn expect_sequence<'a>(section: &str, value: &'a Value) -> Result<&'a [Value], ShapeError> {
    value
        .as_sequence()
        .map(Vec::as_slice)
        .ok_or_else(|| ShapeError::new(section, "a sequence", value))
}

/// Read `key` from `map` as a mapping, recovering a wrong shape as empty.
///
/// A missing key or explicit `null` is an empty mapping without a warning.
pub fn lenient_mapping(origin: &str, map: &Mapping, key: &str) -> Mapping {
    match map.get(key) {
        None | Some(Value::Null) => Mapping::new(),
        Some(value) => match expect_mapping(key, value) {
            Ok(mapping) => mapping.clone(),
            Err(err) => {
                tracing::warn!("Ignoring malformed section in {origin}: {err}");
                Mapping::new()
            }
        },
    }
}

/// Read `key` from `map` as a sequence, recovering a wrong shape as empty.
pub fn lenient_sequence(origin: &str, map: &Mapping, key: &str) -> Vec<Value> {
    match map.get(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => match expect_sequence(key, value) {
            Ok(items) => items.to_vec(),
            Err(err) => {
                tracing::warn!("Ignoring malformed section in {origin}: {err}");
                Vec::new()
            }
        },
    }
}

/// Render a scalar key for messages; non-scalars fall back to YAML text.
pub fn key_to_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other).unwrap_or_default().trim_end().to_string(),
    }
}
