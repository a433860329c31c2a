//! Recover a document position from a YAML parse error.
//!
//! YAML engines report positions relative to the text they were handed, which
//! for a workflow is only the frontmatter block. This module recovers
//! `(line, column, message)` from the several error shapes in circulation and
//! shifts the line so it points into the whole document.
//!
//! A column of `0` means the parser did not report one. Callers must not
//! render it as column 1.

use regex::Regex;

/// A normalised YAML error position in whole-document coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlErrorPosition {
    /// 1-based document line, 0 when unknown
    pub line: usize,
    /// 1-based column, 0 when unknown
    pub column: usize,
    /// The error message without position decoration
    pub message: String,
}

impl YamlErrorPosition {
    fn unlocalized(message: impl Into<String>) -> Self {
        Self {
            line: 0,
            column: 0,
            message: message.into(),
        }
    }

    /// Whether a line number was recovered.
    pub fn is_located(&self) -> bool {
        self.line > 0
    }
}

/// Normalise a YAML error.
///
/// `frontmatter_line_offset` is the 1-based document line on which the
/// frontmatter's first content line sits. A [`serde_yaml::Error`] with a
/// location is used directly; every other error goes through
/// [`normalize_yaml_message`].
pub fn normalize_yaml_error(
    err: &(dyn std::error::Error + 'static),
    frontmatter_line_offset: usize,
) -> YamlErrorPosition {
    if let Some(yaml_error) = err.downcast_ref::<serde_yaml::Error>()
        && let Some(location) = yaml_error.location()
    {
        let message = strip_serde_yaml_locations(&yaml_error.to_string());
        return localize(location.line(), location.column(), frontmatter_line_offset, message);
    }

    normalize_yaml_message(&err.to_string(), frontmatter_line_offset)
}

/// Normalise a YAML error from its text alone.
///
/// Shapes are tried in order and the first match wins:
/// 1. `[line:column] message`
/// 2. `yaml: line X: column Y: message`
/// 3. `yaml: line X: message` (column stays 0)
/// 4. `yaml: unmarshal errors: ... line X: message` (first entry only)
/// 5. `message at line X column Y` as printed by serde_yaml
///
/// Otherwise the raw text is returned with line and column 0.
pub fn normalize_yaml_message(text: &str, frontmatter_line_offset: usize) -> YamlErrorPosition {
    if let Ok(bracketed) = Regex::new(r"\[(\d+):(\d+)\]\s*([^\n]*)")
        && let Some(caps) = bracketed.captures(text)
        && let (Some(line), Some(column)) = (parse_capture(&caps, 1), parse_capture(&caps, 2))
    {
        let message = caps.get(3).map(|m| m.as_str().trim()).unwrap_or_default();
        return localize(line, column, frontmatter_line_offset, message.to_string());
    }

    if let Ok(line_column) = Regex::new(r"yaml: line (\d+): column (\d+): ([^\n]*)")
        && let Some(caps) = line_column.captures(text)
        && let (Some(line), Some(column)) = (parse_capture(&caps, 1), parse_capture(&caps, 2))
    {
        return YamlErrorPosition {
            line: shift(line, frontmatter_line_offset),
            column,
            message: caps[3].trim().to_string(),
        };
    }

    if let Ok(line_only) = Regex::new(r"yaml: line (\d+): ([^\n]*)")
        && let Some(caps) = line_only.captures(text)
        && let Some(line) = parse_capture(&caps, 1)
    {
        return YamlErrorPosition {
            line: shift(line, frontmatter_line_offset),
            column: 0,
            message: caps[2].trim().to_string(),
        };
    }

    if text.contains("yaml: unmarshal errors:")
        && let Ok(embedded) = Regex::new(r"line (\d+): ([^\n]*)")
        && let Some(caps) = embedded.captures(text)
        && let Some(line) = parse_capture(&caps, 1)
    {
        return YamlErrorPosition {
            line: shift(line, frontmatter_line_offset),
            column: 0,
            message: caps[2].trim().to_string(),
        };
    }

    if let Ok(serde_shape) = Regex::new(r"at line (\d+) column (\d+)")
        && let Some(caps) = serde_shape.captures(text)
        && let (Some(line), Some(column)) = (parse_capture(&caps, 1), parse_capture(&caps, 2))
    {
        return localize(line, column, frontmatter_line_offset, strip_serde_yaml_locations(text));
    }

    YamlErrorPosition::unlocalized(text.trim())
}

fn parse_capture(caps: &regex::Captures<'_>, index: usize) -> Option<usize> {
    caps.get(index)?.as_str().parse().ok()
}

fn shift(line: usize, frontmatter_line_offset: usize) -> usize {
    line + frontmatter_line_offset.saturating_sub(1)
}

/// Shift a `(line, column)` pair into document coordinates.
///
/// Engines emit `1:1` when they cannot localise a fault; a shifted position
/// that is still on the first frontmatter line with column <= 1 is treated as
/// no position at all.
fn localize(
    line: usize,
    column: usize,
    frontmatter_line_offset: usize,
    message: String,
) -> YamlErrorPosition {
    let document_line = shift(line, frontmatter_line_offset);
    if document_line <= frontmatter_line_offset && column <= 1 {
        return YamlErrorPosition::unlocalized(message);
    }
    YamlErrorPosition {
        line: document_line,
        column,
        message,
    }
}

fn strip_serde_yaml_locations(text: &str) -> String {
    match Regex::new(r" at line \d+ column \d+") {
        Ok(re) => re.replace_all(text, "").trim().to_string(),
        Err(_) => text.trim().to_string(),
    }
}
