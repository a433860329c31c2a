//! Inline import directives in workflow prose.
//!
//! Two syntaxes are recognised, each with an optional marker:
//!
//! - Legacy: `@include path`, `@include? path`, `@import path`, `@import? path`
//! - Current: `{{#import: path}}`, `{{#import?: path}}`, and the colon-free
//!   `{{#import path}}` / `{{#import? path}}`
//!
//! Paths may end in a `#Section` fragment, kept verbatim. A bare keyword
//! without a path is ordinary prose, not a directive.

use regex::Regex;

/// A directive recognised on one line of prose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDirective {
    /// Trimmed import path, including any `#Section` suffix
    pub path: String,
    /// `?` marker present: a missing target is not an error
    pub is_optional: bool,
    /// Written with `@include`/`@import`
    pub is_legacy: bool,
    /// The trimmed input line
    pub original: String,
}

/// Parse a single line; `None` when the line holds no directive.
pub fn parse_import_directive(line: &str) -> Option<ImportDirective> {
    let trimmed = line.trim();

    if let Ok(legacy) = Regex::new(r"^@(?:include|import)(\?)?\s+(\S.*)$")
        && let Some(caps) = legacy.captures(trimmed)
    {
        return Some(ImportDirective {
            path: caps[2].trim().to_string(),
            is_optional: caps.get(1).is_some(),
            is_legacy: true,
            original: trimmed.to_string(),
        });
    }

    if let Ok(current) = Regex::new(r"^\{\{\s*#import(\?)?(?:\s*:\s*|\s+)(\S.*?)\s*\}\}$")
        && let Some(caps) = current.captures(trimmed)
    {
        return Some(ImportDirective {
            path: caps[2].trim().to_string(),
            is_optional: caps.get(1).is_some(),
            is_legacy: false,
            original: trimmed.to_string(),
        });
    }

    None
}

/// A directive together with its 1-based position in the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedDirective {
    /// 1-based line within the scanned text
    pub line: usize,
    /// 1-based character column of the path on the untrimmed line
    pub column: usize,
    /// The directive found on that line
    pub directive: ImportDirective,
}

/// Find every directive in a markdown body, skipping fenced code blocks.
pub fn scan_import_directives(markdown: &str) -> Vec<LocatedDirective> {
    let mut found = Vec::new();
    let mut fence: Option<&str> = None;

    for (index, line) in markdown.lines().enumerate() {
        let trimmed = line.trim_start();
        let marker = if trimmed.starts_with("```") {
            Some("```")
        } else if trimmed.starts_with("~~~") {
            Some("~~~")
        } else {
            None
        };

        match (fence, marker) {
            (None, Some(open)) => {
                fence = Some(open);
                continue;
            }
            (Some(open), Some(close)) if open == close => {
                fence = None;
                continue;
            }
            (Some(_), _) => continue,
            (None, None) => {}
        }

        if let Some(directive) = parse_import_directive(line) {
            let column = line
                .rfind(&directive.path)
                .map_or(1, |offset| line[..offset].chars().count() + 1);
            found.push(LocatedDirective {
                line: index + 1,
                column,
                directive,
            });
        }
    }

    found
}
