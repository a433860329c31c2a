//! Directive and section parsing through the public API.

use wfimport::markdown::{extract_section, parse_import_directive, scan_import_directives, split_section};

#[test]
fn test_directive_forms() {
    let cases = [
        ("{{#import shared/a.md}}", "shared/a.md", false, false),
        ("{{#import? shared/a.md}}", "shared/a.md", true, false),
        ("{{#import: shared/a.md}}", "shared/a.md", false, false),
        ("@include shared/a.md", "shared/a.md", false, true),
        ("@import? shared/a.md", "shared/a.md", true, true),
    ];

    for (line, path, optional, legacy) in cases {
        let directive = parse_import_directive(line).unwrap_or_else(|| panic!("no match: {line}"));
        assert_eq!(directive.path, path, "{line}");
        assert_eq!(directive.is_optional, optional, "{line}");
        assert_eq!(directive.is_legacy, legacy, "{line}");
    }

    assert!(parse_import_directive("see {{#import a.md}} inline").is_none());
    assert!(parse_import_directive("@mention someone").is_none());
}

#[test]
fn test_scan_skips_code_fences() {
    let body = "{{#import a.md}}\n~~~\n{{#import b.md}}\n~~~\n```yaml\n@include c.md\n```\n@include d.md\n";
    let found: Vec<_> = scan_import_directives(body)
        .into_iter()
        .map(|d| (d.line, d.directive.path))
        .collect();
    assert_eq!(found, vec![(1, "a.md".to_string()), (8, "d.md".to_string())]);
}

#[test]
fn test_section_slices() {
    let body = "# Guide\n\n## Setup\ninstall\n### Details\nmore\n## Usage\nrun\n";
    assert_eq!(
        extract_section(body, "setup").as_deref(),
        Some("## Setup\ninstall\n### Details\nmore\n")
    );
    assert_eq!(extract_section(body, "Usage").as_deref(), Some("## Usage\nrun\n"));
    assert!(extract_section(body, "Missing").is_none());

    assert_eq!(split_section("a.md#Usage"), ("a.md", Some("Usage")));
    assert_eq!(split_section("a.md"), ("a.md", None));
}
