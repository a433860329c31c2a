//! Import entries, remote specs and error classification.

use serde_yaml::Value;
use wfimport::imports::{WorkflowSpec, classify_cause, is_remote_path, locate_import, parse_imports};

#[test]
fn test_parse_mixed_entries() {
    let value: Value = serde_yaml::from_str(
        "- shared/a.md\n- '{{#import? shared/b.md}}'\n- path: shared/c.md#Tools\n  inputs:\n    depth: 2\n",
    )
    .unwrap();

    let specs = parse_imports(Some(&value)).unwrap();
    assert_eq!(specs.len(), 3);
    assert_eq!(specs[0].path, "shared/a.md");
    assert!(!specs[0].optional);
    assert_eq!(specs[1].path, "shared/b.md");
    assert!(specs[1].optional);
    assert_eq!(specs[2].file_path(), "shared/c.md");
    assert_eq!(specs[2].section(), Some("Tools"));
    assert_eq!(specs[2].inputs.get("depth"), Some(&Value::from(2)));

    assert!(parse_imports(None).unwrap().is_empty());
    assert!(parse_imports(Some(&Value::from("a.md"))).is_err());
}

#[test]
fn test_remote_specs() {
    assert!(is_remote_path("octo/tools/a.md@v1"));
    assert!(!is_remote_path("./local@file.md"));
    assert!(!is_remote_path("shared/a.md"));

    let spec = WorkflowSpec::parse("octo/tools/agents/shared/a.md@main").unwrap();
    assert_eq!(spec.sibling("../b.md").identity(), "octo/tools/agents/b.md@main");
    assert_eq!(spec.sibling("./c.md").identity(), "octo/tools/agents/shared/c.md@main");
    assert_eq!(spec.to_string(), "octo/tools/agents/shared/a.md@main");

    for invalid in ["octo/tools/a.md", "octo/tools/a.md@", "octo/a.md@v1"] {
        let err = WorkflowSpec::parse(invalid).unwrap_err();
        assert!(err.to_string().contains("invalid workflowspec"), "{invalid}: {err}");
    }
}

#[test]
fn test_classification_priority() {
    assert_eq!(classify_cause("file not found: x"), Some("import file not found"));
    assert_eq!(
        classify_cause("failed to download x: file not found"),
        Some("import file not found")
    );
    assert_eq!(classify_cause("failed to download x"), Some("failed to download import file"));
    assert_eq!(
        classify_cause("failed to resolve ref 'v9' for octo/tools"),
        Some("failed to resolve import reference")
    );
    assert_eq!(
        classify_cause("invalid workflowspec 'x': missing '@ref'"),
        Some("invalid import specification")
    );
    assert_eq!(classify_cause("import cycle detected: a -> a"), None);
}

#[test]
fn test_locate_import_positions() {
    let raw = "---\nname: x\nimports:\n  - first.md\n  - path: second.md\n---\n";
    assert_eq!(locate_import(raw, "first.md"), (4, 5));
    assert_eq!(locate_import(raw, "second.md"), (5, 11));
    assert_eq!(locate_import(raw, "absent.md"), (3, 1));
    assert_eq!(locate_import("no imports here\n", "a.md"), (1, 1));
}
