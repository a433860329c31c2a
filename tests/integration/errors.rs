//! Positioned diagnostics for failed imports.

use anyhow::Result;
use wfimport::imports::{ImportError, ImportFailure};
use wfimport::markdown::WorkflowDocument;
use wfimport::test_utils::WorkflowTree;

fn resolve_err(tree: &WorkflowTree, relative: &str) -> Result<ImportError> {
    let document = WorkflowDocument::load(&tree.file_path(relative))?;
    Ok(tree.resolver().resolve_document(&document).unwrap_err())
}

#[test]
fn test_missing_import_points_at_entry() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_workflow("main.md", "on: push\nimports:\n  - shared/missing.md", "# Body\n")?;

    let err = resolve_err(&tree, "main.md")?;
    assert_eq!((err.line, err.column), (4, 5));
    assert!(matches!(err.cause, ImportFailure::FileNotFound { .. }));

    let rendered = err.render();
    let header = rendered.lines().next().unwrap();
    assert!(
        header.ends_with("main.md:4:5: error: import file not found: shared/missing.md"),
        "{rendered}"
    );
    assert!(rendered.contains("4 |   - shared/missing.md"), "{rendered}");
    assert!(rendered.contains("  |     ^"), "{rendered}");
    Ok(())
}

#[test]
fn test_similar_file_is_suggested() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_importer("main.md", &["shared/missing.md"])?;
    tree.write("shared/missed.md", "close\n")?;

    let err = resolve_err(&tree, "main.md")?;
    assert_eq!(err.suggestion(), "Did you mean 'missed.md'?");
    Ok(())
}

#[test]
fn test_missing_directive_points_at_body_line() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write("main.md", "---\non: push\n---\n# Body\n\n{{#import nothere.md}}\n")?;

    let err = resolve_err(&tree, "main.md")?;
    assert_eq!((err.line, err.column), (6, 11));
    assert_eq!(err.message(), "import file not found: nothere.md");

    tree.write("indented.md", "# Body\n\n    {{#import missing.md}}\n")?;
    let err = resolve_err(&tree, "indented.md")?;
    assert_eq!((err.line, err.column), (3, 15));
    let rendered = err.render();
    let header = rendered.lines().next().unwrap();
    assert!(header.ends_with("indented.md:3:15: error: import file not found: missing.md"), "{rendered}");
    assert!(rendered.contains(&format!("{} | {}^", " ".repeat(4), " ".repeat(14))), "{rendered}");
    Ok(())
}

#[test]
fn test_nested_failure_points_at_declaring_file() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_importer("main.md", &["shared/a.md"])?;
    tree.write_workflow("shared/a.md", "imports:\n  - gone.md", "")?;

    let err = resolve_err(&tree, "main.md")?;
    assert_eq!(err.file_path, tree.file_path("shared/a.md"));
    assert_eq!(err.import_path, "gone.md");
    assert_eq!((err.line, err.column), (3, 5));
    Ok(())
}

#[test]
fn test_yaml_error_points_into_imported_file() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_importer("main.md", &["shared/bad.md"])?;
    tree.write("shared/bad.md", "---\ntools:\n  bash: [ls\n---\nbody\n")?;

    let err = resolve_err(&tree, "main.md")?;
    let rendered = err.render();
    let header = rendered.lines().next().unwrap();
    assert!(header.contains("bad.md:"), "{rendered}");
    assert!(header.contains("error: failed to parse import file"), "{rendered}");
    Ok(())
}

#[test]
fn test_unclosed_frontmatter_in_import_fails() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_importer("main.md", &["shared/open.md"])?;
    tree.write("shared/open.md", "---\ntools: {}\nno closing delimiter\n")?;

    let err = resolve_err(&tree, "main.md")?;
    assert!(matches!(err.cause, ImportFailure::Yaml { .. }), "{:?}", err.cause);
    Ok(())
}

#[test]
fn test_cycle_points_at_closing_import() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_importer("main.md", &["a.md"])?;
    tree.write_importer("a.md", &["b.md"])?;
    tree.write_importer("b.md", &["a.md"])?;

    let err = resolve_err(&tree, "main.md")?;
    assert_eq!(err.file_path, tree.file_path("b.md"));
    assert!(err.render().contains("error: import cycle detected: a.md -> b.md -> a.md"));
    Ok(())
}

#[test]
fn test_missing_section_is_reported() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_importer("main.md", &["a.md#Missing"])?;
    tree.write("a.md", "# Present\n")?;

    let err = resolve_err(&tree, "main.md")?;
    assert!(matches!(err.cause, ImportFailure::SectionNotFound { .. }));
    assert_eq!(err.message(), "section 'Missing' not found in a.md");
    Ok(())
}

#[test]
fn test_malformed_entry_is_reported() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_workflow("main.md", "imports:\n  - inputs: {}", "")?;

    let err = resolve_err(&tree, "main.md")?;
    assert!(matches!(err.cause, ImportFailure::Malformed { .. }));
    assert!(err.message().starts_with("invalid imports entry"));
    Ok(())
}
