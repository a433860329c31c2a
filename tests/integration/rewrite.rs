//! In-place frontmatter edits of workflow files.

use anyhow::{Result, bail};
use serde_yaml::Value;
use wfimport::markdown::{WorkflowDocument, update_frontmatter};
use wfimport::test_utils::WorkflowTree;

const BODY: &str = "# Triage\n\n{{#import shared/style.md}}\n\nTrailing text without newline";

#[test]
fn test_add_import_then_resolve() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_workflow("main.md", "on: issues", BODY)?;
    tree.write("shared/style.md", "Style\n")?;
    tree.write("shared/tools.md", "---\ntools:\n  bash: {}\n---\n")?;

    update_frontmatter(&tree.file_path("main.md"), |frontmatter| {
        frontmatter.insert(
            Value::from("imports"),
            serde_yaml::from_str("[shared/tools.md]")?,
        );
        Ok(())
    })?;

    let content = tree.read("main.md")?;
    assert!(content.ends_with(BODY));
    let document = WorkflowDocument::parse("main.md", content.as_str())?;
    assert!(document.frontmatter.contains_key("on"));

    let result = tree.resolve("main.md")?;
    assert_eq!(result.imported_files, vec!["shared/style.md", "shared/tools.md"]);
    assert!(result.merged_tools.contains_key("bash"));
    Ok(())
}

#[test]
fn test_repeated_rewrite_is_stable() -> Result<()> {
    let tree = WorkflowTree::new()?;
    let path = tree.write_workflow("main.md", "on: issues\nengine: copilot", BODY)?;

    update_frontmatter(&path, |_| Ok(()))?;
    let first = tree.read("main.md")?;
    update_frontmatter(&path, |_| Ok(()))?;
    assert_eq!(tree.read("main.md")?, first);
    assert!(first.ends_with(BODY));
    Ok(())
}

#[test]
fn test_failed_edit_leaves_file_untouched() -> Result<()> {
    let tree = WorkflowTree::new()?;
    let path = tree.write_workflow("main.md", "on:   issues  # spacing kept", BODY)?;
    let before = tree.read("main.md")?;

    let outcome = update_frontmatter(&path, |frontmatter| {
        frontmatter.clear();
        bail!("refusing")
    });
    assert!(outcome.is_err());
    assert_eq!(tree.read("main.md")?, before);
    Ok(())
}

#[test]
fn test_document_without_frontmatter_gains_one() -> Result<()> {
    let tree = WorkflowTree::new()?;
    let path = tree.write("plain.md", "Just a body\n")?;

    update_frontmatter(&path, |frontmatter| {
        frontmatter.insert(Value::from("engine"), Value::from("claude"));
        Ok(())
    })?;
    assert_eq!(tree.read("plain.md")?, "---\nengine: claude\n---\nJust a body\n");
    Ok(())
}
