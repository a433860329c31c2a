//! Merge policy across imported files.

use anyhow::Result;
use serde_yaml::Value;
use wfimport::test_utils::WorkflowTree;

fn keys(map: &serde_yaml::Mapping) -> Vec<&str> {
    map.keys().filter_map(Value::as_str).collect()
}

#[test]
fn test_sections_merge_in_processing_order() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_importer("main.md", &["a.md", "b.md"])?;
    tree.write_workflow(
        "a.md",
        "engine: copilot\ntools:\n  bash: [ls]\n  github: {}\nsteps:\n  - run: echo a\nnetwork:\n  allowed: [defaults]",
        "From A\n",
    )?;
    tree.write_workflow(
        "b.md",
        "engine: claude\ntools:\n  bash: [cat]\n  edit: {}\nsteps:\n  - run: echo b\npost-steps:\n  - run: cleanup",
        "From B\n",
    )?;

    let result = tree.resolve("main.md")?;
    assert_eq!(result.imported_files, vec!["a.md", "b.md"]);
    assert_eq!(keys(&result.merged_tools), vec!["bash", "github", "edit"]);
    assert_eq!(result.merged_tools["bash"], serde_yaml::from_str::<Value>("[cat]")?);
    assert_eq!(result.merged_engine, Some(Value::from("claude")));
    assert_eq!(result.merged_steps.len(), 2);
    assert_eq!(result.merged_steps[0]["run"], Value::from("echo a"));
    assert_eq!(result.merged_post_steps.len(), 1);
    assert_eq!(keys(&result.merged_network), vec!["allowed"]);
    assert_eq!(result.merged_markdown, "From A\n\nFrom B");
    Ok(())
}

#[test]
fn test_importing_documents_own_sections_are_not_merged() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_workflow("main.md", "imports: [a.md]\ntools:\n  root-only: {}", "# Main\n")?;
    tree.write_workflow("a.md", "tools:\n  shared: {}", "")?;

    let result = tree.resolve("main.md")?;
    assert_eq!(keys(&result.merged_tools), vec!["shared"]);
    assert!(result.merged_markdown.is_empty());
    Ok(())
}

#[test]
fn test_wrong_shaped_section_is_skipped() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_importer("main.md", &["a.md"])?;
    tree.write_workflow("a.md", "tools: not-a-map\nsteps:\n  - run: ok", "")?;

    let result = tree.resolve("main.md")?;
    assert!(result.merged_tools.is_empty());
    assert_eq!(result.merged_steps.len(), 1);
    Ok(())
}

#[test]
fn test_yaml_workflow_import_contributes_jobs_only() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_importer("main.md", &["ci.yml"])?;
    tree.write(
        "ci.yml",
        "name: CI\ntools:\n  ignored: {}\njobs:\n  build:\n    runs-on: ubuntu-latest\n",
    )?;

    let result = tree.resolve("main.md")?;
    assert_eq!(result.imported_files, vec!["ci.yml"]);
    assert_eq!(keys(&result.merged_jobs), vec!["build"]);
    assert!(result.merged_tools.is_empty());
    assert!(result.merged_markdown.is_empty());
    Ok(())
}

#[test]
fn test_optional_missing_import_is_skipped() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_workflow(
        "main.md",
        "imports:\n  - path: missing.md\n    optional: true\n  - present.md",
        "# Main\n\n{{#import? also-missing.md}}\n@include? gone.md\n",
    )?;
    tree.write("present.md", "Present\n")?;

    let result = tree.resolve("main.md")?;
    assert_eq!(result.imported_files, vec!["present.md"]);
    Ok(())
}

#[test]
fn test_optional_import_with_bad_yaml_still_fails() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_workflow("main.md", "imports:\n  - path: bad.md\n    optional: true", "")?;
    tree.write("bad.md", "---\ntools: [unclosed\n---\n")?;

    let err = tree.resolve("main.md").unwrap_err();
    assert!(err.to_string().contains("bad.md"), "{err}");
    Ok(())
}

#[test]
fn test_inputs_are_substituted() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_workflow(
        "main.md",
        "imports:\n  - path: shared/review.md\n    inputs:\n      depth: 3",
        "# Main\n",
    )?;
    tree.write_workflow(
        "shared/review.md",
        "inputs:\n  depth:\n    default: 1\n  tone: friendly",
        "Review ${{ github.aw.inputs.depth }} levels deep, tone ${{github.aw.inputs.tone}}.\n",
    )?;

    let result = tree.resolve("main.md")?;
    assert_eq!(result.merged_markdown, "Review 3 levels deep, tone friendly.");
    assert_eq!(
        result.import_inputs["shared/review.md"].get("depth"),
        Some(&Value::from(3))
    );
    Ok(())
}

#[test]
fn test_missing_required_input_fails() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_importer("main.md", &["shared/review.md"])?;
    tree.write_workflow(
        "shared/review.md",
        "inputs:\n  target:\n    required: true",
        "Review ${{ github.aw.inputs.target }}\n",
    )?;

    let err = tree.resolve("main.md").unwrap_err();
    assert!(err.to_string().contains("missing required input 'target'"), "{err}");
    Ok(())
}
