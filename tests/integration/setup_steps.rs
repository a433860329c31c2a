//! The reserved setup-steps workflow import.

use anyhow::Result;
use serde_yaml::Value;
use wfimport::test_utils::WorkflowTree;

fn setup_steps(yaml: &str) -> Vec<Value> {
    serde_yaml::from_str(yaml).unwrap()
}

#[test]
fn test_checkout_is_inserted_when_missing() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_importer("main.md", &["copilot-setup-steps.yml"])?;
    tree.write(
        "copilot-setup-steps.yml",
        "jobs:\n  copilot-setup-steps:\n    runs-on: ubuntu-latest\n    steps:\n      - run: npm ci\n",
    )?;

    let result = tree.resolve("main.md")?;
    let steps = setup_steps(result.copilot_setup_steps.as_deref().unwrap());
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["uses"], Value::from("actions/checkout@v5"));
    assert_eq!(steps[1]["run"], Value::from("npm ci"));
    Ok(())
}

#[test]
fn test_existing_checkout_is_moved_first() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_importer("main.md", &["copilot-setup-steps.yml"])?;
    tree.write(
        "copilot-setup-steps.yml",
        "jobs:\n  copilot-setup-steps:\n    steps:\n      - run: npm ci\n      - uses: actions/checkout@v4\n        with:\n          fetch-depth: 0\n",
    )?;

    let result = tree.resolve("main.md")?;
    let steps = setup_steps(result.copilot_setup_steps.as_deref().unwrap());
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["uses"], Value::from("actions/checkout@v4"));
    assert_eq!(steps[0]["with"]["fetch-depth"], Value::from(0));
    assert_eq!(steps[1]["run"], Value::from("npm ci"));
    Ok(())
}

#[test]
fn test_leading_checkout_is_unchanged() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_importer("main.md", &["copilot-setup-steps.yml"])?;
    tree.write(
        "copilot-setup-steps.yml",
        "jobs:\n  copilot-setup-steps:\n    steps:\n      - uses: actions/checkout@v4\n      - run: make setup\n",
    )?;

    let result = tree.resolve("main.md")?;
    let steps = setup_steps(result.copilot_setup_steps.as_deref().unwrap());
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["uses"], Value::from("actions/checkout@v4"));
    Ok(())
}

#[test]
fn test_setup_steps_stay_out_of_merged_sections() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_importer("main.md", &["copilot-setup-steps.yml", "shared.md"])?;
    tree.write(
        "copilot-setup-steps.yml",
        "jobs:\n  copilot-setup-steps:\n    steps:\n      - run: npm ci\n",
    )?;
    tree.write_workflow("shared.md", "steps:\n  - run: echo shared", "")?;

    let result = tree.resolve("main.md")?;
    assert!(result.imported_files.contains(&"copilot-setup-steps.yml".to_string()));
    assert!(result.merged_jobs.is_empty());
    assert_eq!(result.merged_steps.len(), 1);
    assert_eq!(result.merged_steps[0]["run"], Value::from("echo shared"));
    Ok(())
}

#[test]
fn test_configured_checkout_action_is_used() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_importer("main.md", &["copilot-setup-steps.yaml"])?;
    tree.write("copilot-setup-steps.yaml", "jobs:\n  setup:\n    steps:\n      - run: ./bootstrap\n")?;

    let document = wfimport::markdown::WorkflowDocument::load(&tree.file_path("main.md"))?;
    let result = tree
        .resolver()
        .with_checkout_action("actions/checkout@v4")
        .resolve_document(&document)?;

    let steps = setup_steps(result.copilot_setup_steps.as_deref().unwrap());
    assert_eq!(steps[0]["uses"], Value::from("actions/checkout@v4"));
    assert_eq!(steps[1]["run"], Value::from("./bootstrap"));
    Ok(())
}

#[test]
fn test_first_setup_steps_import_wins() -> Result<()> {
    let tree = WorkflowTree::new()?;
    tree.write_importer("main.md", &["b/copilot-setup-steps.yml", "a/copilot-setup-steps.yml"])?;
    tree.write(
        "a/copilot-setup-steps.yml",
        "jobs:\n  copilot-setup-steps:\n    steps:\n      - run: from-a\n",
    )?;
    tree.write(
        "b/copilot-setup-steps.yml",
        "jobs:\n  copilot-setup-steps:\n    steps:\n      - run: from-b\n",
    )?;

    let result = tree.resolve("main.md")?;
    assert_eq!(
        result.imported_files,
        vec!["a/copilot-setup-steps.yml", "b/copilot-setup-steps.yml"]
    );

    let steps = setup_steps(result.copilot_setup_steps.as_deref().unwrap());
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[1]["run"], Value::from("from-a"));
    assert!(result.merged_steps.is_empty());
    assert!(result.merged_jobs.is_empty());
    Ok(())
}
