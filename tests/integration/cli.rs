//! The `wfimport` command line.

use assert_cmd::Command;
use predicates::prelude::*;
use wfimport::test_utils::WorkflowTree;

/// `wfimport` with an isolated (absent) config file.
fn wfimport(tree: &WorkflowTree) -> Command {
    let mut cmd = Command::cargo_bin("wfimport").unwrap();
    cmd.current_dir(tree.path())
        .env_remove("WFIMPORT_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(tree.file_path("config/wfimport.toml"));
    cmd
}

fn sample_tree() -> WorkflowTree {
    let tree = WorkflowTree::new().unwrap();
    tree.write_importer("main.md", &["shared/a.md"]).unwrap();
    tree.write_workflow("shared/a.md", "imports: [b.md]\ntools:\n  bash: {}", "Use A\n")
        .unwrap();
    tree.write_workflow("shared/b.md", "engine: copilot", "Use B\n").unwrap();
    tree
}

#[test]
fn test_resolve_text_output() {
    let tree = sample_tree();
    wfimport(&tree)
        .args(["resolve", "main.md", "--markdown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolved 2 import(s) for main.md"))
        .stdout(predicate::str::contains("1. shared/b.md"))
        .stdout(predicate::str::contains("2. shared/a.md"))
        .stdout(predicate::str::contains("tools: 1"))
        .stdout(predicate::str::contains("Use B\n\nUse A"));
}

#[test]
fn test_resolve_json_output() {
    let tree = sample_tree();
    let output = wfimport(&tree)
        .args(["resolve", "main.md", "--format", "json"])
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(json["imported_files"], serde_json::json!(["shared/b.md", "shared/a.md"]));
    assert_eq!(json["merged_engine"], serde_json::json!("copilot"));
    assert_eq!(json["merged_markdown"], serde_json::json!("Use B\n\nUse A"));
}

#[test]
fn test_resolve_failure_renders_diagnostic() {
    let tree = WorkflowTree::new().unwrap();
    tree.write_workflow("main.md", "on: push\nimports:\n  - shared/missing.md", "# Body\n")
        .unwrap();

    wfimport(&tree)
        .args(["resolve", "main.md"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "main.md:4:5: error: import file not found: shared/missing.md",
        ))
        .stderr(predicate::str::contains("4 |   - shared/missing.md"));
}

#[test]
fn test_resolve_missing_workflow() {
    let tree = WorkflowTree::new().unwrap();
    wfimport(&tree)
        .args(["resolve", "absent.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Workflow file not found: absent.md"));
}

#[test]
fn test_legacy_directive_warns_on_stderr() {
    let tree = WorkflowTree::new().unwrap();
    tree.write("main.md", "# Main\n@include shared/x.md\n").unwrap();
    tree.write("shared/x.md", "X\n").unwrap();

    wfimport(&tree)
        .args(["resolve", "main.md"])
        .assert()
        .success()
        .stderr(predicate::str::contains("deprecated syntax"));

    wfimport(&tree)
        .args(["--quiet", "resolve", "main.md"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_check_reports_each_failure() {
    let tree = WorkflowTree::new().unwrap();
    tree.write_importer("wf/good.md", &["parts/ok.md"]).unwrap();
    tree.write_importer("wf/bad.md", &["parts/gone.md"]).unwrap();
    tree.write("wf/parts/ok.md", "ok\n").unwrap();

    wfimport(&tree)
        .args(["check", "wf"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("✓"))
        .stdout(predicate::str::contains("✗"))
        .stderr(predicate::str::contains("import file not found: parts/gone.md"))
        .stderr(predicate::str::contains("1 of 3 workflow(s) failed to resolve"));
}

#[test]
fn test_check_all_good() {
    let tree = sample_tree();
    wfimport(&tree)
        .args(["check", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 workflow(s) resolved"));
}

#[test]
fn test_check_uses_configured_workflows_dir() {
    let tree = WorkflowTree::new().unwrap();
    tree.write("config/wfimport.toml", "workflows_dir = \"flows\"\n").unwrap();
    tree.write_importer("flows/one.md", &[]).unwrap();

    wfimport(&tree)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 workflow(s) resolved"));
}

#[test]
fn test_directives_lists_lines_and_flags() {
    let tree = WorkflowTree::new().unwrap();
    tree.write(
        "main.md",
        "---\non: push\n---\n# Main\n{{#import shared/a.md}}\n@include? shared/b.md\n",
    )
    .unwrap();

    wfimport(&tree)
        .args(["directives", "main.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("main.md:5: shared/a.md\n"))
        .stdout(predicate::str::contains(
            "main.md:6: shared/b.md (optional, deprecated syntax)",
        ));
}

#[test]
fn test_frontmatter_set_and_unset() {
    let tree = WorkflowTree::new().unwrap();
    tree.write_workflow("main.md", "engine: copilot", "# Body\n").unwrap();

    wfimport(&tree)
        .args(["frontmatter", "set", "main.md", "imports", "[shared/a.md]"])
        .assert()
        .success();
    let content = tree.read("main.md").unwrap();
    assert!(content.contains("imports:\n- shared/a.md"), "{content}");
    assert!(content.ends_with("---\n# Body\n"));

    wfimport(&tree)
        .args(["frontmatter", "unset", "main.md", "imports"])
        .assert()
        .success();
    assert_eq!(tree.read("main.md").unwrap(), "---\nengine: copilot\n---\n# Body\n");

    wfimport(&tree)
        .args(["frontmatter", "unset", "main.md", "imports"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Key 'imports' is not set"));
}

#[test]
fn test_config_init_show_and_path() {
    let tree = WorkflowTree::new().unwrap();
    let config_path = tree.file_path("config/wfimport.toml");

    wfimport(&tree)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(config_path.display().to_string()));

    wfimport(&tree)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not found, showing defaults"))
        .stdout(predicate::str::contains("allow_remote = true"));

    wfimport(&tree).args(["config", "init"]).assert().success();
    assert!(config_path.exists());

    wfimport(&tree)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config already exists"));
}
