//! Test utilities for wfimport
//!
//! - [`init_test_logging`] installs a test-writer tracing subscriber once
//! - [`WorkflowTree`] builds workflow files in a temporary directory
//!
//! # Example
//!
//! ```rust,no_run
//! use wfimport::test_utils::WorkflowTree;
//!
//! # fn example() -> anyhow::Result<()> {
//! let tree = WorkflowTree::new()?;
//! tree.write_importer("wf.md", &["shared/tools.md"])?;
//! tree.write_workflow("shared/tools.md", "tools:\n  bash: [ls]", "")?;
//! let result = tree.resolve("wf.md")?;
//! assert_eq!(result.imported_files, vec!["shared/tools.md"]);
//! # Ok(())
//! # }
//! ```

pub mod fixtures;

pub use fixtures::WorkflowTree;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, nothing is
/// installed.
///
/// ```bash
/// RUST_LOG=wfimport=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
