//! Import resolution and merge engine.
//!
//! A workflow's `imports:` list (and its inline `{{#import}}` directives) is
//! resolved into a cycle-free, deterministically ordered set of imported
//! files whose sections are merged into an [`ImportsResult`].
//!
//! # Example
//!
//! ```rust,no_run
//! use wfimport::imports::ImportResolver;
//! use wfimport::markdown::WorkflowDocument;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let document = WorkflowDocument::load(Path::new(".github/workflows/triage.md"))?;
//! let resolver = ImportResolver::new(".github/workflows");
//! match resolver.resolve_document(&document) {
//!     Ok(result) => println!("imported: {:?}", result.imported_files),
//!     Err(err) => eprintln!("{}", err.render()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Ordering
//!
//! `imported_files` lists every resolved import once, children before the
//! files that import them; imports with no ordering constraint between them
//! are sorted by identity. Importing `[a, b]` where `a` imports `c` and `d`,
//! `b` imports `e` and `c` imports `f` yields `[d, e, b, f, c, a]`.

pub mod error;
pub mod graph;
pub mod import_spec;
pub mod inputs;
pub mod merge;
pub mod remote;
pub mod resolver;
pub mod setup_steps;

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::Path;

pub use error::{ImportError, ImportFailure, classify_cause, format_import_error, locate_import};
pub use graph::ImportGraph;
pub use import_spec::{ImportSpec, parse_imports};
pub use remote::{
    DisabledFetcher, ImportManifest, MirrorFetcher, RemoteFetcher, WorkflowSpec, is_remote_path,
};
pub use resolver::ImportResolver;

/// Merged outcome of resolving a document's imports.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportsResult {
    /// Resolved identities in processing order
    pub imported_files: Vec<String>,
    /// Union of `tools`
    pub merged_tools: Mapping,
    /// Union of `services`
    pub merged_services: Mapping,
    /// Union of `mcp-servers`
    pub merged_mcp_servers: Mapping,
    /// Last `engine` set by an import
    pub merged_engine: Option<Value>,
    /// Union of `permissions`
    pub merged_permissions: Mapping,
    /// Union of `network`
    pub merged_network: Mapping,
    /// Union of `runtimes`
    pub merged_runtimes: Mapping,
    /// Union of `safe-outputs`
    pub merged_safe_outputs: Mapping,
    /// Concatenated `steps`
    pub merged_steps: Vec<Value>,
    /// Concatenated `post-steps`
    pub merged_post_steps: Vec<Value>,
    /// Named jobs from imported workflows
    pub merged_jobs: Mapping,
    /// Imported markdown bodies (or sections), in processing order
    pub merged_markdown: String,
    /// YAML sequence of setup steps, starting with a checkout
    pub copilot_setup_steps: Option<String>,
    /// Inputs passed to each parameterised import
    pub import_inputs: BTreeMap<String, Mapping>,
}

/// Resolve the `imports:` of `frontmatter` relative to `base_dir`.
///
/// Remote imports are served from `manifest` only; use [`ImportResolver`]
/// with a fetcher to download missing ones.
pub fn resolve_frontmatter(
    frontmatter: &Mapping,
    base_dir: &Path,
    manifest: Option<&ImportManifest>,
) -> Result<ImportsResult, ImportError> {
    let mut resolver = ImportResolver::new(base_dir);
    if let Some(manifest) = manifest {
        resolver = resolver.with_manifest(manifest.clone());
    }
    resolver.resolve_frontmatter(frontmatter)
}
