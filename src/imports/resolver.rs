//! Depth-first import resolution.
//!
//! [`ImportResolver`] walks a document's imports, loading each target (local
//! file or remote spec through the [`ImportManifest`]), recursing into the
//! target's own imports before returning to the parent. Traversal state is
//! three-valued per identity (unvisited / in progress / done) plus an explicit
//! path of in-progress identities so a cycle can be reported as a chain.
//!
//! Once every import is resolved the [`ImportGraph`] yields the processing
//! order and contributions are merged in that order.
//!
//! Logging goes to the resolver's own [`Dispatch`], a no-op unless the caller
//! supplies one.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use strsim::levenshtein;
use tracing::Dispatch;

use super::error::{ImportError, ImportFailure};
use super::graph::ImportGraph;
use super::import_spec::{ImportSpec, parse_imports};
use super::inputs::{declared_inputs, effective_inputs, substitute_inputs};
use super::remote::{DisabledFetcher, ImportManifest, RemoteFetcher, WorkflowSpec, is_remote_path};
use super::setup_steps::{
    DEFAULT_CHECKOUT_ACTION, extract_setup_steps, is_copilot_setup_file, serialize_steps,
};
use super::ImportsResult;
use crate::markdown::{
    DocumentError, FrontmatterError, WorkflowDocument, extract_section,
};
use crate::yaml::YamlErrorPosition;

/// Maximum edit distance (percent of name length) for "did you mean" hints.
const SIMILARITY_THRESHOLD_PERCENT: usize = 40;

/// Where a document lives, and therefore how its relative imports resolve.
#[derive(Debug, Clone)]
enum Location {
    /// Path relative to the resolver's base directory, `/`-separated
    Local(String),
    /// A remote spec
    Remote(WorkflowSpec),
}

impl Location {
    /// Resolve a child import path declared by a document at this location.
    fn join(&self, child: &str) -> Result<Location, ImportFailure> {
        if is_remote_path(child) {
            return WorkflowSpec::parse(child).map(Location::Remote).map_err(|e| {
                ImportFailure::Remote {
                    message: format!("{e:#}"),
                }
            });
        }
        match self {
            Location::Remote(parent) => Ok(Location::Remote(parent.sibling(child))),
            Location::Local(parent) => {
                if Path::new(child).is_absolute() {
                    return Ok(Location::Local(child.replace('\\', "/")));
                }
                let dir = parent.rsplit_once('/').map_or("", |(dir, _)| dir);
                Ok(Location::Local(normalize_relative(dir, child)))
            }
        }
    }

    fn identity(&self) -> String {
        match self {
            Location::Local(path) => path.clone(),
            Location::Remote(spec) => spec.identity(),
        }
    }

    fn file_name(&self) -> &str {
        match self {
            Location::Local(path) => path.rsplit('/').next().unwrap_or(path),
            Location::Remote(spec) => spec.file_name(),
        }
    }
}

/// Lexically join `relative` onto `dir`, folding `.` and `..`.
///
/// A `dir` starting with `/` stays rooted; `..` never climbs above that root.
fn normalize_relative(dir: &str, relative: &str) -> String {
    let rooted = dir.starts_with('/');
    let mut segments: Vec<String> = dir
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .map(str::to_string)
        .collect();

    for component in Path::new(relative).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if segments.last().is_some_and(|s| s != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..".to_string());
                }
            }
            Component::Normal(part) => segments.push(part.to_string_lossy().into_owned()),
            Component::RootDir | Component::Prefix(_) => {}
        }
    }

    let joined = segments.join("/");
    if rooted { format!("/{joined}") } else { joined }
}

/// The document an import was declared in.
struct Declarer<'a> {
    location: Location,
    path: &'a Path,
    text: &'a str,
}

impl Declarer<'_> {
    /// Attach this document's text to `error`, locating it when possible.
    ///
    /// A bare frontmatter mapping has no text; its errors stay unpositioned.
    fn position(&self, error: ImportError) -> ImportError {
        if self.text.is_empty() {
            error
        } else {
            error.locate_in(self.text)
        }
    }
}

/// An import declared by a document, with where it was declared.
struct Declared {
    spec: ImportSpec,
    /// Known position for inline directives; frontmatter entries are located
    /// from the document text on failure
    position: Option<(usize, usize)>,
}

/// A resolved import.
#[derive(Debug)]
struct ImportNode {
    spec: ImportSpec,
    /// Identity of the underlying file (no section)
    file_identity: String,
    document: WorkflowDocument,
    is_copilot_setup: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Done,
}

/// Resolves and merges the imports of workflow documents.
#[derive(Clone)]
pub struct ImportResolver {
    base_dir: PathBuf,
    manifest: ImportManifest,
    fetcher: Arc<dyn RemoteFetcher>,
    dispatch: Dispatch,
    checkout_action: String,
}

impl std::fmt::Debug for ImportResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportResolver")
            .field("base_dir", &self.base_dir)
            .field("manifest_entries", &self.manifest.len())
            .field("checkout_action", &self.checkout_action)
            .finish_non_exhaustive()
    }
}

impl ImportResolver {
    /// A resolver for documents whose relative imports live under `base_dir`.
    ///
    /// Remote imports are rejected until a fetcher is configured.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            manifest: ImportManifest::new(),
            fetcher: Arc::new(DisabledFetcher),
            dispatch: Dispatch::none(),
            checkout_action: DEFAULT_CHECKOUT_ACTION.to_string(),
        }
    }

    /// Share a manifest of remote content.
    #[must_use]
    pub fn with_manifest(mut self, manifest: ImportManifest) -> Self {
        self.manifest = manifest;
        self
    }

    /// Fetch remote imports with `fetcher`.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn RemoteFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Send resolution logs to `dispatch`.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Action used when a checkout step must be synthesised.
    #[must_use]
    pub fn with_checkout_action(mut self, action: impl Into<String>) -> Self {
        self.checkout_action = action.into();
        self
    }

    /// The directory relative imports resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// `/`-separated path of `path` under the base directory.
    ///
    /// Documents outside the base directory are treated as sitting directly in it.
    fn relative_to_base(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.base_dir).ok().or_else(|| path.file_name().map(Path::new));
        relative
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_default()
    }

    /// The manifest used for remote content.
    pub fn manifest(&self) -> &ImportManifest {
        &self.manifest
    }

    /// Resolve the `imports:` of a bare frontmatter mapping.
    ///
    /// Errors carry no position; render them with
    /// [`format_import_error`](super::format_import_error) against the
    /// document text to locate them.
    pub fn resolve_frontmatter(
        &self,
        frontmatter: &serde_yaml::Mapping,
    ) -> Result<ImportsResult, ImportError> {
        tracing::dispatcher::with_default(&self.dispatch, || {
            let root_path = self.base_dir.join("<frontmatter>");
            let root = Declarer {
                location: Location::Local(String::new()),
                path: &root_path,
                text: "",
            };
            let declared = frontmatter_imports(frontmatter, &root)?;
            Traversal::new(self).run(&root, declared)
        })
    }

    /// Resolve a loaded document: its `imports:` and inline directives.
    pub fn resolve_document(&self, document: &WorkflowDocument) -> Result<ImportsResult, ImportError> {
        tracing::dispatcher::with_default(&self.dispatch, || {
            tracing::debug!("Resolving imports of {}", document.path.display());
            let root = Declarer {
                location: Location::Local(self.relative_to_base(&document.path)),
                path: &document.path,
                text: &document.text,
            };
            let declared = document_imports(document, &root)?;
            Traversal::new(self).run(&root, declared)
        })
    }
}

fn frontmatter_imports(
    frontmatter: &serde_yaml::Mapping,
    declarer: &Declarer<'_>,
) -> Result<Vec<Declared>, ImportError> {
    parse_imports(frontmatter.get("imports"))
        .map(|specs| {
            specs
                .into_iter()
                .map(|spec| Declared {
                    spec,
                    position: None,
                })
                .collect()
        })
        .map_err(|cause| declarer.position(ImportError::new("imports", declarer.path, cause)))
}

/// Frontmatter imports followed by inline directives of the body.
fn document_imports(
    document: &WorkflowDocument,
    declarer: &Declarer<'_>,
) -> Result<Vec<Declared>, ImportError> {
    let mut declared = frontmatter_imports(&document.frontmatter, declarer)?;
    if document.is_workflow_yaml() {
        return Ok(declared);
    }

    for found in document.import_directives() {
        let directive = found.directive;
        if directive.is_legacy {
            tracing::warn!(
                "{}: '{}' uses deprecated syntax; use '{{{{#import{} {}}}}}'",
                document.path.display(),
                directive.original,
                if directive.is_optional { "?" } else { "" },
                directive.path
            );
        }
        let (line, column) = (found.line, found.column);
        let spec = ImportSpec {
            path: directive.path,
            optional: directive.is_optional,
            inputs: serde_yaml::Mapping::new(),
        };
        declared.push(Declared {
            spec,
            position: Some((line, column)),
        });
    }
    Ok(declared)
}

/// State of one resolution call.
struct Traversal<'r> {
    resolver: &'r ImportResolver,
    states: HashMap<String, VisitState>,
    path: Vec<String>,
    nodes: HashMap<String, ImportNode>,
    graph: ImportGraph,
}

enum Loaded {
    Found(String),
    Missing(ImportFailure),
}

impl<'r> Traversal<'r> {
    fn new(resolver: &'r ImportResolver) -> Self {
        Self {
            resolver,
            states: HashMap::new(),
            path: Vec::new(),
            nodes: HashMap::new(),
            graph: ImportGraph::new(),
        }
    }

    fn run(mut self, root: &Declarer<'_>, declared: Vec<Declared>) -> Result<ImportsResult, ImportError> {
        for item in declared {
            if let Some(identity) = self.visit(root, item)? {
                self.graph.ensure_node(&identity);
            }
        }

        let order = self
            .graph
            .processing_order()
            .map_err(|cause| root.position(ImportError::new("imports", root.path, cause)))?;
        self.merge(order)
    }

    /// Fail with `cause` at the position of `item` in `declarer`.
    fn fail(declarer: &Declarer<'_>, item: &Declared, cause: ImportFailure) -> ImportError {
        let error = ImportError::new(&item.spec.path, declarer.path, cause);
        let error = match item.position {
            Some((line, column)) => error.at(line, column),
            None => error,
        };
        declarer.position(error)
    }

    /// Resolve one declared import; `None` when an optional import is missing.
    fn visit(&mut self, declarer: &Declarer<'_>, item: Declared) -> Result<Option<String>, ImportError> {
        let location = declarer
            .location
            .join(item.spec.file_path())
            .map_err(|cause| Self::fail(declarer, &item, cause))?;
        let file_identity = location.identity();
        let identity = match item.spec.section() {
            Some(section) => format!("{file_identity}#{section}"),
            None => file_identity.clone(),
        };

        match self.states.get(&identity) {
            Some(VisitState::Done) => return Ok(Some(identity)),
            Some(VisitState::InProgress) => {
                let start = self.path.iter().position(|p| *p == identity).unwrap_or(0);
                let mut chain = self.path[start..].to_vec();
                chain.push(identity);
                return Err(Self::fail(declarer, &item, ImportFailure::Cycle {
                    chain,
                }));
            }
            None => {}
        }

        let text = match self.load(&location, &item.spec) {
            Loaded::Found(text) => text,
            Loaded::Missing(cause) if item.spec.optional => {
                tracing::debug!("Skipping optional import {identity}: {cause}");
                return Ok(None);
            }
            Loaded::Missing(cause) => return Err(Self::fail(declarer, &item, cause)),
        };

        self.states.insert(identity.clone(), VisitState::InProgress);
        self.path.push(identity.clone());

        let display_path = self.display_path(&location);
        let document = self
            .parse_with_inputs(&display_path, &text, &item.spec)
            .map_err(|cause| Self::fail(declarer, &item, cause))?;

        if let Some(section) = item.spec.section()
            && !document.is_workflow_yaml()
            && extract_section(&document.markdown, section).is_none()
        {
            return Err(Self::fail(declarer, &item, ImportFailure::SectionNotFound {
                path: file_identity,
                section: section.to_string(),
            }));
        }

        let child_declarer = Declarer {
            location: location.clone(),
            path: &document.path,
            text: &document.text,
        };
        for child in document_imports(&document, &child_declarer)? {
            if let Some(child_identity) = self.visit(&child_declarer, child)? {
                self.graph.add_import(&identity, &child_identity);
            }
        }
        self.graph.ensure_node(&identity);

        self.path.pop();
        self.states.insert(identity.clone(), VisitState::Done);
        tracing::trace!("Resolved import {identity}");

        let is_copilot_setup = is_copilot_setup_file(location.file_name());
        self.nodes.insert(identity.clone(), ImportNode {
            spec: item.spec,
            file_identity,
            document,
            is_copilot_setup,
        });
        Ok(Some(identity))
    }

    fn display_path(&self, location: &Location) -> PathBuf {
        match location {
            Location::Local(path) => self.resolver.base_dir.join(path),
            Location::Remote(spec) => PathBuf::from(spec.identity()),
        }
    }

    fn load(&self, location: &Location, spec: &ImportSpec) -> Loaded {
        match location {
            Location::Remote(remote) => {
                match self.resolver.manifest.get_or_fetch(remote, self.resolver.fetcher.as_ref()) {
                    Ok(text) => Loaded::Found(text),
                    Err(e) => Loaded::Missing(ImportFailure::Remote {
                        message: format!("{e:#}"),
                    }),
                }
            }
            Location::Local(relative) => {
                let path = self.resolver.base_dir.join(relative);
                match std::fs::read_to_string(&path) {
                    Ok(text) => Loaded::Found(text),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        Loaded::Missing(ImportFailure::FileNotFound {
                            path: spec.file_path().to_string(),
                            suggestion: similar_file_name(&path),
                        })
                    }
                    Err(e) => Loaded::Missing(ImportFailure::Io {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    }),
                }
            }
        }
    }

    /// Parse an imported document, applying its inputs first.
    fn parse_with_inputs(
        &self,
        path: &Path,
        text: &str,
        spec: &ImportSpec,
    ) -> Result<WorkflowDocument, ImportFailure> {
        let document = WorkflowDocument::parse(path, text).map_err(document_failure)?;
        let origin = path.display().to_string();
        let declared = declared_inputs(&origin, &document.frontmatter);
        if declared.is_empty() && spec.inputs.is_empty() {
            return Ok(document);
        }

        let values = effective_inputs(&origin, &declared, &spec.inputs)?;
        match substitute_inputs(text, &values) {
            std::borrow::Cow::Borrowed(_) => Ok(document),
            std::borrow::Cow::Owned(substituted) => {
                WorkflowDocument::parse(path, substituted).map_err(document_failure)
            }
        }
    }

    /// Merge every resolved node in processing order.
    fn merge(mut self, order: Vec<String>) -> Result<ImportsResult, ImportError> {
        let mut result = ImportsResult::default();
        let mut merged_files: HashSet<String> = HashSet::new();
        let mut setup_origin: Option<String> = None;

        for identity in order {
            let Some(node) = self.nodes.remove(&identity) else {
                continue;
            };
            let origin = node.document.path.display().to_string();

            if !node.spec.inputs.is_empty() {
                result.import_inputs.insert(identity.clone(), node.spec.inputs.clone());
            }

            if node.is_copilot_setup {
                match &setup_origin {
                    Some(first) => {
                        tracing::warn!("Ignoring setup steps from {identity}; already taken from {first}");
                    }
                    None => {
                        let steps = extract_setup_steps(
                            &origin,
                            &node.document.frontmatter,
                            &self.resolver.checkout_action,
                        );
                        let yaml = serialize_steps(&steps).map_err(|e| {
                            ImportError::new(
                                &node.spec.path,
                                &node.document.path,
                                ImportFailure::Malformed {
                                    reason: format!("{e:#}"),
                                },
                            )
                        })?;
                        result.copilot_setup_steps = Some(yaml);
                        setup_origin = Some(identity.clone());
                    }
                }
                result.imported_files.push(identity);
                continue;
            }

            if merged_files.insert(node.file_identity.clone()) {
                if node.document.is_workflow_yaml() {
                    result.merge_jobs(&origin, &node.document.frontmatter);
                } else {
                    result.merge_frontmatter(&origin, &node.document.frontmatter);
                }
            }

            if !node.document.is_workflow_yaml() {
                let body = match node.spec.section() {
                    Some(section) => extract_section(&node.document.markdown, section),
                    None => Some(node.document.markdown.clone()),
                };
                if let Some(body) = body {
                    result.append_markdown(&body);
                }
            }

            result.imported_files.push(identity);
        }

        Ok(result)
    }
}

/// Convert a document parse failure of an imported file.
fn document_failure(err: DocumentError) -> ImportFailure {
    match err.source {
        FrontmatterError::Yaml {
            position,
        } => ImportFailure::Yaml {
            path: err.path,
            text: err.text,
            position,
        },
        other => {
            let (line, column) = other.position();
            ImportFailure::Yaml {
                position: YamlErrorPosition {
                    line,
                    column,
                    message: other.to_string(),
                },
                path: err.path,
                text: err.text,
            }
        }
    }
}

/// The closest file name next to a missing file, for "did you mean" hints.
fn similar_file_name(missing: &Path) -> Option<String> {
    let target = missing.file_name()?.to_string_lossy().into_owned();
    let entries = std::fs::read_dir(missing.parent()?).ok()?;

    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .map(|name| (levenshtein(&target, &name), name))
        .filter(|(distance, _)| *distance <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .min()
        .map(|(_, name)| name)
}
