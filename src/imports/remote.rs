//! Remote `owner/repo/path@ref` imports and the shared fetch manifest.
//!
//! Fetching is delegated to a [`RemoteFetcher`]; the [`ImportManifest`]
//! guarantees each remote identity is fetched at most once per resolution,
//! even when several resolutions share one manifest across threads.

use anyhow::{Context, Result, anyhow, bail};
use dashmap::DashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::utils::read_text_file;

/// A parsed `owner/repo/path@ref` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkflowSpec {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// File path inside the repository
    pub path: String,
    /// Branch, tag or commit
    pub reference: String,
}

/// Whether an import path names a remote workflow spec.
pub fn is_remote_path(path: &str) -> bool {
    path.contains('@') && !path.starts_with('.') && !path.starts_with('/')
}

impl WorkflowSpec {
    /// Parse `owner/repo/path@ref`.
    pub fn parse(spec: &str) -> Result<Self> {
        let Some((location, reference)) = spec.rsplit_once('@') else {
            bail!("invalid workflowspec '{spec}': missing '@ref'");
        };
        let reference = reference.trim();
        if reference.is_empty() {
            bail!("invalid workflowspec '{spec}': empty ref");
        }

        let mut parts = location.splitn(3, '/');
        let (Some(owner), Some(repo), Some(path)) = (parts.next(), parts.next(), parts.next())
        else {
            bail!("invalid workflowspec '{spec}': expected owner/repo/path@ref");
        };
        if owner.is_empty() || repo.is_empty() || path.is_empty() {
            bail!("invalid workflowspec '{spec}': expected owner/repo/path@ref");
        }
        if location.split('/').chain(reference.split('/')).any(|segment| segment == "..") {
            bail!("invalid workflowspec '{spec}': '..' segments are not allowed");
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            path: path.to_string(),
            reference: reference.to_string(),
        })
    }

    /// The identity string used as graph key and manifest key.
    pub fn identity(&self) -> String {
        self.to_string()
    }

    /// A spec for `relative`, resolved against this file's directory in the
    /// same repository and ref.
    pub fn sibling(&self, relative: &str) -> Self {
        let mut segments: Vec<&str> = self.path.split('/').collect();
        segments.pop();
        for part in relative.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }
        Self {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            path: segments.join("/"),
            reference: self.reference.clone(),
        }
    }

    /// File name of the referenced path.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

impl fmt::Display for WorkflowSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}@{}", self.owner, self.repo, self.path, self.reference)
    }
}

/// Source of remote workflow content.
///
/// Error messages should contain one of `file not found`,
/// `failed to download`, `failed to resolve ref` or `invalid workflowspec`
/// so diagnostics can classify them.
pub trait RemoteFetcher: Send + Sync {
    /// Fetch the raw text of `spec`.
    fn fetch(&self, spec: &WorkflowSpec) -> Result<String>;
}

/// Serves remote imports from a local mirror laid out as
/// `<root>/<owner>/<repo>/<ref>/<path>`.
#[derive(Debug, Clone)]
pub struct MirrorFetcher {
    root: PathBuf,
}

impl MirrorFetcher {
    /// Create a fetcher rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }
}

impl RemoteFetcher for MirrorFetcher {
    fn fetch(&self, spec: &WorkflowSpec) -> Result<String> {
        let ref_dir = self.root.join(&spec.owner).join(&spec.repo).join(&spec.reference);
        if !ref_dir.is_dir() {
            bail!(
                "failed to resolve ref '{}' for {}/{}",
                spec.reference,
                spec.owner,
                spec.repo
            );
        }

        let file = spec.path.split('/').fold(ref_dir, |dir, part| dir.join(part));
        if !file.is_file() {
            bail!("file not found: {spec}");
        }

        tracing::debug!("Reading {spec} from mirror {}", self.root.display());
        read_text_file(&file, "fetching remote import")
            .with_context(|| format!("failed to download {spec}"))
    }
}

/// Rejects every remote import.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledFetcher;

impl RemoteFetcher for DisabledFetcher {
    fn fetch(&self, spec: &WorkflowSpec) -> Result<String> {
        bail!("failed to download {spec}: remote imports are disabled")
    }
}

/// Cache of fetched remote content, keyed by remote identity.
///
/// Clones share the same storage. First access to a key is serialised by a
/// per-key lock so concurrent resolutions trigger a single fetch. Failed
/// fetches are not cached.
#[derive(Debug, Clone, Default)]
pub struct ImportManifest {
    entries: Arc<DashMap<String, String>>,
    fetch_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl ImportManifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate content for an identity.
    pub fn insert(&self, identity: impl Into<String>, content: impl Into<String>) {
        self.entries.insert(identity.into(), content.into());
    }

    /// Cached content for an identity.
    pub fn get(&self, identity: &str) -> Option<String> {
        self.entries.get(identity).map(|entry| entry.value().clone())
    }

    /// Whether content for `identity` is cached.
    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return cached content for `spec`, fetching it once if absent.
    pub fn get_or_fetch(&self, spec: &WorkflowSpec, fetcher: &dyn RemoteFetcher) -> Result<String> {
        let identity = spec.identity();
        if let Some(content) = self.get(&identity) {
            tracing::trace!("Manifest hit for {identity}");
            return Ok(content);
        }

        let lock = self
            .fetch_locks
            .entry(identity.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().map_err(|_| anyhow!("failed to download {identity}: fetch lock poisoned"))?;

        // Another caller may have finished the fetch while we waited
        if let Some(content) = self.get(&identity) {
            return Ok(content);
        }

        tracing::debug!("Fetching remote import {identity}");
        let fetched = fetcher.fetch(spec);
        if let Ok(content) = &fetched {
            self.entries.insert(identity.clone(), content.clone());
        }
        self.fetch_locks.remove(&identity);
        fetched
    }
}
