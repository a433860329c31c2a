//! Global configuration for wfimport.
//!
//! Settings live in `~/.wfimport/config.toml` (`%LOCALAPPDATA%\wfimport\config.toml`
//! on Windows). The location can be overridden with the `WFIMPORT_CONFIG`
//! environment variable or the `--config` flag. A missing file means
//! defaults.
//!
//! ```toml
//! # Serve owner/repo/path@ref imports from a local mirror
//! mirror_dir = "/srv/workflow-mirror"
//!
//! # Set to false to reject remote imports entirely
//! allow_remote = true
//!
//! # Action used when a setup-steps import lacks a checkout step
//! checkout_action = "actions/checkout@v5"
//!
//! # Directory scanned by `wfimport check`
//! workflows_dir = ".github/workflows"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

use crate::imports::setup_steps::DEFAULT_CHECKOUT_ACTION;
use crate::imports::{DisabledFetcher, MirrorFetcher, RemoteFetcher};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV_VAR: &str = "WFIMPORT_CONFIG";

/// Global wfimport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WfConfig {
    /// Root of a local mirror laid out as `<owner>/<repo>/<ref>/<path>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_dir: Option<PathBuf>,

    /// Whether remote imports may be fetched at all.
    #[serde(default = "default_allow_remote")]
    pub allow_remote: bool,

    /// Action for synthesised checkout steps.
    #[serde(default = "default_checkout_action")]
    pub checkout_action: String,

    /// Directory `check` scans when none is given.
    #[serde(default = "default_workflows_dir")]
    pub workflows_dir: PathBuf,
}

const fn default_allow_remote() -> bool {
    true
}

fn default_checkout_action() -> String {
    DEFAULT_CHECKOUT_ACTION.to_string()
}

fn default_workflows_dir() -> PathBuf {
    PathBuf::from(".github/workflows")
}

impl Default for WfConfig {
    fn default() -> Self {
        Self {
            mirror_dir: None,
            allow_remote: default_allow_remote(),
            checkout_action: default_checkout_action(),
            workflows_dir: default_workflows_dir(),
        }
    }
}

impl WfConfig {
    /// Load from `path`, or the default location when `None`.
    ///
    /// A missing file yields the defaults.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Write to `path`, creating parent directories as needed.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        Ok(())
    }

    /// The config path: `WFIMPORT_CONFIG` if set, else the platform default.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
            && !path.is_empty()
        {
            return Ok(PathBuf::from(path));
        }

        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("wfimport")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".wfimport")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// The fetcher remote imports should use under these settings.
    pub fn remote_fetcher(&self) -> Arc<dyn RemoteFetcher> {
        match (&self.mirror_dir, self.allow_remote) {
            (Some(mirror), true) => Arc::new(MirrorFetcher::new(mirror)),
            _ => Arc::new(DisabledFetcher),
        }
    }
}
