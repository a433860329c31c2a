//! Configuration management for wfimport
//!
//! A single global TOML file holds user-wide settings: where remote imports
//! are served from, whether they are allowed, the checkout action used for
//! synthesised setup steps, and the default workflows directory.
//!
//! # Modules
//!
//! - `global` - [`WfConfig`] loading, saving and default location
//!
//! # Precedence
//!
//! 1. `--config <path>` on the command line
//! 2. `WFIMPORT_CONFIG` environment variable
//! 3. `~/.wfimport/config.toml` (`%LOCALAPPDATA%\wfimport\config.toml` on Windows)

pub mod global;

pub use global::{CONFIG_ENV_VAR, WfConfig};
