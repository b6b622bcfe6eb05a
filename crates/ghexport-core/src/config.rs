// SPDX-License-Identifier: Apache-2.0

//! Configuration management for ghexport.
//!
//! Provides layered configuration from files and environment variables.
//! Uses XDG-compliant paths with environment variable support.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables (prefix: `GHEXPORT_`)
//! 2. Config file: `~/.config/ghexport/config.toml`
//! 3. Built-in defaults
//!
//! # Examples
//!
//! ```bash
//! # Slow the upload loop down to one file per second
//! GHEXPORT_PACING__DELAY_MS=1000 ghexport-server
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::ExportError;
use crate::walk::ExclusionRules;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// GitHub API settings.
    pub github: GitHubConfig,
    /// What to export and how.
    pub export: ExportConfig,
    /// Upload pacing.
    pub pacing: PacingConfig,
    /// HTTP listener settings.
    pub server: ServerConfig,
}

/// GitHub API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Base URL of the REST API.
    pub api_base_url: String,
    /// API request timeout in seconds.
    pub api_timeout_seconds: u64,
    /// `User-Agent` header sent with every request (GitHub rejects requests without one).
    pub user_agent: String,
    /// Description used when the caller does not supply one.
    pub default_description: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            api_timeout_seconds: 10,
            user_agent: concat!("ghexport/", env!("CARGO_PKG_VERSION")).to_string(),
            default_description: "Project exported with ghexport".to_string(),
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory whose files are exported.
    pub project_root: PathBuf,
    /// Wait after repository creation before the first upload, in milliseconds.
    pub init_delay_ms: u64,
    /// File and directory names never exported.
    pub excluded_names: Vec<String>,
    /// Dotfiles that are exported despite the leading `.`.
    pub allowed_dotfiles: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let rules = ExclusionRules::default();
        Self {
            project_root: PathBuf::from("."),
            init_delay_ms: 2000,
            excluded_names: rules.excluded_names,
            allowed_dotfiles: rules.allowed_dotfiles,
        }
    }
}

impl ExportConfig {
    /// Exclusion rules for the directory walk.
    #[must_use]
    pub fn exclusion_rules(&self) -> ExclusionRules {
        ExclusionRules {
            excluded_names: self.excluded_names.clone(),
            allowed_dotfiles: self.allowed_dotfiles.clone(),
        }
    }

    /// Repository initialization wait.
    #[must_use]
    pub fn init_delay(&self) -> Duration {
        Duration::from_millis(self.init_delay_ms)
    }
}

/// Pacing strategy selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacingStrategy {
    /// Constant sleep after every upload.
    #[default]
    Fixed,
    /// Derive the sleep from GitHub's rate-limit response headers.
    Adaptive,
}

/// Upload pacing settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Which strategy to use.
    pub strategy: PacingStrategy,
    /// Fixed delay, and the floor for the adaptive strategy, in milliseconds.
    pub delay_ms: u64,
    /// Upper bound for a single adaptive wait, in seconds.
    pub max_wait_seconds: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            strategy: PacingStrategy::Fixed,
            delay_ms: 300,
            max_wait_seconds: 120,
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Returns the ghexport configuration directory.
///
/// Respects the `XDG_CONFIG_HOME` environment variable if set,
/// otherwise defaults to `~/.config/ghexport`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        return PathBuf::from(xdg_config).join("ghexport");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("ghexport")
}

/// Returns the path to the configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load application configuration.
///
/// Loads from config file (if exists) and environment variables.
/// Environment variables use the prefix `GHEXPORT_` and double underscore
/// for nested keys (e.g., `GHEXPORT_SERVER__PORT`).
///
/// # Errors
///
/// Returns `ExportError::Config` if the config file exists but is invalid.
pub fn load_config() -> Result<AppConfig, ExportError> {
    let config_path = config_file_path();

    let config = Config::builder()
        // Load from config file (optional - may not exist)
        .add_source(File::with_name(config_path.to_string_lossy().as_ref()).required(false))
        // Override with environment variables
        .add_source(
            Environment::with_prefix("GHEXPORT")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("export.excluded_names")
                .with_list_parse_key("export.allowed_dotfiles")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    Ok(app_config)
}
