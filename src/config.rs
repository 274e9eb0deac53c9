//! Configuration file support for pip-fund
//!
//! Reads configuration from `~/.config/pip-fund/config.json`:
//!
//! ```json
//! {
//!   "python": "/usr/bin/python3.12",
//!   "site_packages": ["/opt/venv/lib/python3.12/site-packages"],
//!   "pypi_url": "https://pypi.org",
//!   "github_api_url": "https://api.github.com",
//!   "github_token_env": "GITHUB_TOKEN",
//!   "extra_aliases": ["support", "backers"]
//! }
//! ```
//!
//! Every key is optional.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_PYPI_URL: &str = "https://pypi.org";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot determine config directory. HOME environment variable not set.")]
    NoConfigDir,

    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Interpreter asked for `sys.path` when no site-packages are given
    pub python: Option<String>,

    /// Site-packages directories to scan instead of asking the interpreter
    #[serde(default)]
    pub site_packages: Vec<PathBuf>,

    /// Base URL of a PyPI-compatible JSON API
    pub pypi_url: Option<String>,

    /// Base URL of the GitHub REST API
    pub github_api_url: Option<String>,

    /// Environment variable holding the GitHub token
    pub github_token_env: Option<String>,

    /// Labels treated as funding links in addition to the built-in aliases
    #[serde(default)]
    pub extra_aliases: Vec<String>,
}

impl Config {
    /// Load configuration from the default path or return defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Config::default());
        }

        Self::load_from(path)
    }

    fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadError {
            path: path.clone(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::ParseError { path, source })
    }

    pub fn pypi_url(&self) -> &str {
        self.pypi_url.as_deref().unwrap_or(DEFAULT_PYPI_URL)
    }

    pub fn github_api_url(&self) -> &str {
        self.github_api_url
            .as_deref()
            .unwrap_or(DEFAULT_GITHUB_API_URL)
    }

    pub fn github_token_env(&self) -> &str {
        self.github_token_env
            .as_deref()
            .unwrap_or(DEFAULT_GITHUB_TOKEN_ENV)
    }

    /// Read the GitHub token from the configured environment variable
    ///
    /// Returns `None` when the variable is unset or blank.
    pub fn github_token(&self) -> Option<String> {
        std::env::var(self.github_token_env())
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    }
}

/// Returns the config file path: `~/.config/pip-fund/config.json`
pub fn config_path() -> Result<PathBuf, ConfigError> {
    // Use XDG_CONFIG_HOME if set, otherwise fall back to ~/.config
    let config_base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".config"))
                .unwrap_or_default()
        });

    if config_base.as_os_str().is_empty() {
        return Err(ConfigError::NoConfigDir);
    }

    Ok(config_base.join("pip-fund").join("config.json"))
}
