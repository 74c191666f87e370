//! Configuration loaded from `config.toml` in the data directory.
//!
//! Every field has a default, so a missing file or a partial file is fine.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::settings::DEFAULT_REVENUE_TARGET;

pub const CONFIG_FILE: &str = "config.toml";
/// Environment variable overriding the configured passcode secret.
pub const SECRET_ENV: &str = "OPSDASH_SECRET";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Revenue target used when a data directory is initialised.
    #[serde(default = "default_revenue_target")]
    pub default_revenue_target: f64,
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_revenue_target: default_revenue_target(),
            access: AccessConfig::default(),
            log: LogConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Shared passcode. When set, commands require a matching `--passcode`.
    #[serde(default)]
    pub passcode: Option<String>,
    #[serde(default = "default_allowed_domains")]
    pub allowed_domains: Vec<String>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            passcode: None,
            allowed_domains: default_allowed_domains(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LogConfig {
    /// `tracing` filter directive, used when `OPSDASH_LOG` is unset.
    #[serde(default)]
    pub filter: Option<String>,
}

fn default_revenue_target() -> f64 {
    DEFAULT_REVENUE_TARGET
}

fn default_allowed_domains() -> Vec<String> {
    vec!["hec.edu".to_string(), "hec.fr".to_string()]
}

impl Config {
    /// The passcode secret in effect: the environment first, then the config file.
    pub fn passcode_secret(&self) -> Option<String> {
        std::env::var(SECRET_ENV)
            .ok()
            .or_else(|| self.access.passcode.clone())
            .filter(|s| !s.trim().is_empty())
    }
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

pub fn load_config(data_dir: &Path) -> Result<Config> {
    let path = config_path(data_dir);
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
