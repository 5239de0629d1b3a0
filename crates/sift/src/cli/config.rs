//! Configuration paths for sift
//!
//! Resolution order, first hit wins:
//! 1. `--config <path>` (must exist)
//! 2. `SIFT_CONFIG`
//! 3. `$SIFT_HOME/config.toml` (`~/.sift/config.toml`)
//! 4. the built-in rules compiled into the binary

use std::path::{Path, PathBuf};

use sift::rules::BUILTIN_CONFIG;
use sift::{CachePolicy, RuleSet};
use tracing::{debug, warn};

use crate::cli::error::HelpfulError;

const CONFIG_ENV: &str = "SIFT_CONFIG";
const CONFIG_FILE: &str = "config.toml";

/// Where the active rules came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` flag
    Flag(PathBuf),
    /// `SIFT_CONFIG` environment variable
    Env(PathBuf),
    /// `config.toml` in the sift home directory
    Home(PathBuf),
    /// Built-in rules
    Builtin,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Flag(path) | ConfigSource::Env(path) | ConfigSource::Home(path) => Some(path),
            ConfigSource::Builtin => None,
        }
    }
}

/// Rules plus the file they were loaded from
#[derive(Debug)]
pub struct LoadedConfig {
    pub rules: RuleSet,
    pub source: ConfigSource,
}

impl LoadedConfig {
    /// Cache freshness policy for these rules.
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::for_config(self.source.path(), self.rules.settings().cache_ttl)
    }
}

/// Get the default config path: `$SIFT_HOME/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    sift_logging::sift_home().map(|home| home.join(CONFIG_FILE))
}

/// Resolve the config source from the process environment.
pub fn resolve(flag: Option<&Path>) -> Result<ConfigSource, HelpfulError> {
    let env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    resolve_with(flag, env, default_config_path())
}

/// Resolve the config source from explicit inputs.
pub fn resolve_with(
    flag: Option<&Path>,
    env: Option<PathBuf>,
    home_config: Option<PathBuf>,
) -> Result<ConfigSource, HelpfulError> {
    if let Some(path) = flag {
        if !path.is_file() {
            return Err(HelpfulError::config_not_found(path));
        }
        return Ok(ConfigSource::Flag(path.to_path_buf()));
    }

    if let Some(path) = env.filter(|p| !p.as_os_str().is_empty()) {
        if path.is_file() {
            return Ok(ConfigSource::Env(path));
        }
        warn!("{} points at a missing file: {}", CONFIG_ENV, path.display());
    }

    if let Some(path) = home_config {
        if path.is_file() {
            return Ok(ConfigSource::Home(path));
        }
    }

    Ok(ConfigSource::Builtin)
}

/// Read and parse the rules for `source`.
pub fn load(source: ConfigSource) -> Result<LoadedConfig, HelpfulError> {
    let text = match source.path() {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| HelpfulError::cannot_read_config(path, &e.to_string()))?,
        None => BUILTIN_CONFIG.to_string(),
    };

    let rules = RuleSet::parse(&text)
        .map_err(|e| HelpfulError::invalid_config(source.path(), &e.to_string()))?;
    debug!(source = ?source, rules = rules.len(), "configuration loaded");

    Ok(LoadedConfig { rules, source })
}
