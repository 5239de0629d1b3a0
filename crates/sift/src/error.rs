//! Error types for rule loading, listing and the picker session

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Sift error type
#[derive(Error, Debug)]
pub enum SiftError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Config error in rule '{rule}': {message}")]
    RuleConfig { rule: String, message: String },

    #[error("Unknown rule: {name}")]
    UnknownRule { name: String, available: Vec<String> },

    #[error("Failed to run: \"{cmd}\" in {}: {source}", .cwd.display())]
    Spawn {
        cmd: String,
        cwd: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to run: \"{cmd}\" in {}: {status}{}", .cwd.display(), stderr_suffix(.stderr))]
    Listing {
        cmd: String,
        cwd: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("Terminal error: {0}")]
    Terminal(String),
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

impl SiftError {
    pub(crate) fn rule_config(rule: &str, message: impl Into<String>) -> Self {
        SiftError::RuleConfig {
            rule: rule.to_string(),
            message: message.into(),
        }
    }

    /// True for errors raised while loading configuration, before any command runs.
    pub fn is_config(&self) -> bool {
        matches!(self, SiftError::Config(_) | SiftError::RuleConfig { .. })
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SiftError>;
