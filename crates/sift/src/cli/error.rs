//! User-facing errors for the sift binary.
//!
//! Rendered as an `ERROR:` line, an optional `CONTEXT:` line and a list of
//! `TRY:` hints, one per line.

use sift::SiftError;
use std::fmt;
use std::path::Path;

#[derive(Debug)]
pub struct HelpfulError {
    pub message: String,
    /// What sift was doing when it failed
    pub context: Option<String>,
    /// Hints printed after `TRY:`
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self {
            context: Some(context.into()),
            ..self
        }
    }

    pub fn with_suggestion(self, hint: impl Into<String>) -> Self {
        self.with_suggestions([hint])
    }

    pub fn with_suggestions<S: Into<String>>(mut self, hints: impl IntoIterator<Item = S>) -> Self {
        self.suggestions.extend(hints.into_iter().map(Into::into));
        self
    }

    /// `--config` points at a file that does not exist
    pub fn config_not_found(path: &Path) -> Self {
        Self::new(format!("Config file not found: {}", path.display()))
            .with_context("The file passed with --config does not exist")
            .with_suggestions([
                format!("Check the path: ls -la {}", path.display()),
                format!("Start from the built-in rules: sift --print-config > {}", path.display()),
            ])
    }

    /// The config file exists but cannot be read
    pub fn cannot_read_config(path: &Path, reason: &str) -> Self {
        Self::new(format!("Cannot read config file: {}", path.display()))
            .with_context(reason.to_string())
            .with_suggestion(format!("Check file permissions: ls -la {}", path.display()))
    }

    /// The config text failed to parse or a rule is malformed
    pub fn invalid_config(path: Option<&Path>, details: &str) -> Self {
        let context = match path {
            Some(path) => format!("While loading {}", path.display()),
            None => "While loading the built-in rules".to_string(),
        };
        Self::new(format!("Invalid configuration: {}", details))
            .with_context(context)
            .with_suggestions([
                "Every rule is a TOML table with at least a non-empty `cmd` key",
                "`priority` must be an integer, e.g. priority = 10",
                "Compare with the built-in rules: sift --print-config",
            ])
    }

    /// A rule was requested by name but is not configured
    pub fn unknown_rule(name: &str, available: &[String]) -> Self {
        let listed = if available.is_empty() {
            "(none)".to_string()
        } else {
            available.join(", ")
        };
        Self::new(format!("Unknown rule: '{}'", name))
            .with_context(format!("Configured rules: {}", listed))
            .with_suggestions([
                "List the rules and their priorities: sift --list-rules".to_string(),
                "Check for typos in the rule name".to_string(),
            ])
    }

    /// The listing command could not be started
    pub fn spawn_failed(cmd: &str, cwd: &Path, reason: &str) -> Self {
        Self::new(format!("Failed to start listing command: \"{}\"", cmd))
            .with_context(format!("In {}: {}", cwd.display(), reason))
            .with_suggestions([
                "Check that the shell (sh) is on your PATH".to_string(),
                format!("Run it by hand: cd {} && {}", cwd.display(), cmd),
            ])
    }

    /// The listing command ran but exited unsuccessfully
    pub fn listing_failed(cmd: &str, cwd: &Path, status: &str, stderr: &str) -> Self {
        let mut context = format!("In {}: {}", cwd.display(), status);
        if !stderr.is_empty() {
            context.push_str(&format!("\n{}", stderr));
        }
        Self::new(format!("Listing command failed: \"{}\"", cmd))
            .with_context(context)
            .with_suggestions([
                format!("Run it by hand: cd {} && {}", cwd.display(), cmd),
                "Pick another rule explicitly: sift <rule>".to_string(),
                "Fix or lower the priority of the rule in your config".to_string(),
            ])
    }

    /// The terminal could not be set up for the picker
    pub fn terminal(details: &str) -> Self {
        Self::new(format!("Terminal error: {}", details))
            .with_context("The interactive picker needs a terminal on stderr and stdin")
            .with_suggestion("Rank without the picker: sift --filter <query>")
    }
}

impl From<SiftError> for HelpfulError {
    fn from(err: SiftError) -> Self {
        match err {
            SiftError::UnknownRule { name, available } => Self::unknown_rule(&name, &available),
            SiftError::Spawn { cmd, cwd, source } => Self::spawn_failed(&cmd, &cwd, &source.to_string()),
            SiftError::Listing {
                cmd,
                cwd,
                status,
                stderr,
            } => Self::listing_failed(&cmd, &cwd, &status, &stderr),
            SiftError::Terminal(details) => Self::terminal(&details),
            err @ (SiftError::Config(_) | SiftError::RuleConfig { .. }) => {
                Self::invalid_config(None, &err.to_string())
            }
            SiftError::Io(err) => Self::new(format!("IO error: {}", err)),
        }
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;
        if let Some(context) = self.context.as_deref() {
            writeln!(f, "CONTEXT: {}", context)?;
        }
        for (i, hint) in self.suggestions.iter().enumerate() {
            if i == 0 {
                writeln!(f)?;
            }
            writeln!(f, "  TRY: {}", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for HelpfulError {}
