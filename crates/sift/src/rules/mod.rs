//! Scan rules: what to list for a directory and when a rule applies.
//!
//! Rules come from a TOML document where every top-level table is one rule:
//!
//! ```toml
//! cache_ttl_secs = 3600
//!
//! [git]
//! detect_cmd = "git rev-parse"
//! cmd = "git ls-files"
//! priority = 10
//!
//! [default]
//! cmd = "find . -type f"
//! ```
//!
//! Data-oriented design: [`Rule`] is a plain record and [`selector`] holds
//! the single selection algorithm that interprets it.

pub mod selector;

use crate::error::{Result, SiftError};
use crate::paths;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use selector::{RuleSelector, Selection};

/// Name of the universal fallback rule.
pub const DEFAULT_RULE: &str = "default";

/// Name of the built-in manual-only rule that lists directories.
pub const DIRS_ONLY_RULE: &str = "dirs-only";

/// Built-in configuration used when no config file exists.
pub const BUILTIN_CONFIG: &str = include_str!("../default_config.toml");

/// One named scan rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    /// Listing command; never empty
    pub cmd: String,
    /// Exit status 0 marks the rule eligible
    pub detect_cmd: Option<String>,
    /// Working directory for commands, and the subtree this rule covers
    pub root_path: Option<PathBuf>,
    /// Higher wins; negative means manual-only
    pub priority: i64,
    /// Newline-delimited cache of the listing output
    pub cache: Option<PathBuf>,
}

impl Rule {
    /// A rule with only a name and a listing command.
    pub fn new(name: impl Into<String>, cmd: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cmd: cmd.into(),
            detect_cmd: None,
            root_path: None,
            priority: 0,
            cache: None,
        }
    }

    /// Rule used when nothing in the configuration is eligible.
    pub fn fallback() -> Self {
        Self {
            priority: i64::MIN,
            ..Self::new("fallback", "find .")
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_detect_cmd(mut self, detect_cmd: impl Into<String>) -> Self {
        self.detect_cmd = Some(detect_cmd.into());
        self
    }

    pub fn with_root_path(mut self, root_path: impl Into<PathBuf>) -> Self {
        self.root_path = Some(root_path.into());
        self
    }

    pub fn with_cache(mut self, cache: impl Into<PathBuf>) -> Self {
        self.cache = Some(cache.into());
        self
    }

    /// Manual-only rules are skipped by automatic selection.
    pub fn is_manual(&self) -> bool {
        self.priority < 0
    }

    /// Directory the rule's commands run in when invoked from `cwd`.
    pub fn working_dir<'a>(&'a self, cwd: &'a Path) -> &'a Path {
        self.root_path.as_deref().unwrap_or(cwd)
    }
}

/// Settings that apply to every rule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Cache lifetime; when unset, caches are checked against the config file
    pub cache_ttl: Option<Duration>,
}

/// Ordered, immutable collection of rules.
///
/// Definition order is kept: it is the tie-break between equal priorities.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    settings: Settings,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    cmd: Option<String>,
    detect_cmd: Option<String>,
    root_path: Option<String>,
    priority: Option<RawPriority>,
    cache: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPriority {
    Int(i64),
    Text(String),
}

impl RuleSet {
    /// Parse configuration text, expanding paths against the process
    /// environment.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with(text, |raw| paths::expand(raw))
    }

    /// Parse configuration text with a caller-supplied path expander.
    pub fn parse_with<F>(text: &str, expand: F) -> Result<Self>
    where
        F: Fn(&str) -> PathBuf,
    {
        let table: toml::Table = text
            .parse()
            .map_err(|e: toml::de::Error| SiftError::Config(e.message().to_string()))?;

        let mut rules = Vec::new();
        let mut settings = Settings::default();

        for (key, value) in table {
            match value {
                toml::Value::Table(section) => {
                    if rules.iter().any(|r: &Rule| r.name == key) {
                        return Err(SiftError::rule_config(&key, "duplicate rule name"));
                    }
                    rules.push(parse_rule(&key, section, &expand)?);
                }
                toml::Value::Integer(secs) if key == "cache_ttl_secs" => {
                    let secs = u64::try_from(secs).map_err(|_| {
                        SiftError::Config("cache_ttl_secs must not be negative".to_string())
                    })?;
                    settings.cache_ttl = Some(Duration::from_secs(secs));
                }
                _ => {}
            }
        }

        Ok(Self { rules, settings })
    }

    /// Rules built directly, in the given order.
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            settings: Settings::default(),
        }
    }

    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_CONFIG)
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

fn parse_rule<F>(name: &str, section: toml::Table, expand: &F) -> Result<Rule>
where
    F: Fn(&str) -> PathBuf,
{
    if name.trim().is_empty() {
        return Err(SiftError::Config("rule names must not be empty".to_string()));
    }

    let raw: RawRule = toml::Value::Table(section)
        .try_into()
        .map_err(|e: toml::de::Error| SiftError::rule_config(name, e.message()))?;

    let cmd = raw
        .cmd
        .map(|c| join_lines(&c))
        .filter(|c| !c.is_empty())
        .ok_or_else(|| SiftError::rule_config(name, "missing required key 'cmd'"))?;

    let priority = match raw.priority {
        None => 0,
        Some(RawPriority::Int(p)) => p,
        Some(RawPriority::Text(text)) => text.trim().parse().map_err(|_| {
            SiftError::rule_config(name, format!("priority must be an integer, got '{}'", text))
        })?,
    };

    Ok(Rule {
        name: name.to_string(),
        cmd,
        detect_cmd: raw.detect_cmd.map(|c| join_lines(&c)).filter(|c| !c.is_empty()),
        root_path: raw.root_path.as_deref().map(expand),
        priority,
        cache: raw.cache.as_deref().map(expand),
    })
}

/// Multi-line commands are one shell line with the breaks turned into spaces.
fn join_lines(cmd: &str) -> String {
    cmd.trim().replace("\r\n", " ").replace('\n', " ")
}
