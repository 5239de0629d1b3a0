//! Rule selection for a working directory.
//!
//! Rules are evaluated in priority-descending order, with definition order
//! breaking ties. The first eligible rule is the answer, so detection
//! commands for lower-ranked rules never run once a match is found. When
//! nothing is eligible the synthetic [`Rule::fallback`] is returned; the
//! selector never fails for automatic selection.

use super::{Rule, RuleSet, DEFAULT_RULE};
use crate::error::{Result, SiftError};
use crate::exec::CommandRunner;
use crate::paths;
use std::path::Path;
use tracing::{debug, info, warn};

/// How the rule was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Named explicitly by the caller
    Explicit,
    /// Eligible through its detection command
    Detected,
    /// Eligible because the directory is under its `root_path`
    RootPath,
    /// The configured `default` rule
    Default,
    /// Nothing was eligible; the synthetic `find .` rule
    Fallback,
}

/// Chooses the rule that governs a directory.
pub struct RuleSelector<'a, R> {
    rules: &'a RuleSet,
    runner: R,
}

impl<'a, R: CommandRunner> RuleSelector<'a, R> {
    pub fn new(rules: &'a RuleSet, runner: R) -> Self {
        Self { rules, runner }
    }

    /// Rules that take part in automatic selection, in evaluation order.
    pub fn evaluation_order(&self) -> Vec<&'a Rule> {
        let mut ordered: Vec<&Rule> = self.rules.iter().filter(|r| !r.is_manual()).collect();
        // Stable sort keeps definition order among equal priorities.
        ordered.sort_by(|a, b| b.priority.cmp(&a.priority));
        ordered
    }

    /// Pick the rule for `dir`.
    pub fn select(&self, dir: &Path) -> (Rule, Selection) {
        for rule in self.evaluation_order() {
            if let Some(how) = self.eligibility(rule, dir) {
                info!(rule = %rule.name, priority = rule.priority, how = ?how, "selected rule");
                return (rule.clone(), how);
            }
        }

        info!(dir = %dir.display(), "no eligible rule, using fallback");
        (Rule::fallback(), Selection::Fallback)
    }

    /// Look a rule up by name, regardless of priority or detection.
    pub fn select_named(&self, name: &str) -> Result<(Rule, Selection)> {
        self.rules
            .get(name)
            .map(|rule| (rule.clone(), Selection::Explicit))
            .ok_or_else(|| SiftError::UnknownRule {
                name: name.to_string(),
                available: self.rules.names(),
            })
    }

    /// Why `rule` applies to `dir`, or `None` when it does not.
    ///
    /// A detection command that cannot be spawned makes the rule ineligible.
    pub fn eligibility(&self, rule: &Rule, dir: &Path) -> Option<Selection> {
        if let Some(detect_cmd) = rule.detect_cmd.as_deref() {
            let cwd = rule.working_dir(dir);
            return match self.runner.probe(detect_cmd, cwd) {
                Ok(true) => Some(Selection::Detected),
                Ok(false) => {
                    debug!(rule = %rule.name, detect_cmd, "detection did not match");
                    None
                }
                Err(err) => {
                    warn!(
                        rule = %rule.name,
                        detect_cmd,
                        cwd = %cwd.display(),
                        error = %err,
                        "detection command failed to start"
                    );
                    None
                }
            };
        }

        if let Some(root) = rule.root_path.as_deref() {
            let inside = paths::is_within(dir, root);
            debug!(rule = %rule.name, root = %root.display(), inside, "root path check");
            return inside.then_some(Selection::RootPath);
        }

        (rule.name == DEFAULT_RULE).then_some(Selection::Default)
    }
}
