//! `--list-rules` and `--print-config`

use anyhow::Result;
use sift::rules::BUILTIN_CONFIG;
use sift::{Rule, RuleSelector, RuleSet, Selection, ShellRunner};
use std::io::{self, Write};
use std::path::Path;

use crate::cli::config::{ConfigSource, LoadedConfig};

/// Print every rule in evaluation order, marking the one selected for `cwd`.
pub fn list(config: &LoadedConfig, cwd: &Path) -> Result<()> {
    let selector = RuleSelector::new(&config.rules, ShellRunner::new());
    let (selected, how) = selector.select(cwd);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &config.source {
        ConfigSource::Builtin => writeln!(out, "# rules: built-in")?,
        source => {
            if let Some(path) = source.path() {
                writeln!(out, "# rules: {}", path.display())?;
            }
        }
    }
    write_rules(&mut out, &config.rules, &selector.evaluation_order(), &selected, how)?;
    Ok(())
}

/// Write the rule table: automatic rules in evaluation order, then
/// manual-only rules in definition order, then the fallback if it was chosen.
pub fn write_rules<W: Write>(
    out: &mut W,
    rules: &RuleSet,
    ordered: &[&Rule],
    selected: &Rule,
    how: Selection,
) -> io::Result<()> {
    let fallback = Rule::fallback();
    let mut rows: Vec<&Rule> = ordered.to_vec();
    rows.extend(rules.iter().filter(|r| r.is_manual()));
    if how == Selection::Fallback {
        rows.push(&fallback);
    }

    let name_width = rows.iter().map(|r| r.name.chars().count()).max().unwrap_or(0);
    for rule in rows {
        // The synthetic fallback may share its name with a configured rule.
        let is_selected = match how {
            Selection::Fallback => std::ptr::eq(rule, &fallback),
            _ => rule.name == selected.name,
        };
        let marker = if is_selected { '*' } else { ' ' };
        let priority = if rule.priority == i64::MIN {
            "-".to_string()
        } else {
            rule.priority.to_string()
        };
        writeln!(
            out,
            "{} {:<name_width$}  {:>6}  {:<18}  {}",
            marker,
            rule.name,
            priority,
            flags(rule),
            rule.cmd,
            name_width = name_width
        )?;
    }
    Ok(())
}

fn flags(rule: &Rule) -> String {
    let mut flags = Vec::new();
    if rule.is_manual() && rule.priority != i64::MIN {
        flags.push("manual");
    }
    if rule.detect_cmd.is_some() {
        flags.push("detect");
    }
    if rule.root_path.is_some() {
        flags.push("root");
    }
    if rule.cache.is_some() {
        flags.push("cache");
    }
    flags.join(",")
}

/// Write the built-in config to stdout.
pub fn print_config() -> Result<()> {
    io::stdout().write_all(BUILTIN_CONFIG.as_bytes())?;
    Ok(())
}
