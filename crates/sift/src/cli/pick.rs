//! Rule selection, candidate listing and the two ways of picking from them

use anyhow::{Context, Result};
use sift::{paths, CandidateList, CandidateSource, Matcher, Rule, RuleSelector, Selection, SessionController, ShellRunner};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::config::LoadedConfig;
use crate::cli::error::HelpfulError;

/// Options shared by the picker and `--filter`
#[derive(Debug, Clone, Default)]
pub struct PickArgs {
    pub rule: Option<String>,
    pub rescan: bool,
    pub filter: Option<String>,
}

/// Working directory with symlinks resolved.
pub fn current_dir() -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    Ok(paths::resolve_dir(&cwd))
}

/// The explicitly named rule, or the one selected for `cwd`.
pub fn select_rule(config: &LoadedConfig, name: Option<&str>, cwd: &Path) -> Result<(Rule, Selection)> {
    let selector = RuleSelector::new(&config.rules, ShellRunner::new());
    match name {
        Some(name) => Ok(selector.select_named(name).map_err(HelpfulError::from)?),
        None => Ok(selector.select(cwd)),
    }
}

/// Candidates for `rule`, read from its cache or by running its listing command.
pub fn list_candidates(config: &LoadedConfig, rule: &Rule, cwd: &Path, rescan: bool) -> Result<CandidateList> {
    let source = CandidateSource::new(ShellRunner::new(), config.cache_policy()).rescan(rescan);
    Ok(source.obtain(rule, cwd).map_err(HelpfulError::from)?)
}

/// Run the selection flow and print the outcome on stdout.
pub fn run(config: &LoadedConfig, args: PickArgs) -> Result<()> {
    let cwd = current_dir()?;
    let (rule, selection) = select_rule(config, args.rule.as_deref(), &cwd)?;
    let candidates = list_candidates(config, &rule, &cwd, args.rescan)?;
    info!(rule = %rule.name, how = ?selection, candidates = candidates.len(), "candidates ready");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match args.filter {
        Some(query) => write_filtered(&mut out, &query, &candidates)?,
        None => {
            let session = SessionController::new(candidates, Matcher::default());
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            if let Some(selected) = rt.block_on(super::tui::run(session, &rule.name))? {
                writeln!(out, "{}", selected)?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

/// Rank `candidates` against `query` and write the matches, best first.
pub fn write_filtered<W: Write>(out: &mut W, query: &str, candidates: &CandidateList) -> io::Result<()> {
    for ranked in Matcher::default().rank(query, candidates) {
        writeln!(out, "{}", ranked.candidate)?;
    }
    Ok(())
}
