//! Candidate listing for a selected rule.
//!
//! A rule's candidates come from its cache file when the cache is usable,
//! otherwise from running its `cmd`. The result is an immutable
//! [`CandidateList`] the matcher can walk as often as it likes.

pub mod cache;

use crate::error::{Result, SiftError};
use crate::exec::CommandRunner;
use crate::rules::Rule;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub use cache::CachePolicy;

/// One line of text to match against
pub type Candidate = Arc<str>;

/// Shared, immutable candidate list in listing order
#[derive(Debug, Clone, Default)]
pub struct CandidateList {
    items: Arc<[Candidate]>,
}

impl CandidateList {
    /// Split listing output into candidates: one per non-blank line,
    /// surrounding whitespace trimmed.
    pub fn from_output(output: &str) -> Self {
        output
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.items
    }
}

impl Deref for CandidateList {
    type Target = [Candidate];

    fn deref(&self) -> &[Candidate] {
        &self.items
    }
}

impl<'a> FromIterator<&'a str> for CandidateList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Arc::from).collect(),
        }
    }
}

impl From<Vec<String>> for CandidateList {
    fn from(lines: Vec<String>) -> Self {
        Self {
            items: lines.into_iter().map(Arc::from).collect(),
        }
    }
}

/// Where a candidate list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Command,
}

/// Produces candidates for rules, consulting caches per a [`CachePolicy`].
pub struct CandidateSource<R> {
    runner: R,
    policy: CachePolicy,
    rescan: bool,
}

impl<R: CommandRunner> CandidateSource<R> {
    pub fn new(runner: R, policy: CachePolicy) -> Self {
        Self {
            runner,
            policy,
            rescan: false,
        }
    }

    /// Ignore existing caches and always run the listing command.
    pub fn rescan(mut self, rescan: bool) -> Self {
        self.rescan = rescan;
        self
    }

    /// Candidates for `rule` invoked from `cwd`.
    pub fn obtain(&self, rule: &Rule, cwd: &Path) -> Result<CandidateList> {
        self.obtain_with_origin(rule, cwd).map(|(list, _)| list)
    }

    pub fn obtain_with_origin(&self, rule: &Rule, cwd: &Path) -> Result<(CandidateList, Origin)> {
        if let Some(cache) = rule.cache.as_deref() {
            if let Some(list) = self.read_cache(rule, cache) {
                return Ok((list, Origin::Cache));
            }
        }

        let list = self.run_listing(rule, cwd)?;

        if let Some(cache) = rule.cache.as_deref() {
            match cache::write_lines(cache, list.iter().map(|c| &**c)) {
                Ok(()) => debug!(rule = %rule.name, cache = %cache.display(), "cache written"),
                Err(err) => warn!(
                    rule = %rule.name,
                    cache = %cache.display(),
                    error = %err,
                    "failed to write cache"
                ),
            }
        }

        Ok((list, Origin::Command))
    }

    /// Cache contents when usable; IO problems count as a miss.
    fn read_cache(&self, rule: &Rule, cache: &Path) -> Option<CandidateList> {
        if self.rescan {
            debug!(rule = %rule.name, "rescan requested, skipping cache");
            return None;
        }

        let usable = match self.policy.is_usable(cache) {
            Ok(usable) => usable,
            Err(err) => {
                warn!(cache = %cache.display(), error = %err, "cache freshness check failed");
                false
            }
        };
        if !usable {
            debug!(rule = %rule.name, cache = %cache.display(), "cache miss");
            return None;
        }

        match cache::read_lines(cache) {
            Ok(text) => {
                let list = CandidateList::from_output(&text);
                debug!(rule = %rule.name, count = list.len(), "cache hit");
                Some(list)
            }
            Err(err) => {
                warn!(cache = %cache.display(), error = %err, "failed to read cache");
                None
            }
        }
    }

    fn run_listing(&self, rule: &Rule, cwd: &Path) -> Result<CandidateList> {
        let dir = rule.working_dir(cwd);
        let start = Instant::now();

        let output = self.runner.run(&rule.cmd, dir).map_err(|source| SiftError::Spawn {
            cmd: rule.cmd.clone(),
            cwd: dir.to_path_buf(),
            source,
        })?;

        if !output.success() {
            return Err(SiftError::Listing {
                cmd: rule.cmd.clone(),
                cwd: dir.to_path_buf(),
                status: output.status_text(),
                stderr: output.stderr_text(),
            });
        }

        let list = CandidateList::from_output(&String::from_utf8_lossy(&output.stdout));
        info!(
            rule = %rule.name,
            count = list.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "listing finished"
        );
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{CommandOutput, ShellRunner};
    use std::cell::Cell;
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    /// Returns canned stdout and counts invocations.
    struct CountingRunner {
        stdout: String,
        code: i32,
        calls: Cell<usize>,
    }

    impl CountingRunner {
        fn new(stdout: &str) -> Self {
            Self {
                stdout: stdout.to_string(),
                code: 0,
                calls: Cell::new(0),
            }
        }
    }

    impl CommandRunner for CountingRunner {
        fn run(&self, _cmd: &str, _cwd: &Path) -> io::Result<CommandOutput> {
            self.calls.set(self.calls.get() + 1);
            Ok(CommandOutput {
                code: Some(self.code),
                stdout: self.stdout.clone().into_bytes(),
                stderr: b"boom\n".to_vec(),
            })
        }
    }

    #[test]
    fn test_from_output_splits_and_trims() {
        let list = CandidateList::from_output("a.txt\r\n  b.txt \n\n\nsub dir/c.txt\n");
        let items: Vec<&str> = list.iter().map(|c| &**c).collect();
        assert_eq!(items, vec!["a.txt", "b.txt", "sub dir/c.txt"]);
    }

    #[test]
    fn test_empty_output_is_empty_list() {
        let runner = CountingRunner::new("");
        let source = CandidateSource::new(&runner, CachePolicy::default());
        let list = source.obtain(&Rule::new("r", "true"), Path::new("/")).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_listing_failure_is_error() {
        let runner = CountingRunner {
            code: 2,
            ..CountingRunner::new("partial\n")
        };
        let source = CandidateSource::new(&runner, CachePolicy::default());
        let err = source.obtain(&Rule::new("r", "lister"), Path::new("/tmp")).unwrap_err();
        match err {
            SiftError::Listing { cmd, status, stderr, .. } => {
                assert_eq!(cmd, "lister");
                assert_eq!(status, "exit status: 2");
                assert_eq!(stderr, "boom");
            }
            other => panic!("expected listing error, got {:?}", other),
        }
    }

    #[test]
    fn test_cache_written_then_reused() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache/list");
        let rule = Rule::new("r", "lister").with_cache(&cache);
        let runner = CountingRunner::new("one\ntwo\n");
        let source = CandidateSource::new(&runner, CachePolicy::Always);

        let (first, origin) = source.obtain_with_origin(&rule, temp.path()).unwrap();
        assert_eq!(origin, Origin::Command);
        assert_eq!(first.len(), 2);
        assert_eq!(fs::read_to_string(&cache).unwrap(), "one\ntwo\n");

        let (second, origin) = source.obtain_with_origin(&rule, temp.path()).unwrap();
        assert_eq!(origin, Origin::Cache);
        assert_eq!(second.as_slice(), first.as_slice());
        assert_eq!(runner.calls.get(), 1);
    }

    #[test]
    fn test_rescan_bypasses_cache() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("list");
        fs::write(&cache, "stale\n").unwrap();
        let rule = Rule::new("r", "lister").with_cache(&cache);
        let runner = CountingRunner::new("hi\n");

        let list = CandidateSource::new(&runner, CachePolicy::Always)
            .obtain(&rule, temp.path())
            .unwrap();
        assert_eq!(&*list[0], "stale");
        assert_eq!(runner.calls.get(), 0);

        let list = CandidateSource::new(&runner, CachePolicy::Always)
            .rescan(true)
            .obtain(&rule, temp.path())
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(&*list[0], "hi");
        assert_eq!(fs::read_to_string(&cache).unwrap(), "hi\n");
    }

    #[test]
    fn test_unreadable_cache_is_a_miss() {
        let temp = TempDir::new().unwrap();
        // A directory where the cache file should be: reads fail, listing still works.
        let cache = temp.path().join("list");
        fs::create_dir(&cache).unwrap();
        let rule = Rule::new("r", "lister").with_cache(&cache);
        let runner = CountingRunner::new("x\n");

        let list = CandidateSource::new(&runner, CachePolicy::Always)
            .obtain(&rule, temp.path())
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(runner.calls.get(), 1);
    }

    #[test]
    fn test_real_command_runs_in_root_path() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("root");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("sub/file.rs"), "").unwrap();

        let rule = Rule::new("r", "find . -type f").with_root_path(&root);
        let list = CandidateSource::new(ShellRunner::new(), CachePolicy::Never)
            .obtain(&rule, Path::new("/"))
            .unwrap();
        assert_eq!(list.as_slice(), &[Arc::<str>::from("./sub/file.rs")]);
    }

    #[test]
    fn test_missing_working_dir_is_spawn_error() {
        let rule = Rule::new("r", "true").with_root_path("/nonexistent/sift/root");
        let err = CandidateSource::new(ShellRunner::new(), CachePolicy::Never)
            .obtain(&rule, Path::new("/"))
            .unwrap_err();
        assert!(matches!(err, SiftError::Spawn { .. }));
    }
}
