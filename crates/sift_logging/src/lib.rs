//! Logging and home-directory helpers for the sift binary.
//!
//! The picker owns the terminal while it runs and prints its selection on
//! stdout, so log output has to stay out of both. Everything goes to a
//! size-capped file under `$SIFT_HOME/logs`; stderr only sees errors while
//! the TUI is up (or everything when `--verbose` is passed).

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "sift=info,sift_logging=info";
const VERBOSE_LOG_FILTER: &str = "sift=debug";
/// Current file plus four rotated generations
const ROTATED_GENERATIONS: usize = 4;
const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Logging configuration for a sift process.
pub struct LogConfig<'a> {
    /// Log file stem, e.g. `sift` for `sift.log`
    pub app_name: &'a str,
    pub verbose: bool,
    /// Interactive picker on screen; keep stderr quiet
    pub tui_mode: bool,
}

/// Install the global subscriber: a size-capped file layer plus stderr.
///
/// A missing or unwritable log directory is not fatal: the process keeps
/// running with stderr logging only.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let stderr_filter = stderr_filter(config.verbose, config.tui_mode, rust_log.as_deref());
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(stderr_filter);

    let file_layer = match ensure_logs_dir().and_then(|dir| {
        RotatingFile::open(&dir, config.app_name, ROTATED_GENERATIONS, MAX_LOG_BYTES)
            .with_context(|| format!("Failed to open log file in {}", dir.display()))
    }) {
        Ok(file) => Some(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(env_filter_or(DEFAULT_LOG_FILTER)),
        ),
        Err(err) => {
            eprintln!("Warning: file logging disabled: {:#}", err);
            None
        }
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Failed to install tracing subscriber")
}

/// Console filter: errors only under the TUI unless `--verbose`, otherwise
/// `rust_log` when it parses, falling back to `warn` (or debug when verbose).
fn stderr_filter(verbose: bool, tui_mode: bool, rust_log: Option<&str>) -> EnvFilter {
    let fallback = match (verbose, tui_mode) {
        (true, _) => VERBOSE_LOG_FILTER,
        (false, true) => return EnvFilter::new("error"),
        (false, false) => "warn",
    };
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback))
}

/// `RUST_LOG` when set and valid, otherwise `fallback`.
fn env_filter_or(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Get the sift home directory: `$SIFT_HOME`, else `~/.sift`.
///
/// Returns `None` only when neither the override nor a home directory is
/// available.
pub fn sift_home() -> Option<PathBuf> {
    match std::env::var_os("SIFT_HOME") {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => dirs::home_dir().map(|home| home.join(".sift")),
    }
}

/// Get the logs directory: `<sift home>/logs`
pub fn logs_dir() -> Option<PathBuf> {
    sift_home().map(|home| home.join("logs"))
}

/// Create the logs directory if needed and return it.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir().context("Could not determine home directory")?;
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

/// Append-only log file that rolls over at `max_bytes`.
///
/// Rolled files are `<name>.log.1` (newest) to `<name>.log.<keep>` (oldest).
/// With `keep == 0` the file is truncated instead.
struct RotatingFile {
    path: PathBuf,
    keep: usize,
    max_bytes: u64,
    written: u64,
    file: File,
}

impl RotatingFile {
    fn open(dir: &Path, name: &str, keep: usize, max_bytes: u64) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.log", file_stem(name)));
        let (file, written) = open_append(&path)?;
        let mut log = Self {
            path,
            keep,
            max_bytes,
            written,
            file,
        };
        if log.written > log.max_bytes {
            log.roll()?;
        }
        Ok(log)
    }

    fn generation(&self, n: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{}", n));
        PathBuf::from(name)
    }

    fn roll(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.keep == 0 {
            self.file.set_len(0)?;
            self.written = 0;
            return Ok(());
        }

        remove_if_exists(&self.generation(self.keep))?;
        for n in (1..self.keep).rev() {
            rename_if_exists(&self.generation(n), &self.generation(n + 1))?;
        }
        fs::rename(&self.path, self.generation(1))?;

        let (file, written) = open_append(&self.path)?;
        self.file = file;
        self.written = written;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // An oversized record still goes into a fresh file rather than looping.
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.roll()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<(File, u64)> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let len = file.metadata()?.len();
    Ok((file, len))
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn rename_if_exists(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Keep log file names to `[A-Za-z0-9_-]`.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|ch| match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => ch,
            _ => '_',
        })
        .collect();
    if stem.is_empty() {
        "sift".to_string()
    } else {
        stem
    }
}
