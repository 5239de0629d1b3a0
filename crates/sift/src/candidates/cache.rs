//! Listing cache files and their freshness policy.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;

/// When a cache file may stand in for running the listing command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachePolicy {
    /// Usable if at least as new as the reference file (normally the config).
    /// Without a reference, an existing cache is usable.
    NewerThan(Option<PathBuf>),
    /// Usable while younger than the given age
    MaxAge(Duration),
    /// Usable whenever it exists
    Always,
    /// Never read; still written after a listing
    Never,
}

impl Default for CachePolicy {
    fn default() -> Self {
        CachePolicy::NewerThan(None)
    }
}

impl CachePolicy {
    /// Policy for a loaded configuration: a TTL when configured, otherwise
    /// compare against the config file.
    pub fn for_config(config_path: Option<&Path>, ttl: Option<Duration>) -> Self {
        match ttl {
            Some(ttl) => CachePolicy::MaxAge(ttl),
            None => CachePolicy::NewerThan(config_path.map(Path::to_path_buf)),
        }
    }

    /// Decide whether `cache` is usable right now.
    pub fn is_usable(&self, cache: &Path) -> io::Result<bool> {
        if !cache.is_file() {
            return Ok(false);
        }
        match self {
            CachePolicy::Never => Ok(false),
            CachePolicy::Always => Ok(true),
            CachePolicy::NewerThan(None) => Ok(true),
            CachePolicy::NewerThan(Some(reference)) => {
                if !reference.exists() {
                    return Ok(true);
                }
                is_at_least_as_new(cache, reference)
            }
            CachePolicy::MaxAge(max_age) => {
                let modified = fs::metadata(cache)?.modified()?;
                // A timestamp in the future counts as age zero.
                let age = SystemTime::now()
                    .duration_since(modified)
                    .unwrap_or(Duration::ZERO);
                Ok(age < *max_age)
            }
        }
    }
}

/// True if `path` was modified no earlier than `reference`.
pub fn is_at_least_as_new(path: &Path, reference: &Path) -> io::Result<bool> {
    let modified = fs::metadata(path)?.modified()?;
    let reference_modified = fs::metadata(reference)?.modified()?;
    Ok(modified >= reference_modified)
}

/// Read newline-delimited entries from a cache file.
pub fn read_lines(cache: &Path) -> io::Result<String> {
    fs::read_to_string(cache)
}

/// Replace the cache atomically: write a sibling temp file, then rename it.
pub fn write_lines<'a, I>(cache: &Path, lines: I) -> io::Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let dir = match cache.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = io::BufWriter::new(tmp.as_file_mut());
        for line in lines {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
    }
    tmp.persist(cache).map_err(|e| e.error)?;
    Ok(())
}
