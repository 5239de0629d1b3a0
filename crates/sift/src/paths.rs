//! Path expansion for rule settings.
//!
//! `root_path` and `cache` accept `~`, `$VAR` and `${VAR}`. Expansion is
//! lexical: nothing here touches the filesystem except [`resolve_dir`].

use std::path::{Component, Path, PathBuf};

/// Expand `~` and environment variables using the process environment.
pub fn expand(raw: &str) -> PathBuf {
    expand_with(raw, dirs::home_dir().as_deref(), |name| std::env::var(name).ok())
}

/// Expand `~` (against `home`) and `$VAR` / `${VAR}` (through `lookup`),
/// then normalise `.` and `..` lexically.
///
/// Unset variables are left as written. `~user` forms are not supported and
/// pass through untouched.
pub fn expand_with<F>(raw: &str, home: Option<&Path>, lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let vars_expanded = expand_vars(raw, &lookup);

    let tilde_expanded = match home {
        Some(home) if vars_expanded == "~" => home.to_path_buf(),
        Some(home) if vars_expanded.starts_with("~/") => home.join(&vars_expanded[2..]),
        _ => PathBuf::from(vars_expanded),
    };

    normalize(&tilde_expanded)
}

fn expand_vars<F>(raw: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];

        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };

        match (name.is_empty(), lookup(name)) {
            (false, Some(value)) => out.push_str(&value),
            _ => out.push_str(&rest[dollar..dollar + 1 + consumed]),
        }
        rest = &after[consumed..];
    }

    out.push_str(rest);
    out
}

/// Remove `.` components and fold `..` into its parent without consulting
/// the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Canonicalise a directory if it exists, otherwise normalise it lexically.
pub fn resolve_dir(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| normalize(path))
}

/// True if `dir` is `root` or lies beneath it, compared component-wise.
pub fn is_within(dir: &Path, root: &Path) -> bool {
    resolve_dir(dir).starts_with(resolve_dir(root))
}
