//! Binary-level tests for the non-interactive modes.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn sift_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_sift"))
}

/// Isolated home and project directories for one CLI run
struct TestEnv {
    _temp: TempDir,
    home: PathBuf,
    project: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let root = temp.path().canonicalize().expect("canonicalize temp dir");
        let home = root.join("sift_home");
        let project = root.join("project");
        fs::create_dir_all(&home).expect("create home");
        fs::create_dir_all(&project).expect("create project");
        Self {
            _temp: temp,
            home,
            project,
        }
    }

    fn write_project(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.project.join(rel);
        fs::write(&path, contents).expect("write project file");
        path
    }

    fn write_config(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.home.join(name);
        fs::write(&path, contents).expect("write config");
        path
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(sift_bin())
            .args(args)
            .current_dir(&self.project)
            .env("SIFT_HOME", &self.home)
            .env_remove("SIFT_CONFIG")
            .env_remove("RUST_LOG")
            .output()
            .expect("failed to execute sift")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command failed\nstdout:\n{}\nstderr:\n{}",
        stdout(output),
        stderr(output)
    );
}

const LISTED_CONFIG: &str = r#"
[default]
cmd = "cat items.txt"
"#;

fn listed_env() -> (TestEnv, PathBuf) {
    let env = TestEnv::new();
    env.write_project("items.txt", "domain.py\nmainframe.c\nmain.py\nREADME\n");
    let config = env.write_config("listed.toml", LISTED_CONFIG);
    (env, config)
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

#[test]
fn test_filter_prints_ranked_matches() {
    let (env, config) = listed_env();
    let output = env.run(&["--config", path_arg(&config), "--filter", "main"]);

    assert_success(&output);
    assert_eq!(stdout(&output), "main.py\nmainframe.c\ndomain.py\n");
}

#[test]
fn test_filter_without_matches_succeeds_with_empty_output() {
    let (env, config) = listed_env();
    let output = env.run(&["--config", path_arg(&config), "--filter", "zzz"]);

    assert_success(&output);
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_config_in_sift_home_is_used_by_default() {
    let env = TestEnv::new();
    env.write_project("items.txt", "from-home\n");
    env.write_config("config.toml", LISTED_CONFIG);

    let output = env.run(&["--filter", ""]);
    assert_success(&output);
    assert_eq!(stdout(&output), "from-home\n");
}

#[test]
fn test_sift_config_env_overrides_home() {
    let env = TestEnv::new();
    env.write_project("items.txt", "listed\n");
    env.write_config("config.toml", "[default]\ncmd = \"echo home\"\n");
    let other = env.write_config("other.toml", "[default]\ncmd = \"echo env\"\n");

    let output = Command::new(sift_bin())
        .args(["--filter", ""])
        .current_dir(&env.project)
        .env("SIFT_HOME", &env.home)
        .env("SIFT_CONFIG", &other)
        .output()
        .expect("failed to execute sift");
    assert_success(&output);
    assert_eq!(stdout(&output), "env\n");
}

#[test]
fn test_explicit_rule_overrides_detection() {
    let env = TestEnv::new();
    let config = env.write_config(
        "rules.toml",
        r#"
[always]
detect_cmd = "true"
cmd = "echo detected"
priority = 100

[manual]
cmd = "echo chosen"
priority = -5
"#,
    );

    let output = env.run(&["--config", path_arg(&config), "--filter", ""]);
    assert_success(&output);
    assert_eq!(stdout(&output), "detected\n");

    let output = env.run(&["--config", path_arg(&config), "--filter", "", "manual"]);
    assert_success(&output);
    assert_eq!(stdout(&output), "chosen\n");
}

#[test]
fn test_unknown_rule_fails_with_help() {
    let (env, config) = listed_env();
    let output = env.run(&["--config", path_arg(&config), "--filter", "x", "nope"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    let err = stderr(&output);
    assert!(err.contains("ERROR: Unknown rule: 'nope'"), "{}", err);
    assert!(err.contains("default"), "{}", err);
}

#[test]
fn test_failing_listing_command_fails() {
    let env = TestEnv::new();
    let config = env.write_config(
        "broken.toml",
        "[default]\ncmd = \"echo 'listing exploded' >&2; exit 4\"\n",
    );
    let output = env.run(&["--config", path_arg(&config), "--filter", ""]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    let err = stderr(&output);
    assert!(err.contains("Listing command failed"), "{}", err);
    assert!(err.contains("exit status: 4"), "{}", err);
    assert!(err.contains("listing exploded"), "{}", err);
}

#[test]
fn test_invalid_config_fails_before_listing() {
    let env = TestEnv::new();
    let marker = env.project.join("ran");
    let config = env.write_config(
        "invalid.toml",
        &format!(
            "[good]\ncmd = \"touch {}\"\n\n[bad]\ndetect_cmd = \"true\"\n",
            marker.display()
        ),
    );
    let output = env.run(&["--config", path_arg(&config), "--filter", ""]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid configuration"));
    assert!(!marker.exists());
}

#[test]
fn test_missing_config_flag_fails() {
    let env = TestEnv::new();
    let output = env.run(&["--config", "/nonexistent/sift.toml", "--filter", ""]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Config file not found"));
}

#[test]
fn test_list_rules_marks_selected_rule() {
    let env = TestEnv::new();
    env.write_project(".marker", "");
    let config = env.write_config(
        "rules.toml",
        r#"
[marked]
detect_cmd = "test -f .marker"
cmd = "ls"
priority = 2

[default]
cmd = "ls"

[dirs]
cmd = "find . -type d"
priority = -1
"#,
    );

    let output = env.run(&["--config", path_arg(&config), "--list-rules"]);
    assert_success(&output);
    let out = stdout(&output);
    let rows: Vec<&str> = out.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(rows.len(), 3, "{}", out);
    assert!(rows[0].starts_with("* marked"), "{}", out);
    assert!(rows[1].starts_with("  default"), "{}", out);
    assert!(rows[2].starts_with("  dirs"), "{}", out);
    assert!(rows[2].contains("manual"), "{}", out);
}

#[test]
fn test_print_config_is_a_valid_starting_point() {
    let env = TestEnv::new();
    let output = env.run(&["--print-config"]);
    assert_success(&output);

    let printed = stdout(&output);
    assert!(printed.contains("[git]"));
    assert!(printed.contains("[default]"));

    // Feeding it back in works.
    let config = env.write_config("printed.toml", &printed);
    env.write_project("a.txt", "");
    let output = env.run(&["--config", path_arg(&config), "--filter", "a.txt"]);
    assert_success(&output);
    assert!(stdout(&output).lines().any(|l| l.ends_with("a.txt")));
}

#[test]
fn test_cache_is_reused_until_rescan() {
    let env = TestEnv::new();
    env.write_project("items.txt", "first\n");
    let cache = env.home.join("cache").join("items.list");
    let config = env.write_config(
        "cached.toml",
        &format!(
            "cache_ttl_secs = 3600\n[default]\ncmd = \"cat items.txt\"\ncache = \"{}\"\n",
            cache.display()
        ),
    );

    let output = env.run(&["--config", path_arg(&config), "--filter", ""]);
    assert_success(&output);
    assert_eq!(stdout(&output), "first\n");
    assert_eq!(fs::read_to_string(&cache).unwrap(), "first\n");

    env.write_project("items.txt", "second\n");
    let output = env.run(&["--config", path_arg(&config), "--filter", ""]);
    assert_eq!(stdout(&output), "first\n");

    let output = env.run(&["--config", path_arg(&config), "--filter", "", "--rescan"]);
    assert_eq!(stdout(&output), "second\n");
}

#[test]
fn test_logs_are_written_under_sift_home() {
    let (env, config) = listed_env();
    let output = env.run(&["--config", path_arg(&config), "--filter", "main"]);
    assert_success(&output);
    assert!(env.home.join("logs").is_dir());
}
