//! Process execution for detection and listing commands.
//!
//! Commands are shell strings run through `sh -c` with a caller-chosen
//! working directory. The [`CommandRunner`] trait is the seam tests use to
//! count or script executions.

use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::time::Instant;
use tracing::debug;

/// Captured result of a finished command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Human-readable exit status for diagnostics.
    pub fn status_text(&self) -> String {
        match self.code {
            Some(code) => format!("exit status: {}", code),
            None => "terminated by signal".to_string(),
        }
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Runs shell commands on behalf of rule detection and candidate listing.
pub trait CommandRunner {
    /// Run `cmd` to completion in `cwd`, capturing stdout.
    ///
    /// An `Err` means the command could not be started at all.
    fn run(&self, cmd: &str, cwd: &Path) -> io::Result<CommandOutput>;

    /// Run `cmd` for its exit status only; output is discarded.
    fn probe(&self, cmd: &str, cwd: &Path) -> io::Result<bool> {
        self.run(cmd, cwd).map(|output| output.success())
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, cmd: &str, cwd: &Path) -> io::Result<CommandOutput> {
        (**self).run(cmd, cwd)
    }

    fn probe(&self, cmd: &str, cwd: &Path) -> io::Result<bool> {
        (**self).probe(cmd, cwd)
    }
}

/// Runs commands through `sh -c`.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
        }
    }
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different POSIX-compatible shell (e.g. `bash`).
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    fn command(&self, cmd: &str, cwd: &Path) -> Command {
        let mut command = Command::new(&self.shell);
        command.arg("-c").arg(cmd).current_dir(cwd).stdin(Stdio::null());
        command
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, cmd: &str, cwd: &Path) -> io::Result<CommandOutput> {
        let start = Instant::now();
        // `output()` waits for the child, so it is reaped on every path.
        let output = self
            .command(cmd, cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;
        debug!(
            cmd,
            cwd = %cwd.display(),
            code = ?output.status.code(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "command finished"
        );
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn probe(&self, cmd: &str, cwd: &Path) -> io::Result<bool> {
        let status: ExitStatus = self
            .command(cmd, cwd)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        Ok(status.success())
    }
}
