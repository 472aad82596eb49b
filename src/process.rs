//! External process invocation.
//!
//! Every git call and every shell command typed into the web view goes through a
//! [`ProcessRunner`]. The runner never fails: spawn errors come back as an exit code of
//! `-1` with the error text on stderr, so callers only ever branch on the exit code.

use std::borrow::Cow;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Outcome of one command invocation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// Output recorded when the child could not be started at all
    pub fn spawn_failure(error: impl Into<String>) -> Self {
        Self::new("", error, -1)
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout and stderr concatenated, used when scanning for known messages
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Runs a command line in a working directory.
/// Implementations may spawn real processes or replay scripted output in tests.
pub trait ProcessRunner: Send + Sync {
    /// Run `command` in `cwd` (the process's current directory when `None`) and
    /// block until the child exits.
    fn run(&self, command: &str, cwd: Option<&Path>) -> CommandOutput;
}

/// Runner backed by `std::process::Command`.
///
/// On Windows the command line is handed to `cmd /C` unchanged. Elsewhere it is split
/// with POSIX shell-word rules and executed directly, without an intermediate shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self
    }

    #[cfg(windows)]
    fn build_command(command: &str) -> Result<Command, String> {
        use std::os::windows::process::CommandExt;

        let mut cmd = Command::new("cmd");
        cmd.arg("/C").raw_arg(command);
        Ok(cmd)
    }

    #[cfg(not(windows))]
    fn build_command(command: &str) -> Result<Command, String> {
        let words = shlex::split(command)
            .ok_or_else(|| format!("Unable to parse command line: {command}"))?;
        let (program, args) = words
            .split_first()
            .ok_or_else(|| "Empty command".to_string())?;
        let mut cmd = Command::new(program);
        cmd.args(args);
        Ok(cmd)
    }
}

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, command: &str, cwd: Option<&Path>) -> CommandOutput {
        let mut cmd = match Self::build_command(command) {
            Ok(cmd) => cmd,
            Err(e) => {
                warn!("Rejected command '{}': {}", command, e);
                return CommandOutput::spawn_failure(e);
            }
        };

        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        debug!("Running '{}' in {:?}", command, cwd);

        let output = match cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to spawn '{}': {}", command, e);
                return CommandOutput::spawn_failure(e.to_string());
            }
        };

        CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            // Killed by a signal: no exit code to report
            exit_code: output.status.code().unwrap_or(-1),
        }
    }
}

/// Quote a single argument so it survives the runner's command-line splitting.
#[cfg(not(windows))]
pub fn quote_arg(arg: &str) -> Cow<'_, str> {
    match shlex::try_quote(arg) {
        Ok(quoted) => quoted,
        // Only interior NUL bytes are unquotable; they cannot reach argv anyway
        Err(_) => Cow::Owned(
            shlex::try_quote(&arg.replace('\0', ""))
                .map(Cow::into_owned)
                .unwrap_or_default(),
        ),
    }
}

/// Quote a single argument so it survives the runner's command-line splitting.
#[cfg(windows)]
pub fn quote_arg(arg: &str) -> Cow<'_, str> {
    if !arg.is_empty() && !arg.contains([' ', '\t', '"', '&', '|', '<', '>', '^']) {
        return Cow::Borrowed(arg);
    }
    Cow::Owned(format!("\"{}\"", arg.replace('"', "\\\"")))
}
