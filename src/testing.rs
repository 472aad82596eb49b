//! Test doubles for the process runner.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::process::{CommandOutput, ProcessRunner};

type Responder = Box<dyn Fn(&str, Option<&Path>) -> CommandOutput + Send + Sync>;

/// One recorded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub command: String,
    pub cwd: Option<PathBuf>,
}

/// A [`ProcessRunner`] that records every command and answers from a script.
///
/// Rules are checked in insertion order; the first rule whose prefix matches the
/// command line wins. Unmatched commands succeed with empty output unless a fallback
/// responder is installed.
pub struct ScriptedRunner {
    rules: Vec<(String, CommandOutput)>,
    fallback: Option<Responder>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer commands starting with `prefix` with `output`
    pub fn on(mut self, prefix: impl Into<String>, output: CommandOutput) -> Self {
        self.rules.push((prefix.into(), output));
        self
    }

    /// Answer commands starting with `prefix` with a successful exit and `stdout`
    pub fn succeed(self, prefix: impl Into<String>, stdout: impl Into<String>) -> Self {
        self.on(prefix, CommandOutput::new(stdout, "", 0))
    }

    /// Answer commands starting with `prefix` with exit code 1 and `stderr`
    pub fn fail(self, prefix: impl Into<String>, stderr: impl Into<String>) -> Self {
        self.on(prefix, CommandOutput::new("", stderr, 1))
    }

    /// Responder for commands no rule matches
    pub fn otherwise<F>(mut self, responder: F) -> Self
    where
        F: Fn(&str, Option<&Path>) -> CommandOutput + Send + Sync + 'static,
    {
        self.fallback = Some(Box::new(responder));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.command).collect()
    }

    /// Number of recorded commands starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.commands().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, command: &str, cwd: Option<&Path>) -> CommandOutput {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                command: command.to_string(),
                cwd: cwd.map(Path::to_path_buf),
            });
        }

        // Responders run outside the lock so a panicking responder cannot poison it
        if let Some((_, output)) = self.rules.iter().find(|(prefix, _)| command.starts_with(prefix.as_str())) {
            return output.clone();
        }
        match &self.fallback {
            Some(responder) => responder(command, cwd),
            None => CommandOutput::default(),
        }
    }
}
