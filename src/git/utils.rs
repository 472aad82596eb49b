use crate::process::{CommandOutput, quote_arg};
use crate::response::OperationResult;

/// Helpers shared by the git operation modules
pub struct GitUtils;

impl GitUtils {
    /// Build a `git` command line with each argument quoted for the runner
    pub fn command(args: &[&str]) -> String {
        let mut line = String::from("git");
        for arg in args {
            line.push(' ');
            line.push_str(&quote_arg(arg));
        }
        line
    }

    /// Translate a finished process into a result, reporting stderr verbatim on failure
    pub fn result_from(output: &CommandOutput, fallback_error: &str) -> OperationResult {
        if output.success() {
            OperationResult::ok().with_output(output.stdout.clone())
        } else {
            OperationResult::failure(Self::error_text(output, fallback_error))
        }
    }

    /// Stderr when present, else stdout, else the fallback
    pub fn error_text(output: &CommandOutput, fallback_error: &str) -> String {
        let stderr = output.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = output.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        fallback_error.to_string()
    }
}
