use serde_json::{Value, json};
use std::sync::Arc;

use super::{ArgValidation, Operation, OperationParameter, OperationRoute};
use crate::process::ProcessRunner;
use crate::shell;

/// Runs a terminal command; `cd` only moves the returned working directory
pub struct ExecuteCommandOperation {
    runner: Arc<dyn ProcessRunner>,
}

impl ExecuteCommandOperation {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }
}

impl Operation for ExecuteCommandOperation {
    fn name(&self) -> &'static str {
        "execute_command"
    }

    fn description(&self) -> &'static str {
        "Run a command line in a working directory and return {output, error, cwd}"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![
            OperationParameter::required("command", "Command line to run"),
            OperationParameter::optional("cwd", "Working directory, the server's current directory when omitted"),
        ]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![OperationRoute::post("/api/execute_command")]
    }

    fn execute(&self, args: &[Value]) -> Value {
        let command = match ArgValidation::extract_string(args, 0, "command") {
            Ok(command) => command,
            Err(e) => return json!({ "output": "", "error": e.to_string(), "cwd": "" }),
        };
        let cwd = ArgValidation::extract_optional_string(args, 1);
        let result = shell::execute_command(self.runner.as_ref(), &command, cwd.as_deref());
        serde_json::to_value(result).unwrap_or_default()
    }
}
