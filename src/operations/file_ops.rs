use serde_json::Value;

use super::{ArgValidation, Operation, OperationExample, OperationParameter, OperationRoute};
use crate::files;
use crate::response::OperationResult;

/// Lists the entries of a directory
#[derive(Clone)]
pub struct GetFilesOperation;

impl Operation for GetFilesOperation {
    fn name(&self) -> &'static str {
        "get_files"
    }

    fn description(&self) -> &'static str {
        "List a directory with size, formatted size, modification time and kind for each entry"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![OperationParameter::required("path", "Directory to list")]
    }

    fn examples(&self) -> Vec<OperationExample> {
        vec![OperationExample {
            description: "List the home directory".to_string(),
            http_curl: r#"curl -X POST http://localhost:8765/api/get_files -H "Content-Type: application/json" -d '{"args": ["/home/me"]}'"#.to_string(),
        }]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![OperationRoute::post("/api/get_files")]
    }

    fn execute(&self, args: &[Value]) -> Value {
        match ArgValidation::extract_string(args, 0, "path") {
            Ok(path) => files::get_files(&path).to_value(),
            Err(e) => OperationResult::from(e).to_value(),
        }
    }
}

/// Reads a text file. Returns the text itself, or the error text.
#[derive(Clone)]
pub struct ReadOperation;

impl Operation for ReadOperation {
    fn name(&self) -> &'static str {
        "read"
    }

    fn description(&self) -> &'static str {
        "Read a UTF-8 text file; the result is the file text or an error message"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![OperationParameter::required("file_path", "File to read")]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![OperationRoute::post("/api/read")]
    }

    fn execute(&self, args: &[Value]) -> Value {
        match ArgValidation::extract_string(args, 0, "file_path") {
            Ok(path) => Value::String(files::read(&path)),
            Err(e) => Value::String(e.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct ListPathsOperation;

impl Operation for ListPathsOperation {
    fn name(&self) -> &'static str {
        "list_paths"
    }

    fn description(&self) -> &'static str {
        "List well-known locations: working directory, home, user folders, mounts and drives"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![
            OperationRoute::get("/api/list_paths"),
            OperationRoute::post("/api/list_paths"),
        ]
    }

    fn execute(&self, _args: &[Value]) -> Value {
        files::list_paths().to_value()
    }
}

#[derive(Clone)]
pub struct IsGitRepositoryOperation;

impl Operation for IsGitRepositoryOperation {
    fn name(&self) -> &'static str {
        "is_git_repository"
    }

    fn description(&self) -> &'static str {
        "True when the directory contains a .git directory"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![OperationParameter::required("path", "Directory to check")]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![OperationRoute::post("/api/is_git_repository")]
    }

    fn execute(&self, args: &[Value]) -> Value {
        let path = ArgValidation::extract_string(args, 0, "path").unwrap_or_default();
        Value::Bool(files::is_git_repository(&path))
    }
}
