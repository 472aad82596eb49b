use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use super::{ArgValidation, Operation, OperationExample, OperationParameter, OperationRoute};
use crate::error::ArgError;
use crate::git::{CloneOps, CommitOps, PullOps, RemoteOps};
use crate::process::ProcessRunner;
use crate::response::OperationResult;
use crate::scheduler::{DEFAULT_BRANCH, DEFAULT_COMMIT_MESSAGE};

/// Fold argument errors into a failed result
fn run(f: impl FnOnce() -> Result<OperationResult, ArgError>) -> Value {
    f().unwrap_or_else(OperationResult::from).to_value()
}

/// Checks a GitHub URL and that its canonical clone URL answers
pub struct HandleGithubImportOperation {
    runner: Arc<dyn ProcessRunner>,
}

impl HandleGithubImportOperation {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }
}

impl Operation for HandleGithubImportOperation {
    fn name(&self) -> &'static str {
        "handle_github_import"
    }

    fn description(&self) -> &'static str {
        "Validate a GitHub repository URL and test connectivity to its HTTPS clone URL"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![OperationParameter::required(
            "url",
            "https://github.com/<owner>/<repo> or git@github.com:<owner>/<repo>.git",
        )]
    }

    fn examples(&self) -> Vec<OperationExample> {
        vec![OperationExample {
            description: "Check that a public repository is reachable".to_string(),
            http_curl: r#"curl -X POST http://localhost:8765/api/handle_github_import -H "Content-Type: application/json" -d '{"args": ["https://github.com/acme/widgets"]}'"#.to_string(),
        }]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![OperationRoute::post("/api/handle_github_import")]
    }

    fn execute(&self, args: &[Value]) -> Value {
        run(|| {
            let url = ArgValidation::extract_string(args, 0, "url")?;
            Ok(RemoteOps::handle_import(self.runner.as_ref(), &url))
        })
    }
}

pub struct TestGithubConnectionOperation {
    runner: Arc<dyn ProcessRunner>,
}

impl TestGithubConnectionOperation {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }
}

impl Operation for TestGithubConnectionOperation {
    fn name(&self) -> &'static str {
        "test_github_connection"
    }

    fn description(&self) -> &'static str {
        "List the remote's heads; succeeds when the remote answers"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![OperationParameter::required("url", "Remote URL")]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![OperationRoute::post("/api/test_github_connection")]
    }

    fn execute(&self, args: &[Value]) -> Value {
        run(|| {
            let url = ArgValidation::extract_string(args, 0, "url")?;
            Ok(RemoteOps::test_connection(self.runner.as_ref(), &url))
        })
    }
}

pub struct GitCloneOperation {
    runner: Arc<dyn ProcessRunner>,
}

impl GitCloneOperation {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }
}

impl Operation for GitCloneOperation {
    fn name(&self) -> &'static str {
        "git_clone"
    }

    fn description(&self) -> &'static str {
        "Clone a repository into a target directory"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![
            OperationParameter::required("url", "Repository URL"),
            OperationParameter::required("target", "Directory to clone into"),
        ]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![OperationRoute::post("/api/git_clone")]
    }

    fn execute(&self, args: &[Value]) -> Value {
        run(|| {
            ArgValidation::require_args(args, 2, self.name())?;
            let url = ArgValidation::extract_string(args, 0, "url")?;
            let target = ArgValidation::extract_string(args, 1, "target")?;
            Ok(CloneOps::clone(self.runner.as_ref(), &url, Path::new(&target)))
        })
    }
}

pub struct GitPullOperation {
    runner: Arc<dyn ProcessRunner>,
}

impl GitPullOperation {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }
}

impl Operation for GitPullOperation {
    fn name(&self) -> &'static str {
        "git_pull"
    }

    fn description(&self) -> &'static str {
        "Pull into a repository, optionally pointing origin at a remote URL first"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![
            OperationParameter::required("path", "Repository directory"),
            OperationParameter::optional("remote_url", "URL to set as origin before pulling"),
        ]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![OperationRoute::post("/api/git_pull")]
    }

    fn execute(&self, args: &[Value]) -> Value {
        run(|| {
            let path = ArgValidation::extract_string(args, 0, "path")?;
            let remote_url = ArgValidation::extract_optional_string(args, 1);
            Ok(PullOps::pull(self.runner.as_ref(), Path::new(&path), remote_url.as_deref()))
        })
    }
}

pub struct AssociateGitRepoOperation {
    runner: Arc<dyn ProcessRunner>,
}

impl AssociateGitRepoOperation {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }
}

impl Operation for AssociateGitRepoOperation {
    fn name(&self) -> &'static str {
        "associate_git_repo"
    }

    fn description(&self) -> &'static str {
        "Initialize the directory as a repository when needed and point origin at the remote URL"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![
            OperationParameter::required("path", "Directory to associate"),
            OperationParameter::required("remote_url", "URL for origin"),
        ]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![OperationRoute::post("/api/associate_git_repo")]
    }

    fn execute(&self, args: &[Value]) -> Value {
        run(|| {
            ArgValidation::require_args(args, 2, self.name())?;
            let path = ArgValidation::extract_string(args, 0, "path")?;
            let remote_url = ArgValidation::extract_string(args, 1, "remote_url")?;
            Ok(RemoteOps::associate(self.runner.as_ref(), Path::new(&path), &remote_url))
        })
    }
}

pub struct GitCommitOperation {
    runner: Arc<dyn ProcessRunner>,
}

impl GitCommitOperation {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }
}

impl Operation for GitCommitOperation {
    fn name(&self) -> &'static str {
        "git_commit"
    }

    fn description(&self) -> &'static str {
        "Stage all changes and commit them; an empty changeset is reported as success"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![
            OperationParameter::required("path", "Repository directory"),
            OperationParameter::optional("message", "Commit message, \"auto commit\" when omitted"),
        ]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![OperationRoute::post("/api/git_commit")]
    }

    fn execute(&self, args: &[Value]) -> Value {
        run(|| {
            let path = ArgValidation::extract_string(args, 0, "path")?;
            let message = ArgValidation::extract_string_or_default(args, 1, DEFAULT_COMMIT_MESSAGE);
            Ok(CommitOps::commit(self.runner.as_ref(), Path::new(&path), &message))
        })
    }
}

pub struct GitPushOperation {
    runner: Arc<dyn ProcessRunner>,
}

impl GitPushOperation {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }
}

impl Operation for GitPushOperation {
    fn name(&self) -> &'static str {
        "git_push"
    }

    fn description(&self) -> &'static str {
        "Push a branch to origin"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![
            OperationParameter::required("path", "Repository directory"),
            OperationParameter::optional("branch", "Branch to push, \"main\" when omitted"),
        ]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![OperationRoute::post("/api/git_push")]
    }

    fn execute(&self, args: &[Value]) -> Value {
        run(|| {
            let path = ArgValidation::extract_string(args, 0, "path")?;
            let branch = ArgValidation::extract_string_or_default(args, 1, DEFAULT_BRANCH);
            Ok(CommitOps::push(self.runner.as_ref(), Path::new(&path), &branch))
        })
    }
}

pub struct GitCommitAndPushOperation {
    runner: Arc<dyn ProcessRunner>,
}

impl GitCommitAndPushOperation {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }
}

impl Operation for GitCommitAndPushOperation {
    fn name(&self) -> &'static str {
        "git_commit_and_push"
    }

    fn description(&self) -> &'static str {
        "Commit all changes, then push; nothing is pushed when the commit fails"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![
            OperationParameter::required("path", "Repository directory"),
            OperationParameter::optional("message", "Commit message"),
            OperationParameter::optional("branch", "Branch to push"),
        ]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![OperationRoute::post("/api/git_commit_and_push")]
    }

    fn execute(&self, args: &[Value]) -> Value {
        run(|| {
            let path = ArgValidation::extract_string(args, 0, "path")?;
            let message = ArgValidation::extract_string_or_default(args, 1, DEFAULT_COMMIT_MESSAGE);
            let branch = ArgValidation::extract_string_or_default(args, 2, DEFAULT_BRANCH);
            Ok(CommitOps::commit_and_push(
                self.runner.as_ref(),
                Path::new(&path),
                &message,
                &branch,
            ))
        })
    }
}
