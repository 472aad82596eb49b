use std::path::Path;
use tracing::{error, info, warn};

use crate::git::repository::RepositoryRef;
use crate::git::url::parse_remote_url;
use crate::git::utils::GitUtils;
use crate::process::{CommandOutput, ProcessRunner};
use crate::response::OperationResult;

/// Remote-facing git operations: connectivity checks, imports and `origin` management
pub struct RemoteOps;

impl RemoteOps {
    /// List the remote's heads; reachable iff the command exits with zero
    pub fn test_connection(runner: &dyn ProcessRunner, url: &str) -> OperationResult {
        info!("Testing connection to {}", url);
        let output = runner.run(&GitUtils::command(&["ls-remote", "--heads", url]), None);
        if output.success() {
            info!("Remote {} is reachable", url);
        } else {
            warn!("Remote {} is not reachable: {}", url, output.stderr.trim());
        }
        GitUtils::result_from(&output, "Connection failed")
    }

    /// Validate a GitHub URL and check that its canonical clone URL is reachable
    pub fn handle_import(runner: &dyn ProcessRunner, url: &str) -> OperationResult {
        let Some(remote) = parse_remote_url(url) else {
            warn!("Rejected import of unrecognized URL: {}", url);
            return OperationResult::failure(format!("Invalid GitHub URL: {url}"));
        };

        let clone_url = remote.https_clone_url();
        Self::test_connection(runner, &clone_url)
            .with_field("owner", remote.owner)
            .with_field("repo", remote.repo)
            .with_field("clone_url", clone_url)
    }

    /// Make `repo_path` a repository whose `origin` points at `remote_url`,
    /// running `git init` first when no metadata exists.
    pub fn associate(runner: &dyn ProcessRunner, repo_path: &Path, remote_url: &str) -> OperationResult {
        let repo = RepositoryRef::new(repo_path).with_remote(remote_url);
        if let Err(e) = repo.validate_directory() {
            return OperationResult::failure(e);
        }

        if !repo.has_git_metadata() {
            info!("No git metadata in {:?}, initializing repository", repo.path());
            let init = runner.run(&GitUtils::command(&["init"]), Some(repo.path()));
            if !init.success() {
                error!("git init failed in {:?}: {}", repo.path(), init.stderr.trim());
                return OperationResult::failure(GitUtils::error_text(&init, "Failed to initialize repository"));
            }
        }

        let output = Self::ensure_origin(runner, repo.path(), remote_url);
        if output.success() {
            info!("Associated {:?} with {}", repo.path(), remote_url);
        }
        GitUtils::result_from(&output, "Failed to associate remote")
    }

    /// True when `git remote -v` lists a remote named `origin`
    pub fn has_origin(runner: &dyn ProcessRunner, repo_path: &Path) -> bool {
        let output = runner.run(&GitUtils::command(&["remote", "-v"]), Some(repo_path));
        output
            .stdout
            .lines()
            .any(|line| line.split_whitespace().next() == Some("origin"))
    }

    /// Add `origin`, or repoint it when it already exists
    pub fn ensure_origin(runner: &dyn ProcessRunner, repo_path: &Path, remote_url: &str) -> CommandOutput {
        let args = if Self::has_origin(runner, repo_path) {
            ["remote", "set-url", "origin", remote_url]
        } else {
            ["remote", "add", "origin", remote_url]
        };
        runner.run(&GitUtils::command(&args), Some(repo_path))
    }
}
