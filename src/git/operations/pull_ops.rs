use std::path::Path;
use tracing::{error, info, warn};

use super::remote_ops::RemoteOps;
use crate::git::repository::RepositoryRef;
use crate::git::utils::GitUtils;
use crate::process::{CommandOutput, ProcessRunner};
use crate::response::OperationResult;

/// Branches tried, in order, when the current branch has no upstream
const FALLBACK_BRANCHES: [&str; 2] = ["main", "master"];

/// Pull operations for git repositories
pub struct PullOps;

impl PullOps {
    /// Pull into `repo_path`, pointing `origin` at `remote_url` first when given.
    ///
    /// A pull that fails only because the branch tracks nothing is retried against
    /// `origin/main`, `origin/master`, then the first remote branch git knows about.
    pub fn pull(runner: &dyn ProcessRunner, repo_path: &Path, remote_url: Option<&str>) -> OperationResult {
        let repo = RepositoryRef::new(repo_path);
        if let Err(e) = repo.validate_repository() {
            return OperationResult::failure(e);
        }

        if let Some(url) = remote_url.filter(|u| !u.trim().is_empty()) {
            let output = RemoteOps::ensure_origin(runner, repo.path(), url);
            if !output.success() {
                warn!("Could not point origin at {}: {}", url, output.stderr.trim());
            }
        }

        info!("Pulling in {:?}", repo.path());
        let output = runner.run(&GitUtils::command(&["pull"]), Some(repo.path()));
        if output.success() {
            info!("Pull completed in {:?}", repo.path());
            return GitUtils::result_from(&output, "Pull failed");
        }

        if Self::is_missing_tracking(&output) {
            info!("Current branch has no upstream, trying fallback branches");
            if let Some((branch, retry)) = Self::pull_fallback(runner, repo.path()) {
                info!("Pulled origin/{} in {:?}", branch, repo.path());
                return GitUtils::result_from(&retry, "Pull failed").with_field("branch", branch);
            }
        }

        error!("Pull failed in {:?}: {}", repo.path(), output.stderr.trim());
        OperationResult::failure(GitUtils::error_text(&output, "Pull failed"))
    }

    fn is_missing_tracking(output: &CommandOutput) -> bool {
        output.combined().to_lowercase().contains("no tracking information")
    }

    /// Returns the branch and output of the first explicit pull that succeeds
    fn pull_fallback(runner: &dyn ProcessRunner, repo_path: &Path) -> Option<(String, CommandOutput)> {
        let mut tried: Vec<String> = Vec::new();

        for branch in FALLBACK_BRANCHES {
            tried.push(branch.to_string());
            let output = runner.run(&GitUtils::command(&["pull", "origin", branch]), Some(repo_path));
            if output.success() {
                return Some((branch.to_string(), output));
            }
        }

        let branch = Self::first_remote_branch(runner, repo_path)?;
        if tried.contains(&branch) {
            return None;
        }
        let output = runner.run(&GitUtils::command(&["pull", "origin", &branch]), Some(repo_path));
        output.success().then_some((branch, output))
    }

    /// First entry of `git branch -r`, with the remote prefix stripped
    fn first_remote_branch(runner: &dyn ProcessRunner, repo_path: &Path) -> Option<String> {
        let output = runner.run(&GitUtils::command(&["branch", "-r"]), Some(repo_path));
        if !output.success() {
            return None;
        }
        output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.contains("->"))
            .map(|line| line.split_once('/').map_or(line, |(_, branch)| branch).to_string())
            .next()
    }
}
