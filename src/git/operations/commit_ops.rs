use std::path::Path;
use tracing::{error, info};

use crate::git::repository::RepositoryRef;
use crate::git::utils::GitUtils;
use crate::process::ProcessRunner;
use crate::response::OperationResult;

/// Phrase git prints when a commit finds no staged changes
pub const NOTHING_TO_COMMIT: &str = "nothing to commit";

/// Commit and push operations
pub struct CommitOps;

impl CommitOps {
    /// Stage everything and commit it with `message`.
    ///
    /// Git exits non-zero when there is nothing to commit; that case is reported as a
    /// success with an explanatory message.
    pub fn commit(runner: &dyn ProcessRunner, repo_path: &Path, message: &str) -> OperationResult {
        let repo = RepositoryRef::new(repo_path);
        if let Err(e) = repo.validate_repository() {
            return OperationResult::failure(e);
        }

        let add = runner.run(&GitUtils::command(&["add", "."]), Some(repo.path()));
        if !add.success() {
            error!("git add failed in {:?}: {}", repo.path(), add.stderr.trim());
            return OperationResult::failure(GitUtils::error_text(&add, "Failed to stage changes"));
        }

        let output = runner.run(&GitUtils::command(&["commit", "-m", message]), Some(repo.path()));
        if output.success() {
            info!("Committed changes in {:?}", repo.path());
            return OperationResult::ok()
                .with_output(output.stdout)
                .with_message("Changes committed");
        }

        if output.combined().to_lowercase().contains(NOTHING_TO_COMMIT) {
            info!("Nothing to commit in {:?}", repo.path());
            return OperationResult::ok()
                .with_output(output.stdout.trim().to_string())
                .with_message("Nothing to commit, working tree clean");
        }

        error!("git commit failed in {:?}: {}", repo.path(), output.stderr.trim());
        OperationResult::failure(GitUtils::error_text(&output, "Commit failed"))
    }

    /// Push `branch` to `origin`
    pub fn push(runner: &dyn ProcessRunner, repo_path: &Path, branch: &str) -> OperationResult {
        let repo = RepositoryRef::new(repo_path);
        if let Err(e) = repo.validate_repository() {
            return OperationResult::failure(e);
        }
        if branch.trim().is_empty() {
            return OperationResult::failure("Branch name is empty");
        }

        let output = runner.run(&GitUtils::command(&["push", "origin", branch]), Some(repo.path()));
        if output.success() {
            info!("Pushed {} to origin from {:?}", branch, repo.path());
            // Push progress and "Everything up-to-date" go to stderr
            let text = if output.stdout.trim().is_empty() { output.stderr } else { output.stdout };
            return OperationResult::ok()
                .with_output(text)
                .with_message(format!("Pushed {branch} to origin"));
        }

        error!("git push of {} failed in {:?}: {}", branch, repo.path(), output.stderr.trim());
        OperationResult::failure(GitUtils::error_text(&output, "Push failed"))
    }

    /// Commit, then push. A failed commit returns immediately and nothing is pushed.
    pub fn commit_and_push(
        runner: &dyn ProcessRunner,
        repo_path: &Path,
        message: &str,
        branch: &str,
    ) -> OperationResult {
        let commit = Self::commit(runner, repo_path, message);
        if !commit.success {
            return commit;
        }
        Self::push(runner, repo_path, branch)
    }
}
