use std::path::Path;
use tracing::{error, info};

use crate::git::utils::GitUtils;
use crate::process::ProcessRunner;
use crate::response::OperationResult;

/// Clone operations
pub struct CloneOps;

impl CloneOps {
    /// Clone `url` into `target_path`. Git's own error text is returned on failure.
    pub fn clone(runner: &dyn ProcessRunner, url: &str, target_path: &Path) -> OperationResult {
        if url.trim().is_empty() {
            return OperationResult::failure("Repository URL is empty");
        }

        let target = target_path.to_string_lossy();
        info!("Cloning {} into {}", url, target);
        let output = runner.run(&GitUtils::command(&["clone", url, &*target]), None);

        if output.success() {
            info!("Clone of {} completed", url);
            // git clone reports progress on stderr, stdout is usually empty
            let text = if output.stdout.trim().is_empty() { &output.stderr } else { &output.stdout };
            OperationResult::ok()
                .with_output(text.clone())
                .with_field("path", target.into_owned())
        } else {
            error!("Clone of {} failed: {}", url, output.stderr.trim());
            OperationResult::failure(GitUtils::error_text(&output, "Clone failed"))
        }
    }
}
