pub mod commit_ops_tests;
pub mod pull_ops_tests;
pub mod remote_ops_tests;

use std::path::Path;
use tempfile::TempDir;

/// Helper function to create a directory that looks like a repository
pub fn create_test_repo() -> TempDir {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(temp_dir.path().join(".git")).unwrap();
    temp_dir
}

/// Helper function to create a test file
pub fn create_test_file(path: &Path, content: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(path.parent().unwrap())?;
    std::fs::write(path, content)
}
