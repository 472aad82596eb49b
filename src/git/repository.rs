use std::path::{Path, PathBuf};

/// A local repository location plus the remote it should track.
///
/// Nothing about the directory is cached: every check hits the filesystem again, so a
/// repository deleted between two operations is reported correctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    path: PathBuf,
    remote_url: Option<String>,
}

impl RepositoryRef {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            remote_url: None,
        }
    }

    pub fn with_remote(mut self, remote_url: impl Into<String>) -> Self {
        self.remote_url = Some(remote_url.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn remote_url(&self) -> Option<&str> {
        self.remote_url.as_deref()
    }

    pub fn git_dir(&self) -> PathBuf {
        self.path.join(".git")
    }

    /// True when the directory carries git metadata (`.git` directory or gitfile)
    pub fn has_git_metadata(&self) -> bool {
        self.git_dir().exists()
    }

    /// The path must exist and be a directory
    pub fn validate_directory(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("Repository path is empty".to_string());
        }
        if !self.path.exists() {
            return Err(format!("Path does not exist: {}", self.path.display()));
        }
        if !self.path.is_dir() {
            return Err(format!("Path is not a directory: {}", self.path.display()));
        }
        Ok(())
    }

    /// The path must be a directory that already holds git metadata
    pub fn validate_repository(&self) -> Result<(), String> {
        self.validate_directory()?;
        if !self.has_git_metadata() {
            return Err(format!("Not a git repository: {}", self.path.display()));
        }
        Ok(())
    }
}
