use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the YAML settings store
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("Invalid key path: {0}")]
    InvalidKeyPath(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("Settings file {} does not parse: {1}", .0.display())]
    Corrupt(PathBuf, serde_yaml::Error),
}

/// Errors raised by filesystem helpers before they are folded into a result
#[derive(Debug, Error)]
pub enum FileError {
    #[error("Path does not exist: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("Path is not a file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("Failed to read file: {0}")]
    ReadFailed(#[source] std::io::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors raised by the auto-commit scheduler
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Failed to spawn auto-commit thread: {0}")]
    SpawnFailed(#[source] std::io::Error),
    #[error("No auto-commit task found for id {0}")]
    TaskNotFound(String),
    #[error("Invalid task handle: {0}")]
    InvalidHandle(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Errors raised while decoding positional operation arguments
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgError {
    #[error("{operation} requires at least {required} arguments")]
    Missing { operation: String, required: usize },
    #[error("Argument {position} must be {expected} ({name})")]
    WrongType {
        position: usize,
        expected: &'static str,
        name: String,
    },
}
