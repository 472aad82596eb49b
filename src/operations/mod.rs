mod args;
mod auto_commit_ops;
mod file_ops;
mod git_ops;
mod registry;
mod settings_ops;
mod shell_op;

pub use args::ArgValidation;
pub use auto_commit_ops::{ListAutoCommitTasksOperation, SetupAutoCommitPushOperation, StopAutoCommitPushOperation};
pub use file_ops::{GetFilesOperation, IsGitRepositoryOperation, ListPathsOperation, ReadOperation};
pub use git_ops::{
    AssociateGitRepoOperation, GitCloneOperation, GitCommitAndPushOperation, GitCommitOperation, GitPullOperation,
    GitPushOperation, HandleGithubImportOperation, TestGithubConnectionOperation,
};
pub use registry::OperationRegistry;
pub use settings_ops::{
    AddAllowedExtensionOperation, GetConfigPathOperation, GetSettingsOperation, RemoveAllowedExtensionOperation,
    SavePathOperation, UpdateSettingsOperation,
};
pub use shell_op::ExecuteCommandOperation;

// Re-export common types from crate::types
pub use crate::types::OperationRequest;

use axum::http::Method;
use serde_json::Value;
use std::sync::Arc;

use crate::config::Config;
use crate::error::ArgError;
use crate::process::{ProcessRunner, SystemProcessRunner};
use crate::response::OperationResult;
use crate::scheduler::AutoCommitScheduler;
use crate::settings::SettingsStore;

#[derive(Debug, Clone)]
pub struct OperationRoute {
    pub path: String,
    pub method: Method,
    pub is_json: bool, // Whether to expect a JSON `{args}` body
}

impl OperationRoute {
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: Method::POST,
            is_json: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: Method::GET,
            is_json: false,
        }
    }
}

/// Describes a positional parameter for an operation
#[derive(Debug, Clone)]
pub struct OperationParameter {
    pub name: String,
    pub description: String,
    pub required: bool,
}

impl OperationParameter {
    pub fn required(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required: true,
        }
    }

    pub fn optional(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required: false,
        }
    }
}

/// Provides an example of how to call an operation
#[derive(Debug, Clone)]
pub struct OperationExample {
    pub description: String,
    pub http_curl: String,
}

pub trait Operation: Send + Sync {
    /// The name of the operation (used for RPC)
    fn name(&self) -> &'static str;

    /// Description of what the operation does
    fn description(&self) -> &'static str;

    /// Positional parameters, in call order
    fn parameters(&self) -> Vec<OperationParameter>;

    /// HTTP routing information for this operation
    fn routes(&self) -> Vec<OperationRoute>;

    /// Examples showing how to use this operation
    fn examples(&self) -> Vec<OperationExample> {
        Vec::new()
    }

    /// Execute the operation with positional JSON arguments.
    /// May block on external processes; callers on an async runtime must offload it.
    fn execute(&self, args: &[Value]) -> Value;
}

impl From<ArgError> for OperationResult {
    fn from(e: ArgError) -> Self {
        OperationResult::failure(e.to_string())
    }
}

/// Shared services every operation draws on
pub struct AppContext {
    pub runner: Arc<dyn ProcessRunner>,
    pub settings: Arc<SettingsStore>,
    pub scheduler: Arc<AutoCommitScheduler>,
}

impl AppContext {
    pub fn new(config: &Config) -> Self {
        Self::with_runner(config, Arc::new(SystemProcessRunner::new()))
    }

    /// Context with a substituted process runner (useful for testing)
    pub fn with_runner(config: &Config, runner: Arc<dyn ProcessRunner>) -> Self {
        let settings = Arc::new(SettingsStore::new(config.settings_path.clone()));
        let scheduler = Arc::new(AutoCommitScheduler::new(runner.clone(), settings.clone()));
        Self {
            runner,
            settings,
            scheduler,
        }
    }
}

/// Create the default registry with built-in operations
pub fn create_default_registry() -> (OperationRegistry, Arc<AppContext>) {
    create_registry_with_config(&Config::from_env())
}

/// Create the registry for a specific config
pub fn create_registry_with_config(config: &Config) -> (OperationRegistry, Arc<AppContext>) {
    let context = Arc::new(AppContext::new(config));
    (create_registry(context.clone()), context)
}

/// Register every exposed operation against `context`
pub fn create_registry(context: Arc<AppContext>) -> OperationRegistry {
    let mut registry = OperationRegistry::new();

    registry.register(GetFilesOperation);
    registry.register(ReadOperation);
    registry.register(ListPathsOperation);
    registry.register(IsGitRepositoryOperation);
    registry.register(ExecuteCommandOperation::new(context.runner.clone()));

    registry.register(HandleGithubImportOperation::new(context.runner.clone()));
    registry.register(TestGithubConnectionOperation::new(context.runner.clone()));
    registry.register(GitCloneOperation::new(context.runner.clone()));
    registry.register(GitPullOperation::new(context.runner.clone()));
    registry.register(AssociateGitRepoOperation::new(context.runner.clone()));
    registry.register(GitCommitOperation::new(context.runner.clone()));
    registry.register(GitPushOperation::new(context.runner.clone()));
    registry.register(GitCommitAndPushOperation::new(context.runner.clone()));

    registry.register(SetupAutoCommitPushOperation::new(context.scheduler.clone()));
    registry.register(StopAutoCommitPushOperation::new(context.scheduler.clone()));
    registry.register(ListAutoCommitTasksOperation::new(context.scheduler.clone()));

    registry.register(GetConfigPathOperation::new(context.settings.clone()));
    registry.register(SavePathOperation::new(context.settings.clone()));
    registry.register(GetSettingsOperation::new(context.settings.clone()));
    registry.register(UpdateSettingsOperation::new(context.settings.clone()));
    registry.register(AddAllowedExtensionOperation::new(context.settings.clone()));
    registry.register(RemoveAllowedExtensionOperation::new(context.settings.clone()));

    registry
}
