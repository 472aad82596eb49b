use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use super::{ArgValidation, Operation, OperationExample, OperationParameter, OperationRoute};
use crate::error::SchedulerError;
use crate::response::OperationResult;
use crate::scheduler::{AutoCommitScheduler, DEFAULT_BRANCH, DEFAULT_COMMIT_MESSAGE, TaskRef};

/// Starts a background commit-and-push loop
pub struct SetupAutoCommitPushOperation {
    scheduler: Arc<AutoCommitScheduler>,
}

impl SetupAutoCommitPushOperation {
    pub fn new(scheduler: Arc<AutoCommitScheduler>) -> Self {
        Self { scheduler }
    }
}

impl Operation for SetupAutoCommitPushOperation {
    fn name(&self) -> &'static str {
        "setup_auto_commit_push"
    }

    fn description(&self) -> &'static str {
        "Start committing and pushing a repository on an interval; returns data.thread_id for stopping it"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![
            OperationParameter::required("repo_path", "Repository directory"),
            OperationParameter::optional(
                "interval_seconds",
                "Seconds between runs, the configured interval when omitted",
            ),
            OperationParameter::optional("commit_message", "Commit message, \"auto commit\" when omitted"),
            OperationParameter::optional("branch", "Branch to push, \"main\" when omitted"),
        ]
    }

    fn examples(&self) -> Vec<OperationExample> {
        vec![OperationExample {
            description: "Commit and push every five minutes".to_string(),
            http_curl: r#"curl -X POST http://localhost:8765/api/setup_auto_commit_push -H "Content-Type: application/json" -d '{"args": ["/home/me/notes", 300, "auto commit", "main"]}'"#.to_string(),
        }]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![OperationRoute::post("/api/setup_auto_commit_push")]
    }

    fn execute(&self, args: &[Value]) -> Value {
        let repo_path = match ArgValidation::extract_string(args, 0, "repo_path") {
            Ok(path) => path,
            Err(e) => return OperationResult::from(e).to_value(),
        };
        let interval = ArgValidation::extract_u64(args, 1);
        let message = ArgValidation::extract_string_or_default(args, 2, DEFAULT_COMMIT_MESSAGE);
        let branch = ArgValidation::extract_string_or_default(args, 3, DEFAULT_BRANCH);

        self.scheduler.start(&repo_path, interval, &message, &branch).to_value()
    }
}

/// Reads the task reference a caller passed back: the bare identity token, or the
/// `data` object `setup_auto_commit_push` returned (or the whole result holding it).
fn task_ref_from(arg: Option<&Value>) -> Result<TaskRef, SchedulerError> {
    match arg {
        Some(Value::String(id)) => Ok(TaskRef::Id(id.clone())),
        Some(Value::Object(map)) => {
            let data = map.get("data").filter(|d| d.is_object()).unwrap_or(&Value::Null);
            map.get("thread_id")
                .or_else(|| data.get("thread_id"))
                .and_then(Value::as_str)
                .map(|id| TaskRef::Id(id.to_string()))
                .ok_or_else(|| SchedulerError::InvalidHandle("object has no thread_id".to_string()))
        }
        Some(other) => Err(SchedulerError::InvalidHandle(other.to_string())),
        None => Err(SchedulerError::InvalidHandle("missing".to_string())),
    }
}

pub struct StopAutoCommitPushOperation {
    scheduler: Arc<AutoCommitScheduler>,
}

impl StopAutoCommitPushOperation {
    pub fn new(scheduler: Arc<AutoCommitScheduler>) -> Self {
        Self { scheduler }
    }
}

impl Operation for StopAutoCommitPushOperation {
    fn name(&self) -> &'static str {
        "stop_auto_commit_push"
    }

    fn description(&self) -> &'static str {
        "Stop an auto commit loop, waiting up to five seconds for it to exit"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![OperationParameter::required(
            "thread_info",
            "The thread_id, or the data object returned when the loop was started",
        )]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![OperationRoute::post("/api/stop_auto_commit_push")]
    }

    fn execute(&self, args: &[Value]) -> Value {
        match task_ref_from(args.first()) {
            Ok(target) => self.scheduler.stop(&target).to_value(),
            Err(e) => {
                warn!("Rejected stop request: {}", e);
                OperationResult::failure(e.to_string()).to_value()
            }
        }
    }
}

pub struct ListAutoCommitTasksOperation {
    scheduler: Arc<AutoCommitScheduler>,
}

impl ListAutoCommitTasksOperation {
    pub fn new(scheduler: Arc<AutoCommitScheduler>) -> Self {
        Self { scheduler }
    }
}

impl Operation for ListAutoCommitTasksOperation {
    fn name(&self) -> &'static str {
        "list_auto_commit_tasks"
    }

    fn description(&self) -> &'static str {
        "List running auto commit loops"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![
            OperationRoute::get("/api/list_auto_commit_tasks"),
            OperationRoute::post("/api/list_auto_commit_tasks"),
        ]
    }

    fn execute(&self, _args: &[Value]) -> Value {
        let tasks = self.scheduler.list_tasks();
        OperationResult::ok()
            .with_field("tasks", serde_json::to_value(tasks).unwrap_or_default())
            .to_value()
    }
}
