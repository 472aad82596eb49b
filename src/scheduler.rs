//! Background auto-commit/push loops.
//!
//! Each task owns one named thread that commits and pushes a repository, then sleeps
//! for its interval. Cancellation is cooperative: a stop request wakes the sleeping
//! loop at once, but an in-flight commit-and-push is always allowed to finish.

use serde::Serialize;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::SchedulerError;
use crate::git::CommitOps;
use crate::process::ProcessRunner;
use crate::response::OperationResult;
use crate::settings::SettingsStore;

pub const DEFAULT_COMMIT_MESSAGE: &str = "auto commit";
pub const DEFAULT_BRANCH: &str = "main";

/// Upper bound on how long `stop` blocks waiting for the loop thread
pub const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest single sleep between cancellation checks
const POLL_SLICE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

#[derive(Debug)]
struct Control {
    cancelled: bool,
    state: TaskState,
}

/// State shared between a task's loop thread and everyone holding its handle
#[derive(Debug)]
struct TaskShared {
    id: Uuid,
    repo_path: PathBuf,
    message: String,
    branch: String,
    interval: Duration,
    control: Mutex<Control>,
    signal: Condvar,
}

impl TaskShared {
    fn control(&self) -> MutexGuard<'_, Control> {
        // The loop never panics while holding this lock, recover the guard if it did
        self.control.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, state: TaskState) {
        self.control().state = state;
        self.signal.notify_all();
    }
}

/// Cloneable reference to one scheduled task.
///
/// The handle carries the cancellation signal itself, so a task can be stopped through
/// its handle even after it has left the scheduler's registry.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    shared: Arc<TaskShared>,
}

impl TaskHandle {
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn repo_path(&self) -> &Path {
        &self.shared.repo_path
    }

    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    pub fn state(&self) -> TaskState {
        self.shared.control().state
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.control().cancelled
    }

    /// Raise the cancellation signal and wake the loop if it is sleeping
    pub fn cancel(&self) {
        let mut control = self.shared.control();
        control.cancelled = true;
        if control.state == TaskState::Running {
            control.state = TaskState::Stopping;
        }
        drop(control);
        self.shared.signal.notify_all();
    }

    /// Block until the loop thread has exited or `timeout` elapses; true when it exited
    pub fn wait_stopped(&self, timeout: Duration) -> bool {
        let control = self.shared.control();
        match self
            .shared
            .signal
            .wait_timeout_while(control, timeout, |c| c.state != TaskState::Stopped)
        {
            Ok((control, _)) => control.state == TaskState::Stopped,
            Err(poisoned) => poisoned.into_inner().0.state == TaskState::Stopped,
        }
    }

    pub fn info(&self) -> TaskInfo {
        TaskInfo {
            thread_id: self.shared.id.to_string(),
            repo_path: self.shared.repo_path.to_string_lossy().into_owned(),
            branch: self.shared.branch.clone(),
            interval_seconds: self.shared.interval.as_secs(),
            state: self.state(),
        }
    }

    /// Sleep for up to `duration`, waking at least once per second and immediately on
    /// cancellation. Returns true when the task was cancelled.
    /// An interval too large to represent as a deadline sleeps until cancelled.
    fn sleep_unless_cancelled(&self, duration: Duration) -> bool {
        let deadline = Instant::now().checked_add(duration);
        let mut control = self.shared.control();
        loop {
            if control.cancelled {
                return true;
            }
            let now = Instant::now();
            let slice = match deadline {
                Some(deadline) if now >= deadline => return false,
                Some(deadline) => (deadline - now).min(POLL_SLICE),
                None => POLL_SLICE,
            };
            control = match self.shared.signal.wait_timeout(control, slice) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }
}

/// Public description of a task, as listed to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskInfo {
    pub thread_id: String,
    pub repo_path: String,
    pub branch: String,
    pub interval_seconds: u64,
    pub state: TaskState,
}

/// How a caller names the task to stop
#[derive(Debug, Clone)]
pub enum TaskRef {
    /// The identity token returned by `start`
    Id(String),
    Handle(TaskHandle),
}

struct TaskRecord {
    handle: TaskHandle,
    join: JoinHandle<()>,
}

/// Marks the task stopped however the loop thread exits
struct ExitGuard(TaskHandle);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.0.shared.set_state(TaskState::Stopped);
    }
}

/// Registry and factory for auto-commit tasks
pub struct AutoCommitScheduler {
    runner: Arc<dyn ProcessRunner>,
    settings: Arc<SettingsStore>,
    tasks: Mutex<HashMap<Uuid, TaskRecord>>,
}

impl AutoCommitScheduler {
    pub fn new(runner: Arc<dyn ProcessRunner>, settings: Arc<SettingsStore>) -> Self {
        Self {
            runner,
            settings,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    fn tasks(&self) -> MutexGuard<'_, HashMap<Uuid, TaskRecord>> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Interval used when the caller gives none: the configured value, else a minute
    pub fn default_interval(&self) -> u64 {
        self.settings.auto_commit_interval()
    }

    /// Start a loop for `repo_path` and register it.
    ///
    /// A missing or zero interval uses [`Self::default_interval`]. Empty message and
    /// branch fall back to `auto commit` and `main`.
    pub fn start_task(
        &self,
        repo_path: impl Into<PathBuf>,
        interval_seconds: Option<u64>,
        message: &str,
        branch: &str,
    ) -> Result<TaskHandle, SchedulerError> {
        let interval = match interval_seconds {
            Some(secs) if secs > 0 => secs,
            _ => self.default_interval(),
        };
        let message = if message.trim().is_empty() { DEFAULT_COMMIT_MESSAGE } else { message };
        let branch = if branch.trim().is_empty() { DEFAULT_BRANCH } else { branch.trim() };

        let id = Uuid::new_v4();
        let handle = TaskHandle {
            shared: Arc::new(TaskShared {
                id,
                repo_path: repo_path.into(),
                message: message.to_string(),
                branch: branch.to_string(),
                interval: Duration::from_secs(interval),
                control: Mutex::new(Control {
                    cancelled: false,
                    state: TaskState::Idle,
                }),
                signal: Condvar::new(),
            }),
        };

        let thread_name = format!("auto-commit-{}", &id.simple().to_string()[..8]);
        let loop_handle = handle.clone();
        let runner = self.runner.clone();
        let join = thread::Builder::new()
            .name(thread_name)
            .spawn(move || run_loop(loop_handle, runner))
            .map_err(SchedulerError::SpawnFailed)?;

        info!(
            "Started auto commit task {} for {:?} every {}s on {}",
            id,
            handle.repo_path(),
            interval,
            branch
        );
        self.tasks().insert(
            id,
            TaskRecord {
                handle: handle.clone(),
                join,
            },
        );
        Ok(handle)
    }

    /// Start a task and report its identity token and effective interval
    pub fn start(
        &self,
        repo_path: &str,
        interval_seconds: Option<u64>,
        message: &str,
        branch: &str,
    ) -> OperationResult {
        if repo_path.trim().is_empty() {
            return OperationResult::failure("Repository path is empty");
        }
        match self.start_task(repo_path, interval_seconds, message, branch) {
            Ok(handle) => OperationResult::ok()
                .with_message("Auto commit and push started")
                .with_data(serde_json::json!({
                    "thread_id": handle.id().to_string(),
                    "interval_seconds": handle.interval().as_secs(),
                })),
            Err(e) => {
                error!("Could not start auto commit task: {}", e);
                OperationResult::failure(e.to_string())
            }
        }
    }

    /// Cancel a task and wait up to [`STOP_TIMEOUT`] for its thread to exit
    pub fn stop(&self, target: &TaskRef) -> OperationResult {
        match self.stop_task(target) {
            Ok((id, true)) => OperationResult::ok()
                .with_message("Auto commit and push stopped")
                .with_field("thread_id", id.to_string()),
            Ok((id, false)) => OperationResult::ok()
                .with_message("Stop requested, task is finishing its current run")
                .with_field("thread_id", id.to_string()),
            Err(e) => {
                warn!("Stop request failed: {}", e);
                OperationResult::failure(e.to_string())
            }
        }
    }

    /// Returns the task id and whether its thread exited within the timeout
    pub fn stop_task(&self, target: &TaskRef) -> Result<(Uuid, bool), SchedulerError> {
        let (handle, join) = match target {
            TaskRef::Id(raw) => {
                let id = Uuid::parse_str(raw.trim())
                    .map_err(|_| SchedulerError::TaskNotFound(raw.clone()))?;
                let record = self
                    .tasks()
                    .remove(&id)
                    .ok_or_else(|| SchedulerError::TaskNotFound(raw.clone()))?;
                (record.handle, Some(record.join))
            }
            TaskRef::Handle(handle) => {
                let join = self.tasks().remove(&handle.id()).map(|r| r.join);
                (handle.clone(), join)
            }
        };

        let id = handle.id();
        info!("Stopping auto commit task {}", id);
        handle.cancel();
        let exited = handle.wait_stopped(STOP_TIMEOUT);

        if exited {
            if let Some(join) = join
                && join.join().is_err()
            {
                warn!("Auto commit task {} thread ended with a panic", id);
            }
            info!("Auto commit task {} stopped", id);
        } else {
            // The thread exits on its own once the in-flight run returns
            warn!("Auto commit task {} did not stop within {:?}", id, STOP_TIMEOUT);
        }
        Ok((id, exited))
    }

    /// Stop every registered task; returns how many were stopped
    pub fn stop_all(&self) -> usize {
        let ids: Vec<Uuid> = self.tasks().keys().copied().collect();
        ids.into_iter()
            .filter(|id| self.stop_task(&TaskRef::Id(id.to_string())).is_ok())
            .count()
    }

    pub fn get(&self, id: &str) -> Option<TaskHandle> {
        let id = Uuid::parse_str(id.trim()).ok()?;
        self.tasks().get(&id).map(|r| r.handle.clone())
    }

    pub fn list_tasks(&self) -> Vec<TaskInfo> {
        let mut tasks: Vec<TaskInfo> = self.tasks().values().map(|r| r.handle.info()).collect();
        tasks.sort_by(|a, b| a.repo_path.cmp(&b.repo_path).then(a.thread_id.cmp(&b.thread_id)));
        tasks
    }
}

impl Drop for AutoCommitScheduler {
    fn drop(&mut self) {
        for record in self.tasks().values() {
            record.handle.cancel();
        }
    }
}

fn run_loop(handle: TaskHandle, runner: Arc<dyn ProcessRunner>) {
    let _guard = ExitGuard(handle.clone());
    {
        let mut control = handle.shared.control();
        if control.cancelled {
            return;
        }
        control.state = TaskState::Running;
    }

    let shared = &handle.shared;
    debug!("Auto commit loop running for {:?}", shared.repo_path);
    loop {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            CommitOps::commit_and_push(runner.as_ref(), &shared.repo_path, &shared.message, &shared.branch)
        }));

        match outcome {
            Ok(result) if result.success => {
                info!("Auto commit and push succeeded for {:?}", shared.repo_path);
            }
            Ok(result) => {
                warn!(
                    "Auto commit and push failed for {:?}: {}",
                    shared.repo_path,
                    result.failure_reason()
                );
            }
            Err(payload) => {
                error!(
                    "Auto commit and push panicked for {:?}: {}",
                    shared.repo_path,
                    panic_message(payload.as_ref())
                );
            }
        }

        if handle.sleep_unless_cancelled(shared.interval) {
            break;
        }
    }
    debug!("Auto commit loop exiting for {:?}", shared.repo_path);
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::FALLBACK_INTERVAL_SECONDS;
    use crate::testing::ScriptedRunner;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn scheduler_with(runner: Arc<ScriptedRunner>) -> (AutoCommitScheduler, tempfile::TempDir) {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp_dir.path().join(".git")).unwrap();
        let settings = Arc::new(SettingsStore::new(temp_dir.path().join("settings.yaml")));
        (AutoCommitScheduler::new(runner, settings), temp_dir)
    }

    fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(20));
        }
        condition()
    }

    #[test]
    fn test_start_returns_identity_and_interval() {
        let runner = Arc::new(ScriptedRunner::new());
        let (scheduler, repo) = scheduler_with(runner);

        let result = scheduler.start(&repo.path().to_string_lossy(), Some(30), "", "");
        assert!(result.success);
        let data = result.field("data").unwrap();
        assert_eq!(data["interval_seconds"], 30);
        let id = data["thread_id"].as_str().unwrap().to_string();

        let tasks = scheduler.list_tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].thread_id, id);
        assert_eq!(tasks[0].branch, DEFAULT_BRANCH);

        assert!(scheduler.stop(&TaskRef::Id(id)).success);
        assert!(scheduler.list_tasks().is_empty());
    }

    #[test]
    fn test_huge_interval_keeps_task_running() {
        let runner = Arc::new(ScriptedRunner::new());
        let (scheduler, repo) = scheduler_with(runner.clone());

        let result = scheduler.start(&repo.path().to_string_lossy(), Some(u64::MAX), "", "");
        assert!(result.success);
        let id = result.field("data").unwrap()["thread_id"].as_str().unwrap().to_string();

        assert!(wait_until(Duration::from_secs(2), || runner.count("git push") == 1));
        thread::sleep(Duration::from_millis(300));
        let handle = scheduler.get(&id).unwrap();
        assert_eq!(handle.state(), TaskState::Running);

        assert!(scheduler.stop(&TaskRef::Id(id)).success);
        assert_eq!(handle.state(), TaskState::Stopped);
    }

    #[test]
    fn test_stop_soon_after_start_is_prompt() {
        let runner = Arc::new(ScriptedRunner::new());
        let (scheduler, repo) = scheduler_with(runner.clone());

        let handle = scheduler.start_task(repo.path(), Some(30), "auto commit", "main").unwrap();
        let started = Instant::now();
        let result = scheduler.stop(&TaskRef::Id(handle.id().to_string()));

        assert!(result.success);
        assert!(started.elapsed() < STOP_TIMEOUT);
        assert!(runner.count("git push") <= 1);
        assert_eq!(handle.state(), TaskState::Stopped);
    }

    #[test]
    fn test_stop_wakes_sleeping_loop() {
        let runner = Arc::new(ScriptedRunner::new());
        let (scheduler, repo) = scheduler_with(runner.clone());

        let handle = scheduler.start_task(repo.path(), Some(3600), "auto commit", "main").unwrap();
        assert!(wait_until(Duration::from_secs(5), || runner.count("git push") == 1));

        let started = Instant::now();
        assert!(scheduler.stop(&TaskRef::Handle(handle.clone())).success);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(runner.count("git push"), 1);
    }

    #[test]
    fn test_stop_unknown_id_fails() {
        let runner = Arc::new(ScriptedRunner::new());
        let (scheduler, _repo) = scheduler_with(runner);

        let result = scheduler.stop(&TaskRef::Id("not-a-task".to_string()));
        assert!(!result.success);
        assert!(result.error.is_some());

        let result = scheduler.stop(&TaskRef::Id(Uuid::new_v4().to_string()));
        assert!(!result.success);
    }

    #[test]
    fn test_iteration_panic_does_not_end_loop() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let runner = Arc::new(ScriptedRunner::new().otherwise(move |command, _| {
            if command.starts_with("git add") && counter.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("simulated fault");
            }
            crate::process::CommandOutput::default()
        }));
        let (scheduler, repo) = scheduler_with(runner.clone());

        let handle = scheduler.start_task(repo.path(), Some(1), "auto commit", "main").unwrap();
        assert!(wait_until(Duration::from_secs(5), || runner.count("git push") >= 1));
        assert!(attempts.load(Ordering::SeqCst) >= 2);
        assert_ne!(handle.state(), TaskState::Stopped);

        assert!(scheduler.stop(&TaskRef::Handle(handle)).success);
    }

    #[test]
    fn test_failed_iteration_keeps_running() {
        let runner = Arc::new(ScriptedRunner::new().fail("git commit", "fatal: not a git repository"));
        let (scheduler, repo) = scheduler_with(runner.clone());

        let handle = scheduler.start_task(repo.path(), Some(1), "auto commit", "main").unwrap();
        assert!(wait_until(Duration::from_secs(5), || runner.count("git commit") >= 2));
        assert_eq!(runner.count("git push"), 0);

        scheduler.stop(&TaskRef::Handle(handle));
    }

    #[test]
    fn test_default_interval_comes_from_settings() {
        let runner = Arc::new(ScriptedRunner::new());
        let (scheduler, _repo) = scheduler_with(runner);
        assert_eq!(scheduler.default_interval(), 10);

        scheduler
            .settings
            .set(crate::settings::AUTO_COMMIT_INTERVAL_KEY, "not a number")
            .unwrap();
        assert_eq!(scheduler.default_interval(), FALLBACK_INTERVAL_SECONDS);
    }

    #[test]
    fn test_zero_interval_uses_default() {
        let runner = Arc::new(ScriptedRunner::new());
        let (scheduler, repo) = scheduler_with(runner);

        let handle = scheduler.start_task(repo.path(), Some(0), "", "").unwrap();
        assert_eq!(handle.interval(), Duration::from_secs(10));
        scheduler.stop_all();
        assert_eq!(handle.state(), TaskState::Stopped);
    }

    #[test]
    fn test_tasks_are_independent() {
        let runner = Arc::new(ScriptedRunner::new());
        let (scheduler, repo) = scheduler_with(runner);

        let first = scheduler.start_task(repo.path(), Some(60), "", "").unwrap();
        let second = scheduler.start_task(repo.path(), Some(60), "", "").unwrap();
        assert_ne!(first.id(), second.id());

        scheduler.stop(&TaskRef::Handle(first.clone()));
        assert_eq!(first.state(), TaskState::Stopped);
        assert!(!second.is_cancelled());
        assert_eq!(scheduler.list_tasks().len(), 1);

        assert_eq!(scheduler.stop_all(), 1);
    }
}
