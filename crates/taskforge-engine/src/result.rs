use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::spec::{Environment, TaskSpec};

/// Lifecycle state of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Passed,
    Failed,
    Skipped,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        };
        write!(f, "{name}")
    }
}

/// Outcome record for one scheduled task.
///
/// Created when the task enters the plan, mutated while it runs, frozen when
/// the run ends. `duration_ms` spans the entire retry loop — first attempt
/// start to final attempt end, backoffs included.
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    pub id: String,
    pub name: String,
    pub environment: Environment,
    pub status: TaskStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_ms: u64,
    /// How many attempts actually ran.
    pub attempts: u32,
    /// Populated only when `status == failed`.
    pub error: Option<String>,
    /// Combined captured output of the attempt(s).
    pub output: String,
}

impl TaskResult {
    fn new(task: &TaskSpec) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            environment: task.environment,
            status: TaskStatus::Pending,
            start_time: None,
            end_time: None,
            duration_ms: 0,
            attempts: 0,
            error: None,
            output: String::new(),
        }
    }
}

/// Shared, id-keyed store of task results, owned by the orchestrator and
/// handed to the phase executor and task runners.
///
/// Each task writes only its own entry, so a single mutex around the map is
/// sufficient; the lock is never held across an await point.
#[derive(Clone, Default)]
pub struct ResultsStore {
    inner: Arc<Mutex<BTreeMap<String, TaskResult>>>,
}

impl ResultsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scheduled task with a pending result.
    pub fn register(&self, task: &TaskSpec) {
        if let Ok(mut map) = self.inner.lock() {
            map.insert(task.id.clone(), TaskResult::new(task));
        }
    }

    /// Mark a task as running.
    pub fn set_running(&self, id: &str, start: DateTime<Utc>) {
        self.update(id, |result| {
            result.status = TaskStatus::Running;
            result.start_time = Some(start);
        });
    }

    /// Apply a mutation to the given task's entry, if registered.
    pub fn update(&self, id: &str, f: impl FnOnce(&mut TaskResult)) {
        if let Ok(mut map) = self.inner.lock() {
            if let Some(result) = map.get_mut(id) {
                f(result);
            }
        }
    }

    /// Whether any task so far has failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.inner
            .lock()
            .map(|map| map.values().any(|r| r.status == TaskStatus::Failed))
            .unwrap_or(false)
    }

    /// Number of tasks currently in the running state.
    #[must_use]
    pub fn running_count(&self) -> usize {
        self.inner
            .lock()
            .map(|map| {
                map.values()
                    .filter(|r| r.status == TaskStatus::Running)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Freeze the run: every task never reached gets `skipped`, and the
    /// full result list is returned sorted by task id.
    #[must_use]
    pub fn finalize(&self) -> Vec<TaskResult> {
        self.inner
            .lock()
            .map(|mut map| {
                for result in map.values_mut() {
                    if matches!(result.status, TaskStatus::Pending | TaskStatus::Running) {
                        result.status = TaskStatus::Skipped;
                    }
                }
                map.values().cloned().collect()
            })
            .unwrap_or_default()
    }

    /// Current results, sorted by task id, without freezing.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TaskResult> {
        self.inner
            .lock()
            .map(|map| map.values().cloned().collect())
            .unwrap_or_default()
    }
}
