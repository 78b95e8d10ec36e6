//! Single-task lifecycle execution: setup, command, teardown, retries.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use taskforge_runner::{ActionSpec, EchoPrefix, run};

use crate::result::{ResultsStore, TaskStatus};
use crate::spec::TaskSpec;

/// Why one attempt failed. Rendered into `TaskResult.error`; never thrown.
#[derive(Debug, Error)]
enum AttemptError {
    #[error("setup failed: {0}")]
    Setup(String),

    #[error("failed to start: {0}")]
    Spawn(String),

    #[error("timed out after {0}ms")]
    Timeout(u64),

    #[error("exited with status {0}")]
    NonZero(i32),

    #[error("terminated by signal")]
    Killed,
}

struct AttemptOutcome {
    error: Option<AttemptError>,
    output: String,
}

impl AttemptOutcome {
    fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Executes exactly one task to a final result.
///
/// Nothing escapes [`execute`](Self::execute): command failures, timeouts,
/// and setup failures all land in the task's entry in the shared results
/// store. Only teardown is more lenient still — its failures are logged and
/// ignored entirely.
pub struct TaskRunner {
    results: ResultsStore,
    project_root: PathBuf,
    retry_backoff: Duration,
    verbose: bool,
}

impl TaskRunner {
    #[must_use]
    pub fn new(
        results: ResultsStore,
        project_root: PathBuf,
        retry_backoff: Duration,
        verbose: bool,
    ) -> Self {
        Self {
            results,
            project_root,
            retry_backoff,
            verbose,
        }
    }

    /// Run the task's full lifecycle and finalize its result.
    ///
    /// The recorded duration spans the entire retry loop, backoffs included.
    pub async fn execute(&self, task: &TaskSpec) {
        let started_wall = Utc::now();
        let started = Instant::now();
        self.results.set_running(&task.id, started_wall);

        let total_attempts = task.retries + 1;
        let mut last: Option<AttemptOutcome> = None;

        for attempt in 1..=total_attempts {
            debug!(task = %task.id, attempt, total_attempts, "starting attempt");
            let outcome = self.run_attempt(task).await;

            if let Some(teardown) = &task.teardown {
                self.run_teardown(task, teardown).await;
            }

            let succeeded = outcome.succeeded();
            if succeeded {
                info!(task = %task.id, attempt, "task passed");
                self.finalize(task, TaskStatus::Passed, attempt, outcome, started, started_wall);
                return;
            }

            if attempt < total_attempts {
                warn!(
                    task = %task.id,
                    attempt,
                    error = %outcome.error.as_ref().map(ToString::to_string).unwrap_or_default(),
                    "attempt failed; backing off before retry"
                );
                last = Some(outcome);
                tokio::time::sleep(self.retry_backoff).await;
            } else {
                warn!(
                    task = %task.id,
                    attempts = total_attempts,
                    error = %outcome.error.as_ref().map(ToString::to_string).unwrap_or_default(),
                    "task failed"
                );
                last = Some(outcome);
            }
        }

        if let Some(outcome) = last {
            self.finalize(
                task,
                TaskStatus::Failed,
                total_attempts,
                outcome,
                started,
                started_wall,
            );
        }
    }

    /// One attempt: setup (if any), then the command. A failing setup counts
    /// as this attempt's failure and the command is not run.
    async fn run_attempt(&self, task: &TaskSpec) -> AttemptOutcome {
        let mut output = String::new();

        if let Some(setup) = &task.setup {
            match self.run_action(&task.id, setup, task.timeout).await {
                Ok(out) => output.push_str(&out),
                Err((err, out)) => {
                    output.push_str(&out);
                    return AttemptOutcome {
                        error: Some(AttemptError::Setup(err.to_string())),
                        output,
                    };
                }
            }
        }

        match self.run_action(&task.id, &task.command, task.timeout).await {
            Ok(out) => {
                output.push_str(&out);
                AttemptOutcome {
                    error: None,
                    output,
                }
            }
            Err((err, out)) => {
                output.push_str(&out);
                AttemptOutcome {
                    error: Some(err),
                    output,
                }
            }
        }
    }

    /// Run one action under the task's timeout. Returns captured output on
    /// success, or the failure plus whatever output arrived before it.
    async fn run_action(
        &self,
        task_id: &str,
        action: &ActionSpec,
        timeout: Duration,
    ) -> Result<String, (AttemptError, String)> {
        let spec = action.to_command_spec(&self.project_root);
        let echo = self.verbose.then(|| EchoPrefix(task_id.to_string()));

        match run(&spec, timeout, echo.as_ref()).await {
            Ok(out) if out.success() => Ok(out.output),
            Ok(out) if out.timed_out => Err((
                AttemptError::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)),
                out.output,
            )),
            Ok(out) => match out.exit_code {
                Some(code) => Err((AttemptError::NonZero(code), out.output)),
                None => Err((AttemptError::Killed, out.output)),
            },
            Err(err) => Err((AttemptError::Spawn(err.to_string()), String::new())),
        }
    }

    /// Teardown runs after every attempt; failures are warnings only.
    async fn run_teardown(&self, task: &TaskSpec, teardown: &ActionSpec) {
        if let Err((err, _)) = self.run_action(&task.id, teardown, task.timeout).await {
            warn!(task = %task.id, %err, "teardown failed; ignoring");
        }
    }

    fn finalize(
        &self,
        task: &TaskSpec,
        status: TaskStatus,
        attempts: u32,
        outcome: AttemptOutcome,
        started: Instant,
        started_wall: chrono::DateTime<Utc>,
    ) {
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.results.update(&task.id, |result| {
            result.status = status;
            result.start_time = Some(started_wall);
            result.end_time = Some(Utc::now());
            result.duration_ms = duration_ms;
            result.attempts = attempts;
            result.error = outcome.error.as_ref().map(ToString::to_string);
            result.output = outcome.output;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ResultsStore;

    fn runner(results: &ResultsStore) -> TaskRunner {
        TaskRunner::new(
            results.clone(),
            PathBuf::from("."),
            Duration::from_millis(10),
            false,
        )
    }

    fn registered(results: &ResultsStore, task: &TaskSpec) {
        results.register(task);
    }

    #[tokio::test]
    async fn passing_command_yields_passed() {
        let results = ResultsStore::new();
        let task = TaskSpec::shell("ok", "echo done");
        registered(&results, &task);

        runner(&results).execute(&task).await;

        let result = &results.snapshot()[0];
        assert_eq!(result.status, TaskStatus::Passed);
        assert_eq!(result.attempts, 1);
        assert!(result.error.is_none());
        assert!(result.output.contains("done"));
        assert!(result.start_time.is_some() && result.end_time.is_some());
    }

    #[tokio::test]
    async fn always_failing_command_exhausts_retries() {
        let results = ResultsStore::new();
        let task = TaskSpec::shell("fails", "exit 7").with_retries(2);
        registered(&results, &task);

        runner(&results).execute(&task).await;

        let result = &results.snapshot()[0];
        assert_eq!(result.status, TaskStatus::Failed);
        assert_eq!(result.attempts, 3);
        assert_eq!(result.error.as_deref(), Some("exited with status 7"));
    }

    #[tokio::test]
    async fn timeout_is_reported_and_killed() {
        let results = ResultsStore::new();
        let task = TaskSpec::shell("slow", "sleep 1").with_timeout(Duration::from_millis(100));
        registered(&results, &task);

        let started = Instant::now();
        runner(&results).execute(&task).await;

        let result = &results.snapshot()[0];
        assert_eq!(result.status, TaskStatus::Failed);
        assert_eq!(result.error.as_deref(), Some("timed out after 100ms"));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn failing_setup_skips_command_for_that_attempt() {
        let results = ResultsStore::new();
        let dir = tempfile::tempdir().expect("tempdir");
        let marker = dir.path().join("ran");
        let task = TaskSpec::shell("setup-fails", &format!("touch {}", marker.display()))
            .with_setup("exit 1");
        registered(&results, &task);

        runner(&results).execute(&task).await;

        let result = &results.snapshot()[0];
        assert_eq!(result.status, TaskStatus::Failed);
        assert!(result.error.as_deref().unwrap_or_default().starts_with("setup failed"));
        assert!(!marker.exists(), "command must not run after failed setup");
    }

    #[tokio::test]
    async fn failing_teardown_does_not_change_status() {
        let results = ResultsStore::new();
        let task = TaskSpec::shell("td", "true").with_teardown("exit 1");
        registered(&results, &task);

        runner(&results).execute(&task).await;

        assert_eq!(results.snapshot()[0].status, TaskStatus::Passed);
    }

    #[tokio::test]
    async fn retry_succeeds_on_second_attempt() {
        let results = ResultsStore::new();
        let dir = tempfile::tempdir().expect("tempdir");
        let marker = dir.path().join("once");
        let line = format!(
            "if [ -f {m} ]; then exit 0; else touch {m}; exit 1; fi",
            m = marker.display()
        );
        let task = TaskSpec::shell("flaky", &line).with_retries(1);
        registered(&results, &task);

        runner(&results).execute(&task).await;

        let result = &results.snapshot()[0];
        assert_eq!(result.status, TaskStatus::Passed);
        assert_eq!(result.attempts, 2);
        assert!(result.error.is_none());
    }
}
