//! Top-level run coordination.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use taskforge_runner::{ActionSpec, run};
use taskforge_utils::error::{PrereqError, TaskforgeError};

use crate::config::OrchestratorConfig;
use crate::filter::filter_tasks;
use crate::fixtures::FixtureStore;
use crate::phase_exec::PhaseExecutor;
use crate::plan::build_plan;
use crate::preflight::run_preflight;
use crate::report::{self, RunReport};
use crate::result::{ResultsStore, TaskResult};
use crate::spec::TaskSpec;
use crate::task_runner::TaskRunner;

/// Wires filtering, fixtures, planning, phase execution, teardown, and
/// reporting into one run.
///
/// A fresh `Orchestrator` is built per invocation; it owns the results store
/// and hands it to the phase executor and task runners by handle.
pub struct Orchestrator {
    config: OrchestratorConfig,
    results: ResultsStore,
}

impl Orchestrator {
    #[must_use]
    pub fn new(config: OrchestratorConfig) -> Self {
        Self {
            config,
            results: ResultsStore::new(),
        }
    }

    /// Run the catalog to completion and return every task's result.
    ///
    /// Task failures are folded into the results, never into the error; the
    /// error path is reserved for pre-execution failures (invalid config,
    /// unresolvable dependency graph, missing prerequisite). Global teardown
    /// runs even when such an error aborts the run mid-way. Reports are
    /// written only for runs that got past planning — a fatal error has no
    /// results to report.
    ///
    /// # Errors
    /// See [`TaskforgeError`] for the fatal cases and their exit codes.
    pub async fn run(&self, catalog: &[TaskSpec]) -> Result<Vec<TaskResult>, TaskforgeError> {
        self.config.validate()?;

        let start_time = Utc::now();
        let tasks = filter_tasks(catalog, &self.config);
        info!(
            catalog = catalog.len(),
            selected = tasks.len(),
            "task catalog filtered"
        );

        let fixture_names: BTreeSet<&str> = tasks
            .iter()
            .flat_map(|t| t.fixtures.iter())
            .map(String::as_str)
            .collect();
        let fixtures = FixtureStore::load(&self.config.fixture_dir, fixture_names);
        if !fixtures.is_empty() {
            info!(fixtures = fixtures.len(), "fixtures loaded");
        }

        let outcome = self.execute(&tasks).await;

        self.run_global_teardown().await;
        drop(fixtures);

        outcome?;

        let results = self.results.finalize();
        let end_time = Utc::now();
        let report = RunReport::new(results.clone(), self.config.clone(), start_time, end_time);
        report::write_all(&report, &self.config.report_dir)?;
        report::print_summary(&report.summary);

        Ok(results)
    }

    /// Global setup, planning, and the phase walk. Extracted so `run` can
    /// guarantee teardown regardless of where this fails.
    async fn execute(&self, tasks: &[TaskSpec]) -> Result<(), TaskforgeError> {
        self.run_global_setup().await?;

        let plan = build_plan(tasks)?;
        info!(phases = plan.phases.len(), tasks = plan.task_count(), "execution plan built");

        for task in plan.tasks() {
            self.results.register(task);
        }

        let runner = Arc::new(TaskRunner::new(
            self.results.clone(),
            self.config.project_root.clone(),
            self.config.retry_backoff,
            self.config.verbose,
        ));
        let executor = PhaseExecutor::new(
            runner,
            self.results.clone(),
            self.config.parallel,
            self.config.max_parallel,
        );

        for (index, phase) in plan.phases.iter().enumerate() {
            info!(phase = index + 1, tasks = phase.len(), "executing phase");
            executor.execute(phase).await;

            if self.config.fail_fast && executor.has_failures() {
                warn!(
                    completed = index + 1,
                    remaining = plan.phases.len() - index - 1,
                    "fail-fast: skipping remaining phases"
                );
                break;
            }
        }

        Ok(())
    }

    /// Verify required tools and run the optional global setup action.
    /// Any failure aborts the run before the first task.
    async fn run_global_setup(&self) -> Result<(), PrereqError> {
        for check in run_preflight(&self.config.required_tools) {
            if !check.ok() {
                return Err(PrereqError::ToolMissing {
                    tool: check
                        .name
                        .strip_prefix("tool:")
                        .unwrap_or(&check.name)
                        .to_string(),
                });
            }
        }

        if let Some(setup) = &self.config.global_setup {
            let outcome = self
                .run_global_action(setup)
                .await
                .map_err(|reason| PrereqError::GlobalSetupFailed { reason })?;
            if !outcome {
                return Err(PrereqError::GlobalSetupFailed {
                    reason: format!("action `{setup}` exited non-zero"),
                });
            }
            info!("global setup completed");
        }

        Ok(())
    }

    /// Best-effort cleanup; always attempted, failures only logged.
    async fn run_global_teardown(&self) {
        if let Some(teardown) = &self.config.global_teardown {
            match self.run_global_action(teardown).await {
                Ok(true) => info!("global teardown completed"),
                Ok(false) => warn!(action = %teardown, "global teardown exited non-zero; ignoring"),
                Err(reason) => warn!(action = %teardown, %reason, "global teardown failed; ignoring"),
            }
        }
    }

    async fn run_global_action(&self, action: &ActionSpec) -> Result<bool, String> {
        let spec = action.to_command_spec(&self.config.project_root);
        match run(&spec, self.config.default_timeout, None).await {
            Ok(out) => Ok(out.success()),
            Err(err) => Err(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::TaskStatus;
    use std::time::Duration;

    fn test_config(dir: &std::path::Path) -> OrchestratorConfig {
        OrchestratorConfig {
            project_root: dir.to_path_buf(),
            fixture_dir: dir.join("fixtures"),
            report_dir: dir.join("reports"),
            retry_backoff: Duration::from_millis(10),
            ..OrchestratorConfig::default()
        }
    }

    #[tokio::test]
    async fn empty_catalog_runs_and_reports_zero_tasks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let orchestrator = Orchestrator::new(test_config(dir.path()));
        let results = orchestrator.run(&[]).await.expect("run");
        assert!(results.is_empty());
        assert!(dir.path().join("reports").is_dir());
    }

    #[tokio::test]
    async fn cycle_aborts_before_any_process() {
        let dir = tempfile::tempdir().expect("tempdir");
        let marker = dir.path().join("ran");
        let catalog = vec![
            TaskSpec::shell("a", &format!("touch {}", marker.display()))
                .with_dependencies(["b"]),
            TaskSpec::shell("b", "true").with_dependencies(["a"]),
        ];
        let orchestrator = Orchestrator::new(test_config(dir.path()));
        let err = orchestrator.run(&catalog).await.expect_err("cycle");
        assert!(matches!(err, TaskforgeError::Plan(_)));
        assert!(!marker.exists());
        // Fatal: no reports written.
        assert!(!dir.path().join("reports").exists());
    }

    #[tokio::test]
    async fn missing_tool_is_fatal_but_teardown_runs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cleaned = dir.path().join("cleaned");
        let mut config = test_config(dir.path());
        config.required_tools = vec!["taskforge-no-such-tool".into()];
        config.global_teardown = Some(ActionSpec::shell(format!(
            "touch {}",
            cleaned.display()
        )));

        let orchestrator = Orchestrator::new(config);
        let err = orchestrator
            .run(&[TaskSpec::shell("a", "true")])
            .await
            .expect_err("prereq");
        assert!(matches!(err, TaskforgeError::Prereq(_)));
        assert!(cleaned.exists(), "teardown must run after a fatal setup");
    }

    #[tokio::test]
    async fn failed_dependency_does_not_block_dependents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = vec![
            TaskSpec::shell("first", "exit 1"),
            TaskSpec::shell("second", "true").with_dependencies(["first"]),
        ];
        let orchestrator = Orchestrator::new(test_config(dir.path()));
        let results = orchestrator.run(&catalog).await.expect("run completes");

        assert_eq!(results[0].status, TaskStatus::Failed);
        assert_eq!(results[1].status, TaskStatus::Passed);
    }
}
