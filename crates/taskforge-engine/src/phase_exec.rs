//! Phase execution under the configured concurrency policy.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::result::ResultsStore;
use crate::spec::TaskSpec;
use crate::task_runner::TaskRunner;

/// Drives one phase to completion.
///
/// Under parallel execution a phase is split into consecutive batches; a
/// whole batch is spawned at once and awaited before the next one starts, so
/// running tasks never exceed `max_parallel`. Fail-fast is evaluated by the
/// orchestrator *between* phases only — a failing task never cancels its
/// batch siblings.
pub struct PhaseExecutor {
    runner: Arc<TaskRunner>,
    results: ResultsStore,
    parallel: bool,
    max_parallel: usize,
}

impl PhaseExecutor {
    #[must_use]
    pub fn new(
        runner: Arc<TaskRunner>,
        results: ResultsStore,
        parallel: bool,
        max_parallel: usize,
    ) -> Self {
        Self {
            runner,
            results,
            parallel,
            max_parallel,
        }
    }

    /// Run every task in the phase to a terminal result.
    pub async fn execute(&self, phase: &[TaskSpec]) {
        if self.parallel && phase.len() > 1 {
            for batch in batches(phase, self.max_parallel) {
                debug!(tasks = batch.len(), "running batch");
                let mut set = JoinSet::new();
                for task in batch {
                    let runner = Arc::clone(&self.runner);
                    set.spawn(async move { runner.execute(&task).await });
                }
                while let Some(joined) = set.join_next().await {
                    if let Err(err) = joined {
                        error!(%err, "task execution panicked");
                    }
                }
            }
        } else {
            for task in phase {
                self.runner.execute(task).await;
            }
        }
    }

    /// Whether any task so far has a failed result.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.results.has_failures()
    }
}

/// Split a phase into consecutive batches of at most `max_parallel` tasks.
/// A task that declined batching (`parallel = false`) always forms its own
/// single-task batch.
fn batches(phase: &[TaskSpec], max_parallel: usize) -> Vec<Vec<TaskSpec>> {
    let mut out: Vec<Vec<TaskSpec>> = Vec::new();
    let mut current: Vec<TaskSpec> = Vec::new();

    for task in phase {
        if !task.parallel {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            out.push(vec![task.clone()]);
            continue;
        }
        current.push(task.clone());
        if current.len() == max_parallel {
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}
