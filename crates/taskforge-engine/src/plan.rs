//! Phase partitioning of the dependency graph.

use std::collections::{BTreeMap, BTreeSet};

use taskforge_utils::error::PlanError;

use crate::spec::TaskSpec;

/// Ordered list of phases; every task's dependencies complete in a strictly
/// earlier phase, and tasks within a phase are sorted by id.
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    pub phases: Vec<Vec<TaskSpec>>,
}

impl ExecutionPlan {
    /// Total number of scheduled tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.phases.iter().map(Vec::len).sum()
    }

    /// Iterate all scheduled tasks in phase order.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskSpec> {
        self.phases.iter().flatten()
    }
}

/// Partition the filtered task set into ordered phases.
///
/// Iterative fixed-point rather than recursive DFS: each round collects
/// every remaining task whose dependencies are already resolved. The
/// `BTreeMap` scan makes in-phase order deterministic (sorted by id).
///
/// # Errors
/// [`PlanError::CircularDependency`] when a round makes no progress while
/// tasks remain — a cycle, or a dependency id absent from the catalog
/// (including a self-reference), since such a task can never resolve.
/// [`PlanError::IterationLimit`] when the loop exceeds `2 × |tasks|` rounds,
/// which indicates a planner bug rather than a bad catalog.
pub fn build_plan(tasks: &[TaskSpec]) -> Result<ExecutionPlan, PlanError> {
    let mut remaining: BTreeMap<&str, &TaskSpec> =
        tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    let mut resolved: BTreeSet<&str> = BTreeSet::new();
    let mut phases = Vec::new();

    let max_iterations = tasks.len().saturating_mul(2).max(1);
    let mut iterations = 0usize;

    while !remaining.is_empty() {
        iterations += 1;
        if iterations > max_iterations {
            return Err(PlanError::IterationLimit {
                iterations: max_iterations,
            });
        }

        let ready: Vec<&str> = remaining
            .values()
            .filter(|t| t.dependencies.iter().all(|d| resolved.contains(d.as_str())))
            .map(|t| t.id.as_str())
            .collect();

        if ready.is_empty() {
            let known: BTreeSet<&str> = remaining
                .keys()
                .copied()
                .chain(resolved.iter().copied())
                .collect();
            let missing: BTreeSet<&str> = remaining
                .values()
                .flat_map(|t| t.dependencies.iter())
                .map(String::as_str)
                .filter(|dep| !known.contains(dep))
                .collect();
            return Err(PlanError::CircularDependency {
                ids: remaining.keys().map(ToString::to_string).collect(),
                missing: missing.into_iter().map(ToString::to_string).collect(),
            });
        }

        let mut phase = Vec::with_capacity(ready.len());
        for id in ready {
            if let Some(task) = remaining.remove(id) {
                phase.push(task.clone());
                resolved.insert(id);
            }
        }
        phases.push(phase);
    }

    Ok(ExecutionPlan { phases })
}
