use serde::Serialize;

use crate::result::{TaskResult, TaskStatus};

/// Aggregate counters over a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    /// True iff no task failed.
    pub success: bool,
    /// Percentage of passed over total; 0 for an empty run.
    pub pass_rate: f64,
}

impl RunSummary {
    #[must_use]
    pub fn from_results(results: &[TaskResult], duration_ms: u64) -> Self {
        let total = results.len();
        let passed = count(results, TaskStatus::Passed);
        let failed = count(results, TaskStatus::Failed);
        let skipped = count(results, TaskStatus::Skipped);
        let pass_rate = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64 * 100.0
        };

        Self {
            total,
            passed,
            failed,
            skipped,
            duration_ms,
            success: failed == 0,
            pass_rate,
        }
    }
}

fn count(results: &[TaskResult], status: TaskStatus) -> usize {
    results.iter().filter(|r| r.status == status).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ResultsStore;
    use crate::spec::TaskSpec;

    fn results(statuses: &[TaskStatus]) -> Vec<TaskResult> {
        let store = ResultsStore::new();
        for (i, status) in statuses.iter().enumerate() {
            let id = format!("t{i}");
            store.register(&TaskSpec::shell(&id, "true"));
            let status = *status;
            store.update(&id, |r| r.status = status);
        }
        store.snapshot()
    }

    #[test]
    fn counters_partition_the_total() {
        let summary = RunSummary::from_results(
            &results(&[
                TaskStatus::Passed,
                TaskStatus::Passed,
                TaskStatus::Failed,
                TaskStatus::Skipped,
            ]),
            1234,
        );
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed + summary.failed + summary.skipped, summary.total);
        assert!(!summary.success);
        assert!((summary.pass_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_run_has_zero_pass_rate_and_succeeds() {
        let summary = RunSummary::from_results(&[], 0);
        assert_eq!(summary.total, 0);
        assert!((summary.pass_rate - 0.0).abs() < f64::EPSILON);
        assert!(summary.success);
    }

    #[test]
    fn all_passed_is_a_full_pass_rate() {
        let summary =
            RunSummary::from_results(&results(&[TaskStatus::Passed, TaskStatus::Passed]), 10);
        assert!(summary.success);
        assert!((summary.pass_rate - 100.0).abs() < f64::EPSILON);
    }
}
