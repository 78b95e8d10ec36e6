//! Report generation: JSON, JUnit XML, HTML, and the console summary.
//!
//! All file artifacts carry a timestamped filename so repeated runs in the
//! same report directory never collide.

mod console;
mod html;
mod json;
mod junit;
mod summary;

pub use console::print_summary;
pub use summary::RunSummary;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::OrchestratorConfig;
use crate::result::TaskResult;

/// Everything a finished run reports.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub summary: RunSummary,
    pub results: Vec<TaskResult>,
    pub config: OrchestratorConfig,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: u64,
}

impl RunReport {
    #[must_use]
    pub fn new(
        results: Vec<TaskResult>,
        config: OrchestratorConfig,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        let duration_ms = (end_time - start_time).num_milliseconds().max(0) as u64;
        let summary = RunSummary::from_results(&results, duration_ms);
        Self {
            summary,
            results,
            config,
            start_time,
            end_time,
            duration_ms,
        }
    }
}

/// Write every report artifact into `dir`, creating it if needed.
///
/// Returns the written paths: JSON, JUnit XML, then HTML.
///
/// # Errors
/// Propagates filesystem errors from creating the directory or writing any
/// artifact.
pub fn write_all(report: &RunReport, dir: &Path) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let stamp = report.end_time.format("%Y%m%d-%H%M%S%3f").to_string();

    let json_path = dir.join(format!("report-{stamp}.json"));
    fs::write(&json_path, json::render(report)?)?;

    let junit_path = dir.join(format!("junit-{stamp}.xml"));
    fs::write(&junit_path, junit::render(report))?;

    let html_path = dir.join(format!("report-{stamp}.html"));
    fs::write(&html_path, html::render(report))?;

    info!(
        json = %json_path.display(),
        junit = %junit_path.display(),
        html = %html_path.display(),
        "reports written"
    );
    Ok(vec![json_path, junit_path, html_path])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{ResultsStore, TaskStatus};
    use crate::spec::TaskSpec;

    fn sample_report() -> RunReport {
        let store = ResultsStore::new();
        store.register(&TaskSpec::shell("ok", "true"));
        store.register(&TaskSpec::shell("bad", "false"));
        store.update("ok", |r| r.status = TaskStatus::Passed);
        store.update("bad", |r| {
            r.status = TaskStatus::Failed;
            r.error = Some("exited with status 1".into());
        });
        let now = Utc::now();
        RunReport::new(store.finalize(), OrchestratorConfig::default(), now, now)
    }

    #[test]
    fn writes_all_three_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = write_all(&sample_report(), dir.path()).expect("write");
        assert_eq!(paths.len(), 3);
        for path in &paths {
            assert!(path.exists(), "{} missing", path.display());
        }
    }

    #[test]
    fn json_artifact_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = write_all(&sample_report(), dir.path()).expect("write");
        let raw = fs::read_to_string(&paths[0]).expect("read");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(value["summary"]["total"], 2);
        assert_eq!(value["summary"]["failed"], 1);
        assert_eq!(value["results"][0]["id"], "bad");
    }
}
