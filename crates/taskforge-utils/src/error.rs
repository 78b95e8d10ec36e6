//! Error types for orchestration failures.
//!
//! Only pre-execution failures surface as errors: invalid configuration, an
//! unresolvable dependency graph, or a missing prerequisite. Everything that
//! goes wrong *inside* a task (non-zero exit, timeout, failed setup) is
//! captured into that task's result and never propagates.

use crate::exit_codes::ExitCode;
use thiserror::Error;

/// Top-level error type returned by orchestration operations.
///
/// Each variant maps to a documented exit code via
/// [`to_exit_code()`](Self::to_exit_code). All variants are fatal and are
/// raised before any task process has been spawned; global teardown is still
/// attempted when one occurs mid-run.
#[derive(Error, Debug)]
pub enum TaskforgeError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("prerequisite error: {0}")]
    Prereq(#[from] PrereqError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TaskforgeError {
    /// Map this error to the exit code the CLI should terminate with.
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) => ExitCode::CONFIG,
            Self::Plan(PlanError::CircularDependency { .. }) => ExitCode::DEPENDENCY,
            Self::Plan(PlanError::IterationLimit { .. }) => ExitCode::INTERNAL,
            Self::Prereq(_) => ExitCode::PREREQUISITE,
            Self::Io(_) => ExitCode::INTERNAL,
        }
    }
}

/// Invalid orchestrator configuration, rejected before anything runs.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("max_parallel must be at least 1")]
    MaxParallelZero,
}

/// The dependency graph could not be partitioned into phases.
#[derive(Error, Debug)]
pub enum PlanError {
    /// No remaining task had all of its dependencies satisfied. Lists the
    /// stuck ids, sorted, plus any dependency ids that do not exist in the
    /// catalog at all, since a task referencing one can never resolve.
    #[error("circular or unresolvable dependencies among tasks: {}", describe_unresolved(ids, missing))]
    CircularDependency {
        ids: Vec<String>,
        missing: Vec<String>,
    },

    /// The resolution loop exceeded its iteration bound. This indicates a
    /// bug in the planner itself, not a bad catalog.
    #[error("plan resolution exceeded {iterations} iterations; this is a bug")]
    IterationLimit { iterations: usize },
}

fn describe_unresolved(ids: &[String], missing: &[String]) -> String {
    if missing.is_empty() {
        ids.join(", ")
    } else {
        format!(
            "{} (unknown dependencies: {})",
            ids.join(", "),
            missing.join(", ")
        )
    }
}

/// A required external tool or the global setup action is unavailable.
#[derive(Error, Debug)]
pub enum PrereqError {
    #[error("required tool not found on PATH: {tool}")]
    ToolMissing { tool: String },

    #[error("global setup failed: {reason}")]
    GlobalSetupFailed { reason: String },
}
