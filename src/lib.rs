//! taskforge - dependency-aware task orchestration
//!
//! taskforge takes a catalog of declarative tasks — each with dependencies,
//! an environment tag, a timeout, and a retry budget — resolves them into
//! topologically ordered phases, runs them as external processes under
//! bounded parallelism, and writes JSON, JUnit, and HTML reports.
//!
//! taskforge can be used in two ways:
//! - **CLI**: `taskforge run catalog.toml --parallel --max-parallel 4`
//! - **Library**: build an [`OrchestratorConfig`], hand a `Vec<TaskSpec>` to
//!   [`Orchestrator::run`], and inspect the returned [`TaskResult`]s.
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Run the catalog, failing fast once any phase has a failure
//! taskforge run tasks.toml --fail-fast
//!
//! # Show the phase plan without executing anything
//! taskforge plan tasks.toml
//!
//! # Check that required tools are on PATH
//! taskforge doctor --tool docker --tool curl
//! ```
//!
//! # Exit codes
//!
//! The binary exits 0 iff no task failed; see [`ExitCode`] for the full
//! table (task failure, config error, dependency cycle, missing
//! prerequisite, internal error).

// Stable public surface, re-exported from the workspace crates.
pub use taskforge_engine::{
    Environment, ExecutionPlan, FixtureStore, Orchestrator, OrchestratorConfig, PhaseExecutor,
    ResultsStore, TaskResult, TaskRunner, TaskSpec, TaskStatus, build_plan, filter_tasks,
};
pub use taskforge_engine::{CheckStatus, PreflightCheck, run_preflight};
pub use taskforge_runner::{ActionSpec, CommandSpec};
pub use taskforge_utils::error::{ConfigError, PlanError, PrereqError, TaskforgeError};
pub use taskforge_utils::exit_codes::ExitCode;
pub use taskforge_utils::logging::init_tracing;

// CLI implementation; exposed for white-box testing, not part of the stable
// public API.
#[doc(hidden)]
pub mod cli;
