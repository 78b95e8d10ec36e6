//! Command-line interface for taskforge
//!
//! Thin glue only: parses arguments, loads the task catalog from TOML,
//! builds an [`OrchestratorConfig`], and maps outcomes to exit codes. All
//! engine semantics live in the library crates.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use crate::{
    ActionSpec, Environment, ExitCode, Orchestrator, OrchestratorConfig, TaskSpec, TaskStatus,
    build_plan, filter_tasks, init_tracing, run_preflight,
};

/// taskforge - dependency-aware task orchestration
#[derive(Parser)]
#[command(name = "taskforge")]
#[command(about = "Run catalogs of inter-dependent tasks with bounded parallelism, retries, and reports")]
#[command(long_about = r#"
taskforge resolves a catalog of declarative tasks into dependency-ordered
phases and runs them as external processes under configurable concurrency,
timeout, and retry policy.

EXAMPLES:
  # Run a catalog with bounded parallelism and fail-fast
  taskforge run tasks.toml --parallel --max-parallel 4 --fail-fast

  # Restrict to container tasks tagged "smoke"
  taskforge run tasks.toml --env container --tag smoke

  # Show the phase plan without executing anything
  taskforge plan tasks.toml

  # Verify required tools are on PATH
  taskforge doctor --tool docker --tool curl
"#)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Stream task output live and enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a task catalog
    Run {
        /// Path to the TOML task catalog
        catalog: PathBuf,

        /// Run phase tasks concurrently in bounded batches
        #[arg(long)]
        parallel: bool,

        /// Upper bound on concurrently running tasks
        #[arg(long, default_value_t = 4)]
        max_parallel: usize,

        /// Stop scheduling further phases once a phase has a failure
        #[arg(long)]
        fail_fast: bool,

        /// Environments to run (repeatable); defaults to local
        #[arg(long = "env", value_parser = parse_environment)]
        environments: Vec<Environment>,

        /// Keep only tasks carrying one of these tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Drop tasks carrying any of these tags (repeatable)
        #[arg(long = "exclude-tag")]
        exclude_tags: Vec<String>,

        /// Working directory for spawned processes
        #[arg(long, default_value = ".")]
        project_root: PathBuf,

        /// Directory holding <name>.json fixture files
        #[arg(long, default_value = "fixtures")]
        fixture_dir: PathBuf,

        /// Directory report artifacts are written into
        #[arg(long, default_value = "reports")]
        report_dir: PathBuf,

        /// Binaries that must be on PATH before any task runs (repeatable)
        #[arg(long = "require-tool")]
        required_tools: Vec<String>,

        /// Shell action run once before the first phase; failure is fatal
        #[arg(long)]
        global_setup: Option<String>,

        /// Shell action always run after the last phase, best-effort
        #[arg(long)]
        global_teardown: Option<String>,
    },

    /// Resolve and print the phase plan without executing anything
    Plan {
        /// Path to the TOML task catalog
        catalog: PathBuf,

        /// Environments to include (repeatable); defaults to local
        #[arg(long = "env", value_parser = parse_environment)]
        environments: Vec<Environment>,

        /// Keep only tasks carrying one of these tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Drop tasks carrying any of these tags (repeatable)
        #[arg(long = "exclude-tag")]
        exclude_tags: Vec<String>,
    },

    /// Check that required external tools are available
    Doctor {
        /// Tool to look up on PATH (repeatable)
        #[arg(long = "tool")]
        tools: Vec<String>,
    },
}

fn parse_environment(raw: &str) -> Result<Environment, String> {
    raw.parse()
}

/// Entry point used by main(); handles all output including errors.
///
/// # Errors
/// Returns the exit code the process should terminate with.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();
    // A second init (e.g. under tests) is harmless.
    let _ = init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            catalog,
            parallel,
            max_parallel,
            fail_fast,
            environments,
            tags,
            exclude_tags,
            project_root,
            fixture_dir,
            report_dir,
            required_tools,
            global_setup,
            global_teardown,
        } => {
            let config = OrchestratorConfig {
                parallel,
                max_parallel,
                fail_fast,
                verbose: cli.verbose,
                environments: defaulted_environments(environments),
                tags,
                exclude_tags,
                project_root,
                fixture_dir,
                report_dir,
                required_tools,
                global_setup: global_setup.map(ActionSpec::shell),
                global_teardown: global_teardown.map(ActionSpec::shell),
                ..OrchestratorConfig::default()
            };
            let tasks = load_catalog(&catalog, &config).map_err(|err| {
                eprintln!("error: {err:#}");
                ExitCode::CONFIG
            })?;
            run_catalog(&tasks, config)
        }
        Commands::Plan {
            catalog,
            environments,
            tags,
            exclude_tags,
        } => {
            let config = OrchestratorConfig {
                environments: defaulted_environments(environments),
                tags,
                exclude_tags,
                ..OrchestratorConfig::default()
            };
            let tasks = load_catalog(&catalog, &config).map_err(|err| {
                eprintln!("error: {err:#}");
                ExitCode::CONFIG
            })?;
            print_plan(&tasks, &config)
        }
        Commands::Doctor { tools } => doctor(&tools),
    }
}

fn defaulted_environments(environments: Vec<Environment>) -> Vec<Environment> {
    if environments.is_empty() {
        vec![Environment::Local]
    } else {
        environments
    }
}

fn run_catalog(tasks: &[TaskSpec], config: OrchestratorConfig) -> Result<(), ExitCode> {
    let runtime = tokio::runtime::Runtime::new().map_err(|err| {
        eprintln!("error: failed to start async runtime: {err}");
        ExitCode::INTERNAL
    })?;

    let orchestrator = Orchestrator::new(config);
    match runtime.block_on(orchestrator.run(tasks)) {
        Ok(results) => {
            if results.iter().any(|r| r.status == TaskStatus::Failed) {
                Err(ExitCode::TASK_FAILED)
            } else {
                Ok(())
            }
        }
        Err(err) => {
            eprintln!("error: {err}");
            Err(err.to_exit_code())
        }
    }
}

fn print_plan(tasks: &[TaskSpec], config: &OrchestratorConfig) -> Result<(), ExitCode> {
    let selected = filter_tasks(tasks, config);
    let plan = build_plan(&selected).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::DEPENDENCY
    })?;

    println!(
        "{} tasks in {} phases",
        plan.task_count(),
        plan.phases.len()
    );
    for (index, phase) in plan.phases.iter().enumerate() {
        let ids: Vec<&str> = phase.iter().map(|t| t.id.as_str()).collect();
        println!("phase {}: {}", index + 1, ids.join(", "));
    }
    Ok(())
}

fn doctor(tools: &[String]) -> Result<(), ExitCode> {
    let checks = run_preflight(tools);
    let mut failed = false;
    for check in &checks {
        let status = if check.ok() { "ok" } else { "FAIL" };
        println!("{status:4}  {}  {}", check.name, check.details);
        failed |= !check.ok();
    }
    if failed {
        Err(ExitCode::PREREQUISITE)
    } else {
        println!("all {} checks passed", checks.len());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Catalog file format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    defaults: CatalogDefaults,
    #[serde(default)]
    tasks: Vec<CatalogTask>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogDefaults {
    timeout_ms: Option<u64>,
    retries: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CatalogTask {
    id: String,
    name: Option<String>,
    #[serde(default)]
    description: String,
    environment: Option<Environment>,
    timeout_ms: Option<u64>,
    retries: Option<u32>,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    fixtures: Vec<String>,
    command: String,
    setup: Option<String>,
    teardown: Option<String>,
    parallel: Option<bool>,
}

/// Load and resolve a TOML catalog: catalog-level defaults fill omitted
/// per-task timeout/retries, then config defaults fill the rest.
fn load_catalog(path: &PathBuf, config: &OrchestratorConfig) -> Result<Vec<TaskSpec>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading task catalog {}", path.display()))?;
    let file: CatalogFile = toml::from_str(&raw)
        .with_context(|| format!("parsing task catalog {}", path.display()))?;

    let default_timeout = file
        .defaults
        .timeout_ms
        .map_or(config.default_timeout, Duration::from_millis);
    let default_retries = file.defaults.retries.unwrap_or(config.default_retries);

    Ok(file
        .tasks
        .into_iter()
        .map(|task| {
            let mut spec = TaskSpec::shell(task.id, task.command)
                .with_description(task.description)
                .with_timeout(task.timeout_ms.map_or(default_timeout, Duration::from_millis))
                .with_retries(task.retries.unwrap_or(default_retries))
                .with_dependencies(task.dependencies)
                .with_tags(task.tags)
                .with_fixtures(task.fixtures);
            if let Some(name) = task.name {
                spec = spec.with_name(name);
            }
            if let Some(environment) = task.environment {
                spec = spec.with_environment(environment);
            }
            if let Some(setup) = task.setup {
                spec = spec.with_setup(setup);
            }
            if let Some(teardown) = task.teardown {
                spec = spec.with_teardown(teardown);
            }
            if task.parallel == Some(false) {
                spec = spec.exclusive();
            }
            spec
        })
        .collect())
}
