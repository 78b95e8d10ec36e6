use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use taskforge_runner::ActionSpec;
use taskforge_utils::error::ConfigError;

use crate::spec::Environment;

/// Run-wide orchestration policy.
///
/// `default_retries` / `default_timeout` are catalog-level defaults applied
/// when a task omits the field at load time; every [`TaskSpec`](crate::TaskSpec)
/// carries its own concrete values by the time it reaches the engine.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorConfig {
    /// Run phase tasks concurrently in bounded batches.
    pub parallel: bool,
    /// Upper bound on concurrently running tasks within a phase.
    pub max_parallel: usize,
    /// Stop scheduling further phases once a completed phase has a failure.
    pub fail_fast: bool,
    /// Stream captured task output live.
    pub verbose: bool,

    pub default_retries: u32,
    #[serde(serialize_with = "as_millis")]
    pub default_timeout: Duration,

    /// Requested environments; empty means no environment restriction.
    pub environments: Vec<Environment>,
    /// Keep only tasks carrying at least one of these tags (empty = all).
    pub tags: Vec<String>,
    /// Drop tasks carrying any of these tags.
    pub exclude_tags: Vec<String>,

    /// Working directory for every spawned process.
    pub project_root: PathBuf,
    /// Directory holding `<name>.json` fixture files.
    pub fixture_dir: PathBuf,
    /// Directory report artifacts are written into.
    pub report_dir: PathBuf,

    /// Fixed sleep between attempts of a failing task.
    #[serde(serialize_with = "as_millis")]
    pub retry_backoff: Duration,

    /// Binaries that must be on PATH before any task runs.
    pub required_tools: Vec<String>,
    /// Optional action run once before the first phase; failure is fatal.
    pub global_setup: Option<ActionSpec>,
    /// Optional best-effort cleanup action; always attempted, never fatal.
    pub global_teardown: Option<ActionSpec>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            max_parallel: 4,
            fail_fast: false,
            verbose: false,
            default_retries: 0,
            default_timeout: Duration::from_secs(60),
            environments: Vec::new(),
            tags: Vec::new(),
            exclude_tags: Vec::new(),
            project_root: PathBuf::from("."),
            fixture_dir: PathBuf::from("fixtures"),
            report_dir: PathBuf::from("reports"),
            retry_backoff: Duration::from_secs(2),
            required_tools: Vec::new(),
            global_setup: None,
            global_teardown: None,
        }
    }
}

impl OrchestratorConfig {
    /// Reject configurations the engine cannot honor.
    ///
    /// # Errors
    /// `ConfigError::MaxParallelZero` when `max_parallel` is 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_parallel == 0 {
            return Err(ConfigError::MaxParallelZero);
        }
        Ok(())
    }
}

fn as_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(OrchestratorConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_max_parallel_is_rejected() {
        let config = OrchestratorConfig {
            max_parallel: 0,
            ..OrchestratorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MaxParallelZero)
        ));
    }

    #[test]
    fn serializes_durations_as_millis() {
        let config = OrchestratorConfig {
            default_timeout: Duration::from_secs(3),
            ..OrchestratorConfig::default()
        };
        let json = serde_json::to_value(&config).expect("serializable");
        assert_eq!(json["default_timeout"], 3000);
        assert_eq!(json["retry_backoff"], 2000);
    }
}
