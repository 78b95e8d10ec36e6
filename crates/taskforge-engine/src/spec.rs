use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use taskforge_runner::ActionSpec;

/// Execution environment a task targets.
///
/// `Any` is the wildcard: it matches every requested environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Local,
    Container,
    Vm,
    Any,
}

impl Environment {
    /// Whether a task tagged with `self` should run for the given requested
    /// set. An empty request, or a request containing `any`, matches
    /// everything.
    #[must_use]
    pub fn matches(self, requested: &[Environment]) -> bool {
        self == Environment::Any
            || requested.is_empty()
            || requested.contains(&Environment::Any)
            || requested.contains(&self)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Local => "local",
            Self::Container => "container",
            Self::Vm => "vm",
            Self::Any => "any",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "container" => Ok(Self::Container),
            "vm" => Ok(Self::Vm),
            "any" => Ok(Self::Any),
            other => Err(format!(
                "unknown environment '{other}' (expected local, container, vm, or any)"
            )),
        }
    }
}

/// One declared unit of work, immutable once registered.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    /// Unique identifier, referenced by other tasks' `dependencies`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Environment tag; `any` matches every requested environment.
    pub environment: Environment,
    /// Hard upper bound for one execution attempt.
    pub timeout: Duration,
    /// Extra attempts after the first; total attempts = `retries + 1`.
    pub retries: u32,
    /// Ids of tasks that must complete in an earlier phase.
    pub dependencies: Vec<String>,
    /// Free-form tags, used only for filtering.
    pub tags: Vec<String>,
    /// Fixture names to preload before the run.
    pub fixtures: Vec<String>,
    /// The action actually executed.
    pub command: ActionSpec,
    /// Optional action run immediately before `command` on every attempt.
    pub setup: Option<ActionSpec>,
    /// Optional action run immediately after `command` on every attempt.
    pub teardown: Option<ActionSpec>,
    /// Whether this task may share a batch with others. A `false` here
    /// forces a single-task batch even under parallel execution.
    pub parallel: bool,
}

impl TaskSpec {
    /// Create a task running the given shell line, with conservative
    /// defaults: local environment, 60 s timeout, no retries, no
    /// dependencies, batchable.
    #[must_use]
    pub fn shell(id: impl Into<String>, command: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            description: String::new(),
            environment: Environment::Local,
            timeout: Duration::from_secs(60),
            retries: 0,
            dependencies: Vec::new(),
            tags: Vec::new(),
            fixtures: Vec::new(),
            command: ActionSpec::shell(command),
            setup: None,
            teardown: None,
            parallel: true,
            id,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    #[must_use]
    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_fixtures<I, S>(mut self, fixtures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fixtures = fixtures.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_setup(mut self, setup: impl Into<String>) -> Self {
        self.setup = Some(ActionSpec::shell(setup));
        self
    }

    #[must_use]
    pub fn with_teardown(mut self, teardown: impl Into<String>) -> Self {
        self.teardown = Some(ActionSpec::shell(teardown));
        self
    }

    /// Mark this task as unwilling to share a batch.
    #[must_use]
    pub fn exclusive(mut self) -> Self {
        self.parallel = false;
        self
    }
}
