//! Preflight environment checks run before any task executes.

use serde::Serialize;
use tracing::debug;

/// Outcome of one preflight check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
}

/// One named preflight check with human-readable details.
#[derive(Debug, Clone, Serialize)]
pub struct PreflightCheck {
    pub name: String,
    pub status: CheckStatus,
    pub details: String,
}

impl PreflightCheck {
    /// Whether this check passed.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.status == CheckStatus::Pass
    }
}

/// Probe PATH for every required tool.
///
/// Checks are returned sorted by name for stable output; the caller decides
/// whether a failure is fatal.
#[must_use]
pub fn run_preflight(required_tools: &[String]) -> Vec<PreflightCheck> {
    let mut checks: Vec<PreflightCheck> = required_tools.iter().map(|tool| check_tool(tool)).collect();
    checks.sort_by(|a, b| a.name.cmp(&b.name));
    checks
}

fn check_tool(tool: &str) -> PreflightCheck {
    match which::which(tool) {
        Ok(path) => {
            debug!(tool, path = %path.display(), "required tool found");
            PreflightCheck {
                name: format!("tool:{tool}"),
                status: CheckStatus::Pass,
                details: format!("found {tool} at {}", path.display()),
            }
        }
        Err(_) => PreflightCheck {
            name: format!("tool:{tool}"),
            status: CheckStatus::Fail,
            details: format!("{tool} not found in PATH"),
        },
    }
}
