use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::command_spec::CommandSpec;

/// An executable task action.
///
/// Today the only backend is a line handed to the platform shell; the enum
/// exists so catalogs stay forward-compatible if other backends (e.g. direct
/// argv invocation) are added. In catalog files an action is written as a
/// plain string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionSpec {
    /// A line executed by `sh -c` (or `cmd /C` on Windows).
    Shell(String),
}

impl ActionSpec {
    /// Create a shell action from the given line.
    #[must_use]
    pub fn shell(line: impl Into<String>) -> Self {
        Self::Shell(line.into())
    }

    /// Lower this action to an argv-style [`CommandSpec`] rooted at
    /// `project_root`.
    ///
    /// The action line is always a single argv element; the shell receives
    /// it verbatim and the inherited environment is untouched.
    #[must_use]
    pub fn to_command_spec(&self, project_root: &Path) -> CommandSpec {
        match self {
            Self::Shell(line) => shell_invocation(line).cwd(project_root),
        }
    }
}

#[cfg(windows)]
fn shell_invocation(line: &str) -> CommandSpec {
    CommandSpec::new("cmd").arg("/C").arg(line)
}

#[cfg(not(windows))]
fn shell_invocation(line: &str) -> CommandSpec {
    CommandSpec::new("sh").arg("-c").arg(line)
}

impl fmt::Display for ActionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shell(line) => write!(f, "{line}"),
        }
    }
}
