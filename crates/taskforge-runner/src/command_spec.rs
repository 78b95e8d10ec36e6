use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use tokio::process::Command as TokioCommand;

/// Specification for a command to execute.
///
/// Arguments are stored as discrete `OsString` elements rather than a shell
/// string, so nothing this crate builds is ever re-interpreted by a shell.
/// The one place shell evaluation happens is [`ActionSpec`](crate::ActionSpec),
/// which passes the user's opaque action line as a single argv element to
/// `sh -c` / `cmd /C`.
///
/// # Example
///
/// ```rust
/// use taskforge_runner::CommandSpec;
///
/// let cmd = CommandSpec::new("sh")
///     .arg("-c")
///     .arg("echo hello")
///     .cwd("/tmp");
/// assert_eq!(cmd.args.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    /// The program to execute.
    pub program: OsString,
    /// Arguments as discrete elements.
    pub args: Vec<OsString>,
    /// Optional working directory.
    pub cwd: Option<PathBuf>,
    /// Optional environment overrides, layered on the inherited environment.
    pub env: Option<HashMap<OsString, OsString>>,
}

impl CommandSpec {
    /// Create a new `CommandSpec` for the given program.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: None,
        }
    }

    /// Append a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append multiple arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set an environment variable for the child process.
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Convert into a `tokio::process::Command` for async execution.
    #[must_use]
    pub fn to_tokio_command(&self) -> TokioCommand {
        let mut cmd = TokioCommand::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        if let Some(ref env) = self.env {
            for (key, value) in env {
                cmd.env(key, value);
            }
        }

        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_chain() {
        let cmd = CommandSpec::new("sh")
            .arg("-c")
            .args(["echo hi"])
            .cwd("/work")
            .env("DEBUG", "1");

        assert_eq!(cmd.program, OsString::from("sh"));
        assert_eq!(cmd.args.len(), 2);
        assert_eq!(cmd.cwd, Some(PathBuf::from("/work")));
        assert_eq!(cmd.env.as_ref().map(HashMap::len), Some(1));
    }

    #[test]
    fn shell_metacharacters_are_preserved() {
        // A single argv element, stored literally; no expansion here.
        let cmd = CommandSpec::new("echo").arg("$(whoami); rm -rf /");
        assert_eq!(cmd.args[0], OsString::from("$(whoami); rm -rf /"));
    }

    #[test]
    fn default_is_empty() {
        let cmd = CommandSpec::default();
        assert!(cmd.program.is_empty());
        assert!(cmd.args.is_empty());
        assert!(cmd.cwd.is_none());
        assert!(cmd.env.is_none());
    }
}
