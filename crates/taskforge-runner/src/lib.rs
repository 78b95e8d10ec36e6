//! Process execution for task actions.
//!
//! All process execution goes through [`CommandSpec`] to ensure argv-style
//! invocation: a task's opaque shell line is always the single argument of
//! the platform shell, never re-tokenized by this crate. Execution is async
//! (tokio) with a hard per-invocation deadline and optional live streaming
//! of captured output.

pub mod action;
pub mod command_spec;
pub mod error;
pub mod process;

pub use action::ActionSpec;
pub use command_spec::CommandSpec;
pub use error::RunnerError;
pub use process::{EchoPrefix, ProcessOutput, run};
