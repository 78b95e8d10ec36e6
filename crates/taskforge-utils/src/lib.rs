//! Shared infrastructure for taskforge: error taxonomy, exit codes, and
//! logging initialization.
//!
//! Library code returns [`TaskforgeError`] and never calls
//! `std::process::exit()`; the CLI maps errors to [`ExitCode`] values.

pub mod error;
pub mod exit_codes;
pub mod logging;

pub use error::{ConfigError, PlanError, PrereqError, TaskforgeError};
pub use exit_codes::ExitCode;
pub use logging::init_tracing;
