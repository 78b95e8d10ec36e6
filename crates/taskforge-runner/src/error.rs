use thiserror::Error;

/// Errors from the process execution layer.
///
/// A timeout is *not* an error here: it is reported through
/// [`ProcessOutput::timed_out`](crate::ProcessOutput) so callers can fold it
/// into their own failure accounting. Only the inability to run or observe
/// the process at all surfaces as `RunnerError`.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
