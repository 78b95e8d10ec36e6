use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::command_spec::CommandSpec;
use crate::error::RunnerError;

/// Captured outcome of one process invocation.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Combined stdout/stderr, line-interleaved in arrival order.
    pub output: String,
    /// Exit code, `None` if the process was killed or terminated by signal.
    pub exit_code: Option<i32>,
    /// Whether the deadline elapsed and the process was killed.
    pub timed_out: bool,
}

impl ProcessOutput {
    /// The invocation succeeded: exit code 0 within the deadline.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0) && !self.timed_out
    }
}

/// Label prepended to live-streamed lines so concurrent tasks stay
/// attributable.
#[derive(Debug, Clone)]
pub struct EchoPrefix(pub String);

/// Run a command to completion with a hard deadline.
///
/// stdout and stderr are captured line by line into a combined buffer; with
/// `echo` set, each line is also streamed to this process's own
/// stdout/stderr as it arrives, prefixed for attribution under concurrency.
///
/// If the deadline elapses the child receives a kill signal and the call
/// returns immediately with whatever output had arrived by then — nothing
/// written after the kill is awaited.
///
/// # Errors
/// Returns [`RunnerError`] only when the process cannot be spawned or
/// observed; a non-zero exit or a timeout is reported in the output.
pub async fn run(
    spec: &CommandSpec,
    timeout: Duration,
    echo: Option<&EchoPrefix>,
) -> Result<ProcessOutput, RunnerError> {
    let program = spec.program.to_string_lossy().into_owned();

    let mut cmd = spec.to_tokio_command();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(program = %program, timeout_ms = timeout.as_millis() as u64, "spawning process");
    let mut child = cmd.spawn().map_err(|source| RunnerError::Spawn {
        program: program.clone(),
        source,
    })?;

    let buffer = Arc::new(Mutex::new(String::new()));
    let mut pumps: Vec<JoinHandle<()>> = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        pumps.push(pump_lines(stdout, Arc::clone(&buffer), echo.cloned(), false));
    }
    if let Some(stderr) = child.stderr.take() {
        pumps.push(pump_lines(stderr, Arc::clone(&buffer), echo.cloned(), true));
    }

    match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => {
            // Drain whatever the pumps have not flushed yet.
            for pump in pumps {
                let _ = pump.await;
            }
            Ok(ProcessOutput {
                output: take_buffer(&buffer),
                exit_code: status.code(),
                timed_out: false,
            })
        }
        Ok(Err(source)) => {
            for pump in pumps {
                pump.abort();
            }
            Err(RunnerError::Wait { program, source })
        }
        Err(_elapsed) => {
            let _ = child.start_kill();
            for pump in pumps {
                pump.abort();
            }
            Ok(ProcessOutput {
                output: take_buffer(&buffer),
                exit_code: None,
                timed_out: true,
            })
        }
    }
}

fn pump_lines(
    reader: impl AsyncRead + Unpin + Send + 'static,
    buffer: Arc<Mutex<String>>,
    echo: Option<EchoPrefix>,
    is_stderr: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if let Some(EchoPrefix(prefix)) = &echo {
                if is_stderr {
                    eprintln!("[{prefix}] {line}");
                } else {
                    println!("[{prefix}] {line}");
                }
            }
            // The lock is never held across an await, so an abort cannot
            // poison it.
            if let Ok(mut buf) = buffer.lock() {
                buf.push_str(&line);
                buf.push('\n');
            }
        }
    })
}

fn take_buffer(buffer: &Arc<Mutex<String>>) -> String {
    buffer.lock().map(|buf| buf.clone()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionSpec;
    use std::path::Path;
    use std::time::Instant;

    fn shell(line: &str) -> CommandSpec {
        ActionSpec::shell(line).to_command_spec(Path::new("."))
    }

    #[tokio::test]
    async fn captures_exit_code_and_output() {
        let out = run(&shell("echo hi; echo err >&2"), Duration::from_secs(5), None)
            .await
            .expect("spawn");
        assert!(out.success());
        assert_eq!(out.exit_code, Some(0));
        assert!(out.output.contains("hi"));
        assert!(out.output.contains("err"));
    }

    #[tokio::test]
    async fn non_zero_exit_is_not_success() {
        let out = run(&shell("exit 3"), Duration::from_secs(5), None)
            .await
            .expect("spawn");
        assert!(!out.success());
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.timed_out);
    }

    #[tokio::test]
    async fn deadline_kills_the_process() {
        let started = Instant::now();
        let out = run(&shell("sleep 5"), Duration::from_millis(100), None)
            .await
            .expect("spawn");
        assert!(out.timed_out);
        assert!(!out.success());
        assert_eq!(out.exit_code, None);
        // Returned promptly rather than waiting out the sleep.
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let spec = CommandSpec::new("taskforge-no-such-binary");
        let err = run(&spec, Duration::from_secs(1), None)
            .await
            .expect_err("should fail to spawn");
        assert!(matches!(err, RunnerError::Spawn { .. }));
    }
}
