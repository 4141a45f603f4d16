//! Bounded external process execution.

use crate::error::ProvisionError;
use crate::exec::ToolOutput;
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use tracing::debug;
use wait_timeout::ChildExt;

/// Run a program to completion with a bounded wait. On expiry the child is
/// killed and the call fails with `Timeout`; a non-zero exit is not an
/// error here — callers decide what a failed invocation means.
pub fn run_with_timeout(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<ToolOutput, ProvisionError> {
    debug!(program, ?args, "running external tool");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ProvisionError::Process {
            program: program.to_string(),
            source,
        })?;

    // Drain pipes on reader threads so a chatty child cannot fill the pipe
    // buffer and deadlock against wait().
    let stdout_handle = spawn_reader(child.stdout.take());
    let stderr_handle = spawn_reader(child.stderr.take());

    let status = child
        .wait_timeout(timeout)
        .map_err(|source| ProvisionError::Process {
            program: program.to_string(),
            source,
        })?;

    match status {
        Some(status) => {
            let stdout = stdout_handle.join().unwrap_or_default();
            let stderr = stderr_handle.join().unwrap_or_default();
            Ok(ToolOutput {
                exit_code: status.code().unwrap_or(-1),
                stdout,
                stderr,
            })
        }
        None => {
            let _ = child.kill();
            let _ = child.wait();
            Err(ProvisionError::Timeout {
                operation: format!("{} {}", program, args.join(" ")),
                seconds: timeout.as_secs(),
            })
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut collected = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut collected);
        }
        collected
    })
}
