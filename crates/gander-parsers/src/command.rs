//! Command execution for scheduler queries.
//!
//! The single I/O boundary: every `sinfo`/`squeue`/`sacct`/`scontrol`
//! invocation goes through here, with a bounded timeout so a hung
//! scheduler cannot stall the caller.

use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Default per-command timeout.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for command execution.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to execute {command}: {error}")]
    Execution { command: String, error: String },
    #[error("Command {command} failed: {stderr}")]
    Failed { command: String, stderr: String },
    #[error("Command {command} timed out after {timeout:?}")]
    Timeout {
        command: String,
        timeout: Duration,
    },
}

/// Execute a command and return stdout as a string.
///
/// Non-zero exit surfaces the command's stderr text; exceeding `timeout`
/// is its own variant so callers can distinguish a slow scheduler from a
/// broken one.
pub async fn run_command(
    cmd: &mut Command,
    name: &str,
    timeout: Duration,
) -> Result<String, CommandError> {
    let output = tokio::time::timeout(timeout, cmd.output())
        .await
        .map_err(|_| CommandError::Timeout {
            command: name.to_string(),
            timeout,
        })?
        .map_err(|e| CommandError::Execution {
            command: name.to_string(),
            error: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CommandError::Failed {
            command: name.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_command_success() {
        let mut cmd = Command::new("echo");
        cmd.arg("hello");
        let result = run_command(&mut cmd, "echo", COMMAND_TIMEOUT).await.unwrap();
        assert_eq!(result.trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_command_not_found() {
        let mut cmd = Command::new("nonexistent_command_12345");
        let result = run_command(&mut cmd, "nonexistent", COMMAND_TIMEOUT).await;
        assert!(matches!(result, Err(CommandError::Execution { .. })));
    }

    #[tokio::test]
    async fn test_run_command_nonzero_exit() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo oops >&2; exit 3"]);
        match run_command(&mut cmd, "sh", COMMAND_TIMEOUT).await {
            Err(CommandError::Failed { stderr, .. }) => assert_eq!(stderr, "oops"),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_command_timeout() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let result = run_command(&mut cmd, "sleep", Duration::from_millis(50)).await;
        assert!(matches!(result, Err(CommandError::Timeout { .. })));
    }
}
