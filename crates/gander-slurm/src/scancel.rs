//! Job cancellation via scancel.

use gander_parsers::{run_command, CommandError, COMMAND_TIMEOUT};
use tokio::process::Command;

/// Cancel a job. Success is confirmed by exit code zero; failure carries
/// scancel's stderr verbatim. Never retried here — retry is caller policy.
pub async fn cancel_job(job_id: &str) -> Result<(), CommandError> {
    let mut cmd = Command::new("scancel");
    cmd.arg(job_id);
    run_command(&mut cmd, "scancel", COMMAND_TIMEOUT).await?;
    Ok(())
}
