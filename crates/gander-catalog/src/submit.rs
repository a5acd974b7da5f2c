//! Submission: sbatch for batch scripts, srun-in-a-terminal for
//! interactive shells.
//!
//! Submission failures are the one class of error that is always
//! user-visible, stderr verbatim. Nothing here retries — resubmitting
//! could duplicate a job.

use crate::request::JobRequest;
use camino::Utf8Path;
use gander_parsers::{run_command, CommandError, COMMAND_TIMEOUT};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tokio::process::Command;

static JOB_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"Submitted batch job (\d+)").unwrap());

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("failed to launch terminal {terminal}: {error}")]
    Terminal { terminal: String, error: String },
}

/// Result of a batch submission that the scheduler accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted { job_id: u64 },
    /// sbatch exited zero but its confirmation line didn't match; the job
    /// exists, its id just isn't known. Distinct from failure.
    SubmittedIdUnknown,
}

/// Pull the job id out of sbatch's confirmation text.
pub fn parse_submit_confirmation(stdout: &str) -> SubmitOutcome {
    JOB_ID
        .captures(stdout)
        .and_then(|c| c[1].parse().ok())
        .map(|job_id| SubmitOutcome::Submitted { job_id })
        .unwrap_or(SubmitOutcome::SubmittedIdUnknown)
}

/// Submit a batch script with the request's resource flags.
pub async fn submit_batch(
    request: &JobRequest,
    script: &Utf8Path,
) -> Result<SubmitOutcome, SubmitError> {
    let mut cmd = Command::new("sbatch");
    cmd.args(request.sbatch_args(script.as_str()));

    let stdout = run_command(&mut cmd, "sbatch", COMMAND_TIMEOUT).await?;
    Ok(parse_submit_confirmation(&stdout))
}

/// How to open a terminal window around the interactive srun call.
#[derive(Debug, Clone)]
pub struct TerminalLauncher {
    pub program: String,
    pub title_flag: String,
    pub exec_flag: String,
}

impl Default for TerminalLauncher {
    fn default() -> Self {
        Self {
            program: "mate-terminal".to_string(),
            title_flag: "--title".to_string(),
            exec_flag: "-e".to_string(),
        }
    }
}

impl TerminalLauncher {
    /// Argument vector launching `shell_command` in a titled terminal
    /// window that stays open after the job ends.
    pub fn args(&self, title: &str, shell_command: &str) -> Vec<String> {
        vec![
            self.title_flag.clone(),
            title.to_string(),
            self.exec_flag.clone(),
            format!("bash -c '{shell_command}; echo \"Press Enter to close\"; read'"),
        ]
    }
}

/// Start an interactive job: spawn the terminal and return without
/// waiting for it. The srun inside owns the allocation's lifetime.
pub fn launch_interactive(
    request: &JobRequest,
    terminal: &TerminalLauncher,
) -> Result<(), SubmitError> {
    let title = format!("Interactive Job - {}", request.partition);
    let shell_command = request.srun_shell_command();

    std::process::Command::new(&terminal.program)
        .args(terminal.args(&title, &shell_command))
        .spawn()
        .map_err(|e| SubmitError::Terminal {
            terminal: terminal.program.clone(),
            error: e.to_string(),
        })?;

    tracing::info!(
        partition = %request.partition,
        time = %request.time_string(),
        "started interactive job"
    );
    Ok(())
}
