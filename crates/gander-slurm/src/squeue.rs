//! Queued/running jobs and partition membership via squeue.

use crate::types::{JobState, QueuedJob};
use gander_parsers::{
    parse_slurm_timestamp, run_command, split_padded, CommandError, COMMAND_TIMEOUT,
};
use std::collections::BTreeSet;
use tokio::process::Command;

/// squeue output format:
/// %i - Job ID
/// %j - Job name
/// %T - State (extended)
/// %S - Start time
/// %C - CPUs
/// %m - Minimum memory
/// %l - Time limit
const SQUEUE_FORMAT: &str = "%i,%j,%T,%S,%C,%m,%l";

/// Parse one comma-delimited squeue row. Short rows are padded, never
/// dropped; a missing trailing field must not hide a job.
fn parse_queued_line(line: &str) -> QueuedJob {
    let fields = split_padded(line, ',', 7);
    QueuedJob {
        id: fields[0].trim().to_string(),
        name: fields[1].trim().to_string(),
        state: JobState::parse(fields[2]),
        start_time: parse_slurm_timestamp(fields[3].trim()),
        cpus: fields[4].trim().parse().ok(),
        memory: fields[5].trim().to_string(),
        time_limit: fields[6].trim().to_string(),
    }
}

/// Query the current user's queued and running jobs in one partition.
pub async fn query_queued_jobs(
    user: &str,
    partition: &str,
) -> Result<Vec<QueuedJob>, CommandError> {
    let mut cmd = Command::new("squeue");
    cmd.args([
        "-u",
        user,
        "-p",
        partition,
        &format!("--format={SQUEUE_FORMAT}"),
        "--noheader",
    ]);

    let stdout = run_command(&mut cmd, "squeue", COMMAND_TIMEOUT).await?;
    Ok(stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(parse_queued_line)
        .collect())
}

/// Query the set of partitions in which `user` currently has any job.
///
/// Input for the membership poller; only the partition names matter.
pub async fn query_active_partitions(user: &str) -> Result<BTreeSet<String>, CommandError> {
    let mut cmd = Command::new("squeue");
    cmd.args(["-u", user, "--noheader", "--format=%P"]);

    let stdout = run_command(&mut cmd, "squeue", COMMAND_TIMEOUT).await?;
    Ok(stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| l.trim_end_matches('*').to_string())
        .collect())
}
