//! Completed-job history via sacct.

use crate::types::{CompletedJob, JobState};
use chrono::{DateTime, Utc};
use gander_parsers::{
    parse_slurm_timestamp, run_command, split_padded, CommandError, COMMAND_TIMEOUT,
};
use tokio::process::Command;

/// sacct output format (`-P` uses | delimiter). One format serves both
/// the per-partition history view and the usage aggregator.
const SACCT_FORMAT: &str =
    "JobID,JobName,Partition,State,Start,End,NCPUS,ReqMem,Elapsed,Account";

/// Sub-task id suffixes whose rows duplicate the parent job's resource
/// usage and would double-count in aggregation.
const STEP_SUFFIXES: [&str; 2] = [".batch", ".extern"];

fn is_step_row(id: &str) -> bool {
    STEP_SUFFIXES.iter().any(|suffix| id.ends_with(suffix))
}

fn parse_sacct_line(line: &str) -> CompletedJob {
    let fields = split_padded(line, '|', 10);
    CompletedJob {
        id: fields[0].trim().to_string(),
        name: fields[1].trim().to_string(),
        partition: fields[2].trim().to_string(),
        state: JobState::parse(fields[3]),
        start_time: parse_slurm_timestamp(fields[4].trim()),
        end_time: parse_slurm_timestamp(fields[5].trim()),
        cpus: fields[6].trim().parse().ok(),
        req_mem: fields[7].trim().to_string(),
        elapsed: fields[8].trim().to_string(),
        account: fields[9].trim().to_string(),
    }
}

/// Query the user's finished jobs since `since`, optionally restricted to
/// one partition.
///
/// Batch/extern pseudo-step rows are dropped, and only terminal states
/// are retained; everything else is assumed still in flight and belongs
/// to the queued view.
pub async fn query_completed_jobs(
    user: &str,
    partition: Option<&str>,
    since: DateTime<Utc>,
) -> Result<Vec<CompletedJob>, CommandError> {
    let mut cmd = Command::new("sacct");
    cmd.args(["-u", user]);
    if let Some(p) = partition {
        cmd.args(["-r", p]);
    }
    cmd.args([
        "-S",
        &since.format("%Y-%m-%d").to_string(),
        &format!("--format={SACCT_FORMAT}"),
        "-P",
        "--noheader",
    ]);

    let stdout = run_command(&mut cmd, "sacct", COMMAND_TIMEOUT).await?;
    Ok(filter_completed(stdout.lines()))
}

/// The row filter, split out so the exclusion rules are testable without
/// a scheduler.
fn filter_completed<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<CompletedJob> {
    lines
        .filter(|l| !l.trim().is_empty())
        .map(parse_sacct_line)
        .filter(|job| !is_step_row(&job.id))
        .filter(|job| job.state.is_terminal())
        .collect()
}
