//! Reservation listing and job log-file discovery via scontrol.

use crate::types::Reservation;
use camino::Utf8PathBuf;
use gander_parsers::{
    parse_node_range_count, parse_slurm_timestamp, run_command, CommandError, COMMAND_TIMEOUT,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;

static KEY_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)=(\S+)").unwrap());

/// Pull one `Key=value` pair out of an scontrol `-o` line.
fn extract<'a>(entry: &'a str, key: &str) -> Option<&'a str> {
    KEY_VALUE
        .captures_iter(entry)
        .find(|c| &c[1] == key)
        .map(|c| c.get(2).unwrap().as_str())
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// `n/a` is scontrol's sentinel for an unset user/account list.
fn extract_list(entry: &str, key: &str) -> Option<Vec<String>> {
    extract(entry, key)
        .filter(|v| *v != "n/a" && *v != "(null)")
        .map(|v| v.split(',').map(str::to_string).collect())
}

/// Parse one reservation entry (`scontrol show reservation -o` emits one
/// per line). Duration is derived and absent unless both endpoints are
/// known; `Unknown` means not-yet-determined, not a parse error.
fn parse_reservation(entry: &str) -> Option<Reservation> {
    let name = extract(entry, "ReservationName")?.to_string();
    let start_time = extract(entry, "StartTime").and_then(parse_slurm_timestamp);
    let end_time = extract(entry, "EndTime").and_then(parse_slurm_timestamp);
    let duration = match (start_time, end_time) {
        (Some(start), Some(end)) if end >= start => (end - start).to_std().ok(),
        _ => None,
    };
    let nodes = extract(entry, "Nodes").unwrap_or("").to_string();
    let partitions = extract(entry, "Partition")
        .filter(|v| *v != "(null)")
        .map(|v| v.split(',').map(str::to_string).collect())
        .unwrap_or_default();

    Some(Reservation {
        node_count: parse_node_range_count(&nodes),
        name,
        start_time,
        end_time,
        duration,
        nodes,
        partitions,
        users: extract_list(entry, "Users"),
        accounts: extract_list(entry, "Accounts"),
    })
}

/// Query all reservations.
pub async fn query_reservations() -> Result<Vec<Reservation>, CommandError> {
    let mut cmd = Command::new("scontrol");
    cmd.args(["show", "reservation", "-o"]);

    let stdout = run_command(&mut cmd, "scontrol", COMMAND_TIMEOUT).await?;

    // "No reservations in the system" arrives on stdout with exit 0
    Ok(stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(parse_reservation)
        .collect())
}

/// Resolved stdout/stderr log locations for one job.
#[derive(Debug, Clone)]
pub struct JobLogPaths {
    pub stdout: Utf8PathBuf,
    pub stderr: Utf8PathBuf,
    pub work_dir: Utf8PathBuf,
}

/// Resolve a job's log files from `scontrol show job`.
///
/// Older SLURM versions echo the key name itself or `(null)` for unset
/// `StdOut`/`StdErr`; those fall back to `<WorkDir>/slurm-<id>.out|.err`.
pub async fn query_job_log_paths(job_id: &str) -> Result<JobLogPaths, CommandError> {
    let mut cmd = Command::new("scontrol");
    cmd.args(["show", "job", job_id]);

    let stdout = run_command(&mut cmd, "scontrol", COMMAND_TIMEOUT).await?;
    parse_job_log_paths(&stdout, job_id).ok_or_else(|| CommandError::Failed {
        command: "scontrol".to_string(),
        stderr: format!("no WorkDir reported for job {job_id}"),
    })
}

fn parse_job_log_paths(output: &str, job_id: &str) -> Option<JobLogPaths> {
    let work_dir = Utf8PathBuf::from(extract(output, "WorkDir")?);

    let resolve = |key: &str, suffix: &str| -> Utf8PathBuf {
        match extract(output, key) {
            Some(path) if path != key && path != "(null)" => Utf8PathBuf::from(path),
            _ => work_dir.join(format!("slurm-{job_id}.{suffix}")),
        }
    };

    Some(JobLogPaths {
        stdout: resolve("StdOut", "out"),
        stderr: resolve("StdErr", "err"),
        work_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY: &str = "ReservationName=maint_window StartTime=2025-06-01T08:00:00 \
        EndTime=2025-06-01T20:00:00 Duration=12:00:00 Nodes=node[1-4],gpu01 NodeCnt=5 \
        Partition=compute Users=alice,bob Accounts=n/a";

    #[test]
    fn test_parse_reservation() {
        let res = parse_reservation(ENTRY).unwrap();
        assert_eq!(res.name, "maint_window");
        assert!(res.start_time.is_some());
        assert_eq!(
            res.duration,
            Some(std::time::Duration::from_secs(12 * 3600))
        );
        assert_eq!(res.node_count, 5);
        assert_eq!(res.partitions, vec!["compute"]);
        assert_eq!(
            res.users,
            Some(vec!["alice".to_string(), "bob".to_string()])
        );
        assert_eq!(res.accounts, None);
    }

    #[test]
    fn test_unknown_times_yield_no_duration() {
        let entry = "ReservationName=pending StartTime=Unknown EndTime=Unknown \
            Nodes=n1 Partition=debug Users=n/a Accounts=n/a";
        let res = parse_reservation(entry).unwrap();
        assert!(res.start_time.is_none());
        assert!(res.end_time.is_none());
        assert!(res.duration.is_none());
    }

    #[test]
    fn test_job_log_paths_explicit() {
        let out = "JobId=42 JobName=x StdOut=/scratch/run.log StdErr=/scratch/run.err WorkDir=/home/me";
        let paths = parse_job_log_paths(out, "42").unwrap();
        assert_eq!(paths.stdout, Utf8PathBuf::from("/scratch/run.log"));
        assert_eq!(paths.stderr, Utf8PathBuf::from("/scratch/run.err"));
    }

    #[test]
    fn test_job_log_paths_fallback() {
        let out = "JobId=42 JobName=x StdOut=(null) WorkDir=/home/me";
        let paths = parse_job_log_paths(out, "42").unwrap();
        assert_eq!(paths.stdout, Utf8PathBuf::from("/home/me/slurm-42.out"));
        assert_eq!(paths.stderr, Utf8PathBuf::from("/home/me/slurm-42.err"));
    }

    #[test]
    fn test_job_log_paths_need_workdir() {
        assert!(parse_job_log_paths("JobId=42 JobName=x", "42").is_none());
    }
}
