//! Usage aggregation: a pure fold over completed-job records.
//!
//! No I/O here. The caller fetches the records (restricted to its time
//! window via `sacct -S`) and the summary is recomputed from scratch on
//! every call, never incrementally patched.

use gander_parsers::parse_elapsed_hours;
use gander_slurm::{CompletedJob, JobState};
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregated consumption over one window of completed jobs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UsageSummary {
    pub total_jobs: usize,
    pub completed_jobs: usize,
    pub failed_jobs: usize,
    /// Jobs whose partition name contains `gpu`.
    pub gpu_jobs: usize,
    pub total_cpu_hours: f64,
    pub per_partition_counts: BTreeMap<String, usize>,
    pub per_account_cpu_hours: BTreeMap<String, f64>,
}

impl UsageSummary {
    /// Share of jobs run in `partition`, in percent. 0 when no jobs.
    pub fn partition_percent(&self, partition: &str) -> f64 {
        if self.total_jobs == 0 {
            return 0.0;
        }
        let count = self.per_partition_counts.get(partition).copied().unwrap_or(0);
        count as f64 * 100.0 / self.total_jobs as f64
    }

    /// Share of CPU-hours charged to `account`, in percent. 0 when no
    /// CPU-hours were recorded.
    pub fn account_percent(&self, account: &str) -> f64 {
        if self.total_cpu_hours == 0.0 {
            return 0.0;
        }
        let hours = self
            .per_account_cpu_hours
            .get(account)
            .copied()
            .unwrap_or(0.0);
        hours * 100.0 / self.total_cpu_hours
    }
}

/// Fold completed records into a summary.
///
/// CPU-hours = elapsed hours x allocated CPUs, counted only for
/// successfully completed jobs; fractional minutes are kept so sub-hour
/// jobs are not silently lost. Other terminal states land in the failure
/// bucket.
pub fn summarize(records: &[CompletedJob]) -> UsageSummary {
    let mut summary = UsageSummary::default();

    for record in records {
        summary.total_jobs += 1;
        *summary
            .per_partition_counts
            .entry(record.partition.clone())
            .or_insert(0) += 1;

        if record.partition.to_lowercase().contains("gpu") {
            summary.gpu_jobs += 1;
        }

        match record.state {
            JobState::Completed => {
                summary.completed_jobs += 1;
                match (parse_elapsed_hours(&record.elapsed), record.cpus) {
                    (Some(hours), Some(cpus)) => {
                        let cpu_hours = hours * cpus as f64;
                        summary.total_cpu_hours += cpu_hours;
                        let account = if record.account.is_empty() {
                            "unknown".to_string()
                        } else {
                            record.account.clone()
                        };
                        *summary.per_account_cpu_hours.entry(account).or_insert(0.0) +=
                            cpu_hours;
                    }
                    _ => {
                        tracing::debug!(
                            id = %record.id,
                            elapsed = %record.elapsed,
                            "completed job without usable elapsed/CPU data"
                        );
                    }
                }
            }
            _ => summary.failed_jobs += 1,
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        id: &str,
        partition: &str,
        state: JobState,
        elapsed: &str,
        cpus: u32,
        account: &str,
    ) -> CompletedJob {
        CompletedJob {
            id: id.to_string(),
            name: format!("job-{id}"),
            partition: partition.to_string(),
            state,
            start_time: None,
            end_time: None,
            cpus: Some(cpus),
            req_mem: "16G".to_string(),
            elapsed: elapsed.to_string(),
            account: account.to_string(),
        }
    }

    #[test]
    fn test_cpu_hours() {
        let records = vec![
            record("1", "compute", JobState::Completed, "01:30:00", 4, "a"),
            record("2", "compute", JobState::Completed, "00:45:00", 8, "b"),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.total_cpu_hours, 1.5 * 4.0 + 0.75 * 8.0);
        assert_eq!(summary.per_account_cpu_hours["a"], 6.0);
        assert_eq!(summary.per_account_cpu_hours["b"], 6.0);
    }

    #[test]
    fn test_failure_bucket() {
        let records = vec![
            record("1", "compute", JobState::Completed, "01:00:00", 1, "a"),
            record("2", "compute", JobState::Failed, "00:10:00", 1, "a"),
            record("3", "compute", JobState::Timeout, "04:00:00", 1, "a"),
            record("4", "compute", JobState::Cancelled, "00:00:10", 1, "a"),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.total_jobs, 4);
        assert_eq!(summary.completed_jobs, 1);
        assert_eq!(summary.failed_jobs, 3);
        // Only the completed job contributes CPU-hours
        assert_eq!(summary.total_cpu_hours, 1.0);
    }

    #[test]
    fn test_gpu_jobs_by_partition_name() {
        let records = vec![
            record("1", "gpu-a100", JobState::Completed, "01:00:00", 1, "a"),
            record("2", "compute", JobState::Completed, "01:00:00", 1, "a"),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.gpu_jobs, 1);
        assert_eq!(summary.per_partition_counts["gpu-a100"], 1);
        assert_eq!(summary.per_partition_counts["compute"], 1);
    }

    #[test]
    fn test_percentages() {
        let records = vec![
            record("1", "compute", JobState::Completed, "02:00:00", 2, "a"),
            record("2", "gpu", JobState::Failed, "01:00:00", 2, "a"),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.partition_percent("compute"), 50.0);
        assert_eq!(summary.partition_percent("absent"), 0.0);
        assert_eq!(summary.account_percent("a"), 100.0);
    }

    #[test]
    fn test_empty_window_has_zero_percentages() {
        let summary = summarize(&[]);
        assert_eq!(summary.partition_percent("compute"), 0.0);
        assert_eq!(summary.account_percent("a"), 0.0);
    }
}
