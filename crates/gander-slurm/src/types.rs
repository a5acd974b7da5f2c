//! Record types parsed from SLURM command output.
//!
//! Every record is an immutable snapshot taken at one poll instant; a
//! later poll replaces it wholesale, nothing is patched in place.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Job state as reported by `squeue`/`sacct`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
    Timeout,
    NodeFail,
    OutOfMemory,
    Unknown(String),
}

impl JobState {
    /// Parse a state token. `sacct` may append a suffix
    /// (`CANCELLED by 12345`); only the first word counts.
    pub fn parse(s: &str) -> Self {
        let base = s.split_whitespace().next().unwrap_or(s);
        match base.to_uppercase().as_str() {
            "PENDING" | "PD" => Self::Pending,
            "RUNNING" | "R" => Self::Running,
            "COMPLETED" | "CD" => Self::Completed,
            "FAILED" | "F" => Self::Failed,
            "CANCELLED" | "CA" => Self::Cancelled,
            "TIMEOUT" | "TO" => Self::Timeout,
            "NODE_FAIL" | "NF" => Self::NodeFail,
            "OUT_OF_MEMORY" | "OOM" => Self::OutOfMemory,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// True for states in which the job will not run again. Anything else
    /// is assumed still in flight.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed
                | Self::Failed
                | Self::Cancelled
                | Self::Timeout
                | Self::NodeFail
                | Self::OutOfMemory
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Timeout => "TIMEOUT",
            Self::NodeFail => "NODE_FAIL",
            Self::OutOfMemory => "OUT_OF_MEMORY",
            Self::Unknown(s) => s,
        }
    }
}

/// A queued or running job from `squeue`.
#[derive(Debug, Clone, Serialize)]
pub struct QueuedJob {
    pub id: String,
    pub name: String,
    pub state: JobState,
    pub start_time: Option<DateTime<Utc>>,
    pub cpus: Option<u32>,
    /// Memory exactly as reported (`4G`, `16000M`); kept textual for display.
    pub memory: String,
    /// Time limit exactly as reported (`1-00:00:00`, `infinite`).
    pub time_limit: String,
}

/// A finished job from `sacct`.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedJob {
    pub id: String,
    pub name: String,
    pub partition: String,
    pub state: JobState,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub cpus: Option<u32>,
    pub req_mem: String,
    /// Elapsed wall time as reported (`[D-]HH:MM:SS`).
    pub elapsed: String,
    pub account: String,
}

/// A reservation from `scontrol show reservation`.
#[derive(Debug, Clone, Serialize)]
pub struct Reservation {
    pub name: String,
    /// `Unknown` start/end times map to `None`, distinct from a parse error.
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Present only when both endpoints are known.
    pub duration: Option<Duration>,
    /// Node-list expression as reported.
    pub nodes: String,
    pub node_count: u64,
    pub partitions: Vec<String>,
    pub users: Option<Vec<String>>,
    pub accounts: Option<Vec<String>>,
}

impl Reservation {
    /// Partition filter used by the reservation view.
    pub fn covers_partition(&self, partition: &str) -> bool {
        self.partitions.iter().any(|p| p == partition)
    }

    /// True once the reservation's end time has passed.
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.end_time.is_some_and(|end| end < now)
    }
}

/// One partition from the cluster-wide `sinfo` listing.
#[derive(Debug, Clone, Serialize)]
pub struct PartitionInfo {
    /// Name with the default-partition marker stripped.
    pub name: String,
    /// Whether the name carried the trailing `*` marker.
    pub is_default: bool,
    pub node_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_state() {
        assert_eq!(JobState::parse("RUNNING"), JobState::Running);
        assert_eq!(JobState::parse("PD"), JobState::Pending);
        assert_eq!(JobState::parse("CANCELLED by 12345"), JobState::Cancelled);
        assert_eq!(
            JobState::parse("REQUEUED"),
            JobState::Unknown("REQUEUED".to_string())
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Timeout.is_terminal());
        assert!(JobState::NodeFail.is_terminal());
        assert!(JobState::OutOfMemory.is_terminal());
        assert!(!JobState::Running.is_terminal());
        assert!(!JobState::Pending.is_terminal());
        assert!(!JobState::Unknown("REQUEUED".into()).is_terminal());
    }
}
