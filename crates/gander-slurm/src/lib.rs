//! Typed queries over the SLURM command-line interface.
//!
//! One module per upstream command. Informational queries return explicit
//! `Result`s; the caller decides whether a failure degrades to a default
//! (catalog building, dashboards) or is surfaced (submission, cancel).

pub mod accounts;
pub mod sacct;
pub mod scancel;
pub mod scontrol;
pub mod sinfo;
pub mod squeue;
pub mod types;

pub use accounts::query_user_accounts;
pub use sacct::query_completed_jobs;
pub use scancel::cancel_job;
pub use scontrol::{query_job_log_paths, query_reservations, JobLogPaths};
pub use sinfo::{query_partition_limits, query_partitions, PartitionLimitsRaw};
pub use squeue::{query_active_partitions, query_queued_jobs};
pub use types::{CompletedJob, JobState, PartitionInfo, QueuedJob, Reservation};

use thiserror::Error;

#[derive(Error, Debug)]
#[error("could not determine current user (USER/USERNAME unset)")]
pub struct NoUserError;

/// The identity this tool runs as. No authentication happens anywhere;
/// the scheduler is trusted to enforce permissions.
pub fn current_user() -> Result<String, NoUserError> {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .map_err(|_| NoUserError)
}
