//! CLI argument parsing for gander.

use camino::Utf8PathBuf;
use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gander")]
#[command(about = "Inspect SLURM partitions and launch interactive or batch work")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Emit records as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,
}

/// Resource flags shared by the submission subcommands. Omitted values
/// fall back to defaults clamped into the partition's limits.
#[derive(ClapArgs, Debug, Clone)]
pub struct ResourceFlags {
    /// Wall time as H:MM or H:MM:SS
    #[arg(long)]
    pub time: Option<String>,

    /// CPUs per task
    #[arg(long)]
    pub cpus: Option<u32>,

    /// Memory in GB
    #[arg(long)]
    pub mem: Option<u64>,

    /// GPU count
    #[arg(long)]
    pub gpus: Option<u32>,

    /// Node count
    #[arg(long)]
    pub nodes: Option<u64>,

    /// Account to charge
    #[arg(long)]
    pub account: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List partitions with node counts
    Partitions,

    /// Show live resource limits and your accounts for a partition
    Catalog { partition: String },

    /// List your queued and running jobs in a partition
    Jobs { partition: String },

    /// List your completed jobs in a partition
    History {
        partition: String,

        /// Trailing window in days
        #[arg(long, default_value_t = 30)]
        days: i64,
    },

    /// Summarize your CPU-hour usage over a trailing window
    Usage {
        /// Trailing window in days
        #[arg(long, default_value_t = 30)]
        days: i64,
    },

    /// List reservations
    Reservations {
        /// Only reservations covering this partition
        #[arg(long)]
        partition: Option<String>,

        /// Include reservations that already ended
        #[arg(long)]
        include_past: bool,

        /// Re-query and reprint every N seconds
        #[arg(long)]
        watch: Option<u64>,
    },

    /// Start an interactive job in a terminal window
    Interactive {
        partition: String,

        #[command(flatten)]
        resources: ResourceFlags,
    },

    /// Submit a batch script
    Batch {
        script: Utf8PathBuf,

        #[arg(short, long)]
        partition: String,

        #[command(flatten)]
        resources: ResourceFlags,
    },

    /// Cancel a job
    Cancel { job_id: String },

    /// Follow a job's stdout (or stderr) log file
    Logs {
        job_id: String,

        /// Follow stderr instead of stdout
        #[arg(long)]
        stderr: bool,
    },

    /// Follow a growing file, like tail -f
    Tail { path: Utf8PathBuf },

    /// Watch which partitions hold your jobs, printing flag changes
    Watch {
        /// Poll interval in seconds
        #[arg(long, default_value_t = 10)]
        interval: u64,
    },
}
