//! Job requests: validated resource tuples rendered to argument vectors.

use crate::catalog::ResourceCatalog;
use gander_parsers::format_walltime;
use serde::Serialize;
use thiserror::Error;

/// A resource tuple as chosen by the operator.
///
/// Selection controls are expected to be pre-bounded by the catalog, so
/// these values normally arrive in range; [`JobRequest::build`] still
/// checks every bound defensively before anything reaches the scheduler.
#[derive(Debug, Clone)]
pub struct JobSelections {
    pub walltime_minutes: u64,
    pub cpus_per_task: u32,
    pub memory_gb: u64,
    pub gpus: Option<u32>,
    pub nodes: u64,
    pub account: Option<String>,
}

impl JobSelections {
    /// Stock defaults (1 hour, 8 CPUs, 32 GB, 1 node) clamped into the
    /// catalog's bounds, with the catalog's first account preselected.
    pub fn defaults_for(catalog: &ResourceCatalog) -> Self {
        Self {
            walltime_minutes: 60.min(catalog.max_walltime_minutes),
            cpus_per_task: 8.min(catalog.max_cpus_per_node),
            memory_gb: 32.min(catalog.max_memory_gb),
            gpus: None,
            nodes: 1,
            account: None,
        }
    }
}

/// A selection that would exceed the catalog is rejected here, never
/// forwarded to the scheduler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("walltime {requested} min out of range 1..={max} for partition {partition}")]
    Walltime {
        partition: String,
        requested: u64,
        max: u64,
    },
    #[error("{requested} CPUs per task out of range 1..={max} for partition {partition}")]
    Cpus {
        partition: String,
        requested: u32,
        max: u32,
    },
    #[error("{requested} GB memory out of range 1..={max} for partition {partition}")]
    Memory {
        partition: String,
        requested: u64,
        max: u64,
    },
    #[error("{requested} GPUs exceed the {available} available in partition {partition}")]
    Gpus {
        partition: String,
        requested: u32,
        available: u32,
    },
    #[error("{requested} nodes out of range 1..={max} for partition {partition}")]
    Nodes {
        partition: String,
        requested: u64,
        max: u64,
    },
    #[error("account {account} is not authorized (choose one of: {available})")]
    Account { account: String, available: String },
}

/// A validated submission request. Constructed immediately before
/// submission and not persisted.
#[derive(Debug, Clone, Serialize)]
pub struct JobRequest {
    pub partition: String,
    pub walltime_minutes: u64,
    pub cpus_per_task: u32,
    pub memory_gb: u64,
    pub gpus: Option<u32>,
    pub nodes: u64,
    pub account: String,
}

impl JobRequest {
    /// Validate selections against the catalog the controls were bounded
    /// by. Bounds come from the same catalog, so failures indicate a bug
    /// upstream; they are still rejected rather than trusted.
    pub fn build(
        catalog: &ResourceCatalog,
        selections: &JobSelections,
    ) -> Result<Self, ValidationError> {
        let partition = catalog.partition.clone();

        if selections.walltime_minutes < 1
            || selections.walltime_minutes > catalog.max_walltime_minutes
        {
            return Err(ValidationError::Walltime {
                partition,
                requested: selections.walltime_minutes,
                max: catalog.max_walltime_minutes,
            });
        }
        if selections.cpus_per_task < 1 || selections.cpus_per_task > catalog.max_cpus_per_node {
            return Err(ValidationError::Cpus {
                partition,
                requested: selections.cpus_per_task,
                max: catalog.max_cpus_per_node,
            });
        }
        if selections.memory_gb < 1 || selections.memory_gb > catalog.max_memory_gb {
            return Err(ValidationError::Memory {
                partition,
                requested: selections.memory_gb,
                max: catalog.max_memory_gb,
            });
        }
        if let Some(gpus) = selections.gpus {
            if gpus > catalog.total_gpus() {
                return Err(ValidationError::Gpus {
                    partition,
                    requested: gpus,
                    available: catalog.total_gpus(),
                });
            }
        }
        if selections.nodes < 1 || selections.nodes > catalog.max_nodes {
            return Err(ValidationError::Nodes {
                partition,
                requested: selections.nodes,
                max: catalog.max_nodes,
            });
        }

        let account = match &selections.account {
            Some(account) => {
                if !catalog.accounts.iter().any(|a| a == account) {
                    return Err(ValidationError::Account {
                        account: account.clone(),
                        available: catalog.accounts.join(", "),
                    });
                }
                account.clone()
            }
            None => catalog.default_account().to_string(),
        };

        Ok(Self {
            partition: catalog.partition.clone(),
            walltime_minutes: selections.walltime_minutes,
            cpus_per_task: selections.cpus_per_task,
            memory_gb: selections.memory_gb,
            gpus: selections.gpus.filter(|&g| g > 0),
            nodes: selections.nodes,
            account,
        })
    }

    /// Canonical `H:MM:00` time string for submission flags.
    pub fn time_string(&self) -> String {
        format_walltime(self.walltime_minutes)
    }

    /// Resource flags shared by srun and sbatch invocations.
    fn resource_args(&self) -> Vec<String> {
        let mut args = vec![
            "-p".to_string(),
            self.partition.clone(),
            "-N".to_string(),
            self.nodes.to_string(),
            "-A".to_string(),
            self.account.clone(),
            format!("--cpus-per-task={}", self.cpus_per_task),
            format!("--mem={}G", self.memory_gb),
            format!("--time={}", self.time_string()),
        ];
        if let Some(gpus) = self.gpus {
            args.push(format!("--gres=gpu:{gpus}"));
        }
        args
    }

    /// Full sbatch argument vector; the script path is always the final
    /// positional argument.
    pub fn sbatch_args(&self, script: &str) -> Vec<String> {
        let mut args = self.resource_args();
        args.push(script.to_string());
        args
    }

    /// The srun command line for an interactive shell, as one string
    /// ready to hand to a terminal emulator's exec flag.
    pub fn srun_shell_command(&self) -> String {
        let mut parts = vec!["srun".to_string()];
        parts.extend(self.resource_args());
        parts.push(format!("--job-name=interactive-{}", self.partition));
        parts.push("--x11".to_string());
        parts.push("--pty".to_string());
        parts.push("bash".to_string());
        parts.join(" ")
    }
}
