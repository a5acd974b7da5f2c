//! Per-partition resource catalogs.
//!
//! A catalog is built fresh immediately before a submission dialog and
//! discarded afterwards; limits can change between sessions, so nothing
//! is cached. Every sub-query is independently fallible and degrades to
//! its documented default rather than aborting construction.

use gander_parsers::{
    parse_memory_gb, parse_walltime_minutes, total_gpus, GpuResource,
};
use gander_slurm::{query_partition_limits, query_user_accounts, PartitionLimitsRaw};
use serde::Serialize;

/// Fallback limits, applied per field when the scheduler's answer is
/// missing or unparseable. One consistent policy for the whole crate.
pub mod defaults {
    /// 4 hours.
    pub const MAX_WALLTIME_MINUTES: u64 = 240;
    pub const MAX_CPUS_PER_NODE: u32 = 16;
    pub const MAX_MEMORY_GB: u64 = 32;
    pub const MAX_NODES: u64 = 10;
    /// Used when the caller has no associations or the lookup fails.
    pub const ACCOUNT: &str = "staff";
}

/// Scheduling limits for one partition plus the accounts the caller may
/// charge. Lives only as long as the dialog that requested it.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceCatalog {
    pub partition: String,
    pub max_walltime_minutes: u64,
    pub max_cpus_per_node: u32,
    pub max_memory_gb: u64,
    pub gpu_inventory: Vec<GpuResource>,
    pub max_nodes: u64,
    pub accounts: Vec<String>,
}

impl ResourceCatalog {
    /// Assemble a catalog from a raw sinfo limit line, field by field.
    /// A malformed field defaults alone; the others still take effect.
    pub fn from_limits(partition: &str, raw: &PartitionLimitsRaw, accounts: Vec<String>) -> Self {
        let max_walltime_minutes = match parse_walltime_minutes(&raw.time_limit) {
            Some(minutes) => minutes,
            None => {
                tracing::warn!(
                    partition,
                    value = %raw.time_limit,
                    "unparseable partition time limit, using default"
                );
                defaults::MAX_WALLTIME_MINUTES
            }
        };

        let max_cpus_per_node = raw.cpus.parse().unwrap_or_else(|_| {
            tracing::warn!(partition, value = %raw.cpus, "unparseable CPU count, using default");
            defaults::MAX_CPUS_PER_NODE
        });

        let max_memory_gb = parse_memory_gb(&raw.memory).unwrap_or_else(|| {
            tracing::warn!(partition, value = %raw.memory, "unparseable memory, using default");
            defaults::MAX_MEMORY_GB
        });

        let max_nodes = raw.nodes().unwrap_or_else(|| {
            tracing::warn!(partition, "unparseable node count, using default");
            defaults::MAX_NODES
        });

        let accounts = if accounts.is_empty() {
            vec![defaults::ACCOUNT.to_string()]
        } else {
            accounts
        };

        Self {
            partition: partition.to_string(),
            max_walltime_minutes,
            max_cpus_per_node,
            max_memory_gb,
            gpu_inventory: raw.gpus(),
            max_nodes,
            accounts,
        }
    }

    /// Entirely defaulted catalog, for when the scheduler is unreachable.
    pub fn defaulted(partition: &str) -> Self {
        Self::from_limits(partition, &PartitionLimitsRaw::default(), Vec::new())
    }

    /// Total GPUs across device classes. The selection bound uses the
    /// partition total, not per-node capacity.
    pub fn total_gpus(&self) -> u32 {
        total_gpus(&self.gpu_inventory)
    }

    pub fn has_gpus(&self) -> bool {
        self.total_gpus() > 0
    }

    /// First authorized account, the dialog's preselected choice.
    pub fn default_account(&self) -> &str {
        self.accounts
            .first()
            .map(String::as_str)
            .unwrap_or(defaults::ACCOUNT)
    }
}

/// Strip the default-partition marker; the trailing `*` from sinfo
/// listings must not reach the scheduler as part of the name.
pub fn clean_partition_name(partition: &str) -> &str {
    partition.trim_end_matches('*')
}

/// Build the catalog for one partition, best effort.
///
/// Always produces a catalog: a failed limit query degrades every limit
/// to its default, a failed account lookup degrades to the fallback
/// account, and both failures are logged rather than propagated.
pub async fn build_catalog(partition: &str, user: &str) -> ResourceCatalog {
    let partition = clean_partition_name(partition);

    let limits = match query_partition_limits(partition).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!(partition, error = %e, "partition limit query failed");
            PartitionLimitsRaw::default()
        }
    };

    let accounts = match query_user_accounts(user).await {
        Ok(accounts) => accounts,
        Err(e) => {
            tracing::error!(user, error = %e, "account lookup failed");
            Vec::new()
        }
    };

    ResourceCatalog::from_limits(partition, &limits, accounts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gander_parsers::INFINITE_WALLTIME_MINUTES;

    #[test]
    fn test_catalog_from_gpu_partition() {
        let raw = PartitionLimitsRaw::parse("1-00:00:00|64|257024|gpu:a100:8|12|gpu[01-12]");
        let catalog = ResourceCatalog::from_limits("gpu", &raw, vec!["staff".to_string()]);
        assert_eq!(catalog.max_walltime_minutes, 1440);
        assert_eq!(catalog.max_cpus_per_node, 64);
        assert_eq!(catalog.max_memory_gb, 251);
        assert_eq!(catalog.gpu_inventory.len(), 1);
        assert_eq!(catalog.gpu_inventory[0].device, "A100");
        assert_eq!(catalog.total_gpus(), 8);
        assert_eq!(catalog.max_nodes, 12);
    }

    #[test]
    fn test_infinite_walltime_stays_finite() {
        let raw = PartitionLimitsRaw::parse("infinite|128|512000|(null)|4|n[1-4]");
        let catalog = ResourceCatalog::from_limits("long", &raw, Vec::new());
        assert_eq!(catalog.max_walltime_minutes, INFINITE_WALLTIME_MINUTES);
        assert!(!catalog.has_gpus());
    }

    #[test]
    fn test_broken_field_defaults_alone() {
        let raw = PartitionLimitsRaw::parse("4:00:00|sixty-four|64000|(null)|2|n[1-2]");
        let catalog = ResourceCatalog::from_limits("debug", &raw, Vec::new());
        assert_eq!(catalog.max_walltime_minutes, 240);
        assert_eq!(catalog.max_cpus_per_node, defaults::MAX_CPUS_PER_NODE);
        assert_eq!(catalog.max_memory_gb, 63);
        assert_eq!(catalog.max_nodes, 2);
    }

    #[test]
    fn test_empty_accounts_fall_back() {
        let catalog = ResourceCatalog::defaulted("debug");
        assert_eq!(catalog.accounts, vec![defaults::ACCOUNT.to_string()]);
        assert_eq!(catalog.default_account(), defaults::ACCOUNT);
        assert_eq!(catalog.max_walltime_minutes, INFINITE_WALLTIME_MINUTES);
    }

    #[test]
    fn test_default_marker_stripped() {
        assert_eq!(clean_partition_name("gpu*"), "gpu");
        assert_eq!(clean_partition_name("compute"), "compute");

        let raw = PartitionLimitsRaw::parse("1-00:00:00|64|257024|gpu:a100:8|12|gpu[01-12]");
        let catalog =
            ResourceCatalog::from_limits(clean_partition_name("gpu*"), &raw, Vec::new());
        assert_eq!(catalog.partition, "gpu");
        assert_eq!(catalog.max_walltime_minutes, 1440);
    }
}
