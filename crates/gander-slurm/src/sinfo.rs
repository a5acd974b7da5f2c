//! Partition discovery and per-partition limits via sinfo.

use crate::types::PartitionInfo;
use gander_parsers::{
    parse_gres, parse_node_range_count, run_command, split_padded, CommandError, GpuResource,
    COMMAND_TIMEOUT,
};
use tokio::process::Command;

/// List all partitions with node counts.
///
/// `sinfo` marks the default partition with a trailing `*`; the marker is
/// stripped from the name and kept as a flag.
pub async fn query_partitions() -> Result<Vec<PartitionInfo>, CommandError> {
    let mut cmd = Command::new("sinfo");
    cmd.args(["--noheader", "--format=%P,%D"]);

    let stdout = run_command(&mut cmd, "sinfo", COMMAND_TIMEOUT).await?;

    let mut partitions = Vec::new();
    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields = split_padded(line, ',', 2);
        let raw_name = fields[0].trim();
        let is_default = raw_name.ends_with('*');
        partitions.push(PartitionInfo {
            name: raw_name.trim_end_matches('*').to_string(),
            is_default,
            node_count: fields[1].trim().parse().unwrap_or(0),
        });
    }
    Ok(partitions)
}

/// Raw per-partition limit fields, one pipe-delimited sinfo line.
///
/// Fields stay textual here; each is parsed independently by the catalog
/// builder so one malformed field degrades alone instead of discarding
/// the whole line.
#[derive(Debug, Clone, Default)]
pub struct PartitionLimitsRaw {
    pub time_limit: String,
    pub cpus: String,
    pub memory: String,
    pub gres: String,
    pub node_count: String,
    pub node_list: String,
}

impl PartitionLimitsRaw {
    /// Split a `%l|%c|%m|%G|%D|%N` line, padding short rows.
    pub fn parse(line: &str) -> Self {
        let fields = split_padded(line.trim(), '|', 6);
        Self {
            time_limit: fields[0].trim().to_string(),
            cpus: fields[1].trim().to_string(),
            memory: fields[2].trim().to_string(),
            gres: fields[3].trim().to_string(),
            node_count: fields[4].trim().to_string(),
            node_list: fields[5].trim().to_string(),
        }
    }

    /// GPU inventory from the GRES field.
    pub fn gpus(&self) -> Vec<GpuResource> {
        parse_gres(&self.gres)
    }

    /// Node count, falling back from `%D` to counting the `%N` node list.
    pub fn nodes(&self) -> Option<u64> {
        if let Ok(count) = self.node_count.parse::<u64>() {
            return Some(count);
        }
        let counted = parse_node_range_count(&self.node_list);
        (counted > 0).then_some(counted)
    }
}

/// Query the limit line for one partition.
///
/// Returns the first non-empty output line; heterogeneous partitions can
/// emit several, in which case the first row's limits are taken.
pub async fn query_partition_limits(partition: &str) -> Result<PartitionLimitsRaw, CommandError> {
    let mut cmd = Command::new("sinfo");
    cmd.args([
        "-p",
        partition,
        "--noheader",
        "--format=%l|%c|%m|%G|%D|%N",
    ]);

    let stdout = run_command(&mut cmd, "sinfo", COMMAND_TIMEOUT).await?;
    let line = stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");
    Ok(PartitionLimitsRaw::parse(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit_line() {
        let raw = PartitionLimitsRaw::parse("1-00:00:00|64|257024|gpu:a100:8|12|gpu[01-12]");
        assert_eq!(raw.time_limit, "1-00:00:00");
        assert_eq!(raw.cpus, "64");
        assert_eq!(raw.memory, "257024");
        assert_eq!(raw.nodes(), Some(12));
        assert_eq!(raw.gpus().len(), 1);
        assert_eq!(raw.gpus()[0].count, 8);
    }

    #[test]
    fn test_parse_short_line_pads() {
        let raw = PartitionLimitsRaw::parse("4:00:00|16");
        assert_eq!(raw.time_limit, "4:00:00");
        assert_eq!(raw.memory, "");
        assert_eq!(raw.nodes(), None);
    }

    #[test]
    fn test_node_count_falls_back_to_list() {
        let raw = PartitionLimitsRaw::parse("infinite|128|512000|(null)||node[1-8],login1");
        assert_eq!(raw.nodes(), Some(9));
    }
}
