//! GRES (generic resource) parsing, reduced to GPU inventory.

use serde::Serialize;

/// One GPU device class on a partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GpuResource {
    /// Device type, uppercased (`V100`, `A100`); `GPU` when unspecified.
    pub device: String,
    pub count: u32,
}

/// Label used when a GRES entry carries no device type (`gpu:4`).
pub const GENERIC_GPU_LABEL: &str = "GPU";

/// Parse a `sinfo %G` GRES string into its GPU entries.
///
/// Entries are comma-separated; only tokens containing the `gpu` marker
/// (case-insensitive) are retained, other resource kinds are ignored.
/// `(null)` and the empty string mean no GPUs. A parenthesised socket
/// suffix on the count (`gpu:a100:8(S:0-1)`) is stripped. Malformed
/// counts drop the token rather than failing the caller.
pub fn parse_gres(s: &str) -> Vec<GpuResource> {
    let s = s.trim();
    if s.is_empty() || s == "(null)" {
        return Vec::new();
    }

    let mut gpus = Vec::new();
    for token in s.split(',') {
        let token = token.trim();
        if !token.to_ascii_lowercase().contains("gpu") {
            continue;
        }

        let parts: Vec<&str> = token.split(':').collect();
        let entry = match parts.len() {
            3 => parse_count(parts[2]).map(|count| GpuResource {
                device: parts[1].to_ascii_uppercase(),
                count,
            }),
            2 => parse_count(parts[1]).map(|count| GpuResource {
                device: GENERIC_GPU_LABEL.to_string(),
                count,
            }),
            _ => None,
        };

        match entry {
            Some(gpu) => gpus.push(gpu),
            None => tracing::debug!("ignoring malformed GRES token: {token}"),
        }
    }
    gpus
}

fn parse_count(s: &str) -> Option<u32> {
    s.split('(').next().unwrap_or(s).trim().parse().ok()
}

/// Total GPU count across all device classes.
pub fn total_gpus(gpus: &[GpuResource]) -> u32 {
    gpus.iter().map(|g| g.count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gpu(device: &str, count: u32) -> GpuResource {
        GpuResource {
            device: device.to_string(),
            count,
        }
    }

    #[test]
    fn test_typed_entry() {
        assert_eq!(parse_gres("gpu:v100:4"), vec![gpu("V100", 4)]);
    }

    #[test]
    fn test_untyped_entry() {
        assert_eq!(parse_gres("gpu:2"), vec![gpu("GPU", 2)]);
    }

    #[test]
    fn test_empty_and_null() {
        assert_eq!(parse_gres(""), Vec::new());
        assert_eq!(parse_gres("(null)"), Vec::new());
    }

    #[test]
    fn test_non_gpu_entries_ignored() {
        assert_eq!(parse_gres("craynetwork:4"), Vec::new());
        assert_eq!(
            parse_gres("craynetwork:4,gpu:a100:8"),
            vec![gpu("A100", 8)]
        );
    }

    #[test]
    fn test_socket_suffix_stripped() {
        assert_eq!(parse_gres("gpu:a100:8(S:0-1)"), vec![gpu("A100", 8)]);
    }

    #[test]
    fn test_total() {
        let gpus = parse_gres("gpu:v100:4,gpu:a100:8");
        assert_eq!(total_gpus(&gpus), 12);
    }
}
