//! Wall-time and timestamp parsing for scheduler output.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Sentinel for partitions reporting an `infinite` time limit.
///
/// Resource selection needs a finite maximum, so unbounded partitions are
/// capped at one week (in minutes).
pub const INFINITE_WALLTIME_MINUTES: u64 = 7 * 24 * 60;

/// Parse a SLURM time limit into total minutes.
///
/// Accepts `D-HH:MM:SS`, `HH:MM:SS`, `MM:SS`, or the literal `infinite`.
/// Seconds are always discarded. `infinite` and the empty string map to
/// [`INFINITE_WALLTIME_MINUTES`]. Returns `None` for anything else; the
/// caller applies its own documented default.
pub fn parse_walltime_minutes(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("infinite") || s == "UNLIMITED" {
        return Some(INFINITE_WALLTIME_MINUTES);
    }

    let (days, time_part) = match s.split_once('-') {
        Some((d, rest)) => (d.parse::<u64>().ok()?, rest),
        None => (0, s),
    };

    let parts: Vec<&str> = time_part.split(':').collect();
    let minutes = match parts.len() {
        3 => {
            let hours = parts[0].parse::<u64>().ok()?;
            let mins = parts[1].parse::<u64>().ok()?;
            hours * 60 + mins
        }
        2 => parts[0].parse::<u64>().ok()?,
        _ => return None,
    };

    Some(days * 24 * 60 + minutes)
}

/// Render total minutes in the canonical submission form `H:MM:00`.
///
/// Round-trips through [`parse_walltime_minutes`] at minute granularity.
pub fn format_walltime(minutes: u64) -> String {
    format!("{}:{:02}:00", minutes / 60, minutes % 60)
}

/// Parse an elapsed duration (`[D-]HH:MM:SS`) into fractional hours.
///
/// Unlike [`parse_walltime_minutes`] this keeps sub-hour time (`MM/60`)
/// so aggregate CPU-hour totals do not silently truncate.
pub fn parse_elapsed_hours(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || s == "Unknown" {
        return None;
    }
    // sacct may append fractional seconds (e.g. "01:30:00.123")
    let s = s.split('.').next().unwrap_or(s);

    let (days, time_part) = match s.split_once('-') {
        Some((d, rest)) => (d.parse::<u64>().ok()?, rest),
        None => (0, s),
    };

    let parts: Vec<&str> = time_part.split(':').collect();
    let (hours, mins) = match parts.len() {
        3 => (parts[0].parse::<u64>().ok()?, parts[1].parse::<u64>().ok()?),
        2 => (0, parts[0].parse::<u64>().ok()?),
        _ => return None,
    };

    Some(days as f64 * 24.0 + hours as f64 + mins as f64 / 60.0)
}

/// Parse a SLURM timestamp (`YYYY-MM-DDTHH:MM:SS`).
///
/// `Unknown`, `N/A`, `None`, and the empty string are first-class
/// "not yet determined" values and map to `None`.
pub fn parse_slurm_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() || s == "N/A" || s == "Unknown" || s == "None" {
        return None;
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .and_then(|dt| Utc.from_local_datetime(&dt).single())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_walltime() {
        assert_eq!(parse_walltime_minutes("1-00:00:00"), Some(1440));
        assert_eq!(parse_walltime_minutes("2:30:00"), Some(150));
        assert_eq!(parse_walltime_minutes("45:00"), Some(45));
        assert_eq!(parse_walltime_minutes("3-12:15:59"), Some(3 * 1440 + 735));
    }

    #[test]
    fn test_parse_walltime_infinite() {
        assert_eq!(
            parse_walltime_minutes("infinite"),
            Some(INFINITE_WALLTIME_MINUTES)
        );
        assert_eq!(parse_walltime_minutes(""), Some(INFINITE_WALLTIME_MINUTES));
    }

    #[test]
    fn test_parse_walltime_garbage() {
        assert_eq!(parse_walltime_minutes("soon"), None);
        assert_eq!(parse_walltime_minutes("1:2:3:4"), None);
    }

    #[test]
    fn test_walltime_round_trip() {
        for hours in [0u64, 1, 4, 23, 48, 999] {
            for mins in [0u64, 1, 15, 30, 59] {
                let total = hours * 60 + mins;
                let rendered = format!("{}:{:02}:00", hours, mins);
                assert_eq!(parse_walltime_minutes(&rendered), Some(total));
                assert_eq!(format_walltime(total), rendered);
            }
        }
    }

    #[test]
    fn test_parse_elapsed_hours() {
        assert_eq!(parse_elapsed_hours("01:30:00"), Some(1.5));
        assert_eq!(parse_elapsed_hours("00:45:00"), Some(0.75));
        assert_eq!(parse_elapsed_hours("1-02:00:00"), Some(26.0));
        assert_eq!(parse_elapsed_hours("00:30:00.500"), Some(0.5));
        assert_eq!(parse_elapsed_hours("Unknown"), None);
    }

    #[test]
    fn test_parse_slurm_timestamp() {
        let dt = parse_slurm_timestamp("2025-01-15T10:30:00").unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2025-01-15");

        assert!(parse_slurm_timestamp("Unknown").is_none());
        assert!(parse_slurm_timestamp("N/A").is_none());
        assert!(parse_slurm_timestamp("").is_none());
    }
}
