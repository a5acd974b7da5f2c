//! Active-partition membership poller.
//!
//! Repeatedly asks squeue which partitions hold any of the user's jobs
//! and publishes one flag change per partition that entered or left the
//! set. An unchanged result publishes nothing, so the consumer sees no
//! churn between real transitions.

use crate::PollerHandle;
use gander_slurm::query_active_partitions;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// One partition's membership flag flipping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipUpdate {
    pub partition: String,
    pub has_jobs: bool,
}

#[derive(Debug, Clone)]
pub struct MembershipConfig {
    pub user: String,
    pub interval: Duration,
}

impl MembershipConfig {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            interval: Duration::from_secs(10),
        }
    }
}

/// Diff two membership sets into flag changes. Pure; the poller's only
/// publishing decision lives here.
pub fn diff_membership(
    previous: &BTreeSet<String>,
    current: &BTreeSet<String>,
) -> Vec<MembershipUpdate> {
    let mut updates = Vec::new();
    for partition in current.difference(previous) {
        updates.push(MembershipUpdate {
            partition: partition.clone(),
            has_jobs: true,
        });
    }
    for partition in previous.difference(current) {
        updates.push(MembershipUpdate {
            partition: partition.clone(),
            has_jobs: false,
        });
    }
    updates
}

pub struct MembershipPoller {
    config: MembershipConfig,
}

impl MembershipPoller {
    pub fn new(config: MembershipConfig) -> Self {
        Self { config }
    }

    /// Spawn the polling task. The first tick fires immediately so the
    /// consumer gets initial flags without waiting a full interval.
    pub fn start(self) -> (PollerHandle, mpsc::UnboundedReceiver<MembershipUpdate>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (refresh_tx, mut refresh_rx) = mpsc::unbounded_channel::<()>();
        let alive = Arc::new(AtomicBool::new(true));

        let task_alive = alive.clone();
        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.interval);
            let mut previous = BTreeSet::new();

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = refresh_rx.recv() => {}
                }
                if !task_alive.load(Ordering::Relaxed) {
                    break;
                }

                let current = match query_active_partitions(&self.config.user).await {
                    Ok(set) => set,
                    Err(e) => {
                        // Leave published state untouched; next tick retries
                        tracing::error!(error = %e, "membership query failed");
                        continue;
                    }
                };

                if !task_alive.load(Ordering::Relaxed) {
                    break;
                }
                for update in diff_membership(&previous, &current) {
                    if event_tx.send(update).is_err() {
                        return;
                    }
                }
                previous = current;
            }
        });

        (PollerHandle::new(alive, refresh_tx, join), event_rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_diff_unchanged_publishes_nothing() {
        let a = set(&["compute", "gpu"]);
        assert!(diff_membership(&a, &a.clone()).is_empty());
    }

    #[test]
    fn test_diff_entry_and_exit() {
        let previous = set(&["compute"]);
        let current = set(&["gpu"]);
        let updates = diff_membership(&previous, &current);
        assert_eq!(updates.len(), 2);
        assert!(updates.contains(&MembershipUpdate {
            partition: "gpu".to_string(),
            has_jobs: true,
        }));
        assert!(updates.contains(&MembershipUpdate {
            partition: "compute".to_string(),
            has_jobs: false,
        }));
    }

    #[test]
    fn test_diff_initial_tick_flags_active_only() {
        let updates = diff_membership(&BTreeSet::new(), &set(&["gpu"]));
        assert_eq!(
            updates,
            vec![MembershipUpdate {
                partition: "gpu".to_string(),
                has_jobs: true,
            }]
        );
    }
}
