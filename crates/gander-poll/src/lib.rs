//! Background pollers.
//!
//! Each poller is an independent tokio task: ticks are strictly
//! sequential within a poller, results cross to the consumer only
//! through an mpsc channel, and cancellation is cooperative — the
//! liveness flag is checked at the top of every tick and nothing is
//! published after [`PollerHandle::stop`].

pub mod membership;
pub mod tail;

pub use membership::{MembershipConfig, MembershipPoller, MembershipUpdate};
pub use tail::{FileTailer, TailEvent, TailerState};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle to a running poller.
pub struct PollerHandle {
    alive: Arc<AtomicBool>,
    refresh: tokio::sync::mpsc::UnboundedSender<()>,
    join: JoinHandle<()>,
}

impl PollerHandle {
    pub(crate) fn new(
        alive: Arc<AtomicBool>,
        refresh: tokio::sync::mpsc::UnboundedSender<()>,
        join: JoinHandle<()>,
    ) -> Self {
        Self {
            alive,
            refresh,
            join,
        }
    }

    /// Request an immediate tick ahead of the interval.
    pub fn refresh_now(&self) {
        let _ = self.refresh.send(());
    }

    /// Clear the liveness flag. The task exits at its next tick without
    /// issuing further commands or publishes.
    pub fn stop(&self) {
        self.alive.store(false, Ordering::Relaxed);
        // Nudge so a poller mid-sleep notices promptly
        let _ = self.refresh.send(());
    }

    /// Stop and wait for the task to wind down.
    pub async fn shutdown(self) {
        self.stop();
        let _ = self.join.await;
    }
}
