//! Incremental file tailer.
//!
//! Tracks a byte offset into a growing log file and publishes only the
//! appended delta each tick — already-published text is never re-read or
//! re-sent. A file that does not exist yet produces one "waiting" notice
//! and keeps being polled.

use crate::PollerHandle;
use camino::{Utf8Path, Utf8PathBuf};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};
use tokio::sync::mpsc;

/// Output of the tailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailEvent {
    /// Emitted exactly once if the file did not exist on the first look.
    Waiting,
    /// Newly appended bytes, in order, no gaps, no duplicates.
    Data(String),
}

/// Offset bookkeeping for one tailed file.
#[derive(Debug, Default)]
pub struct TailerState {
    offset: u64,
    announced_waiting: bool,
}

/// One tick of the tailer: read whatever grew past the offset.
///
/// Separate from the task loop so the append-only contract is testable
/// without timers.
pub async fn poll_file(path: &Utf8Path, state: &mut TailerState) -> io::Result<Option<TailEvent>> {
    let size = match tokio::fs::metadata(path).await {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if state.announced_waiting {
                return Ok(None);
            }
            state.announced_waiting = true;
            return Ok(Some(TailEvent::Waiting));
        }
        Err(e) => return Err(e),
    };

    if size < state.offset {
        // Truncated underneath us; resynchronize without re-publishing
        state.offset = size;
        return Ok(None);
    }
    if size == state.offset {
        return Ok(None);
    }

    let mut file = tokio::fs::File::open(path).await?;
    file.seek(SeekFrom::Start(state.offset)).await?;
    let mut buf = Vec::with_capacity((size - state.offset) as usize);
    file.read_to_end(&mut buf).await?;
    if buf.is_empty() {
        return Ok(None);
    }

    state.offset += buf.len() as u64;
    Ok(Some(TailEvent::Data(
        String::from_utf8_lossy(&buf).into_owned(),
    )))
}

pub struct FileTailer {
    path: Utf8PathBuf,
    interval: Duration,
}

impl FileTailer {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            interval: Duration::from_secs(1),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Spawn the tailing task.
    pub fn start(self) -> (PollerHandle, mpsc::UnboundedReceiver<TailEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (refresh_tx, mut refresh_rx) = mpsc::unbounded_channel::<()>();
        let alive = Arc::new(AtomicBool::new(true));

        let task_alive = alive.clone();
        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            let mut state = TailerState::default();

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = refresh_rx.recv() => {}
                }
                if !task_alive.load(Ordering::Relaxed) {
                    break;
                }

                match poll_file(&self.path, &mut state).await {
                    Ok(Some(event)) => {
                        if !task_alive.load(Ordering::Relaxed) {
                            break;
                        }
                        if event_tx.send(event).is_err() {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::error!(path = %self.path, error = %e, "tail tick failed");
                    }
                }
            }
        });

        (PollerHandle::new(alive, refresh_tx, join), event_rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_path(dir: &tempfile::TempDir, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(dir.path().join(name).to_str().unwrap())
    }

    #[tokio::test]
    async fn test_publishes_deltas_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "job.out");
        let mut state = TailerState::default();

        std::fs::File::create(&path).unwrap();
        assert_eq!(poll_file(&path, &mut state).await.unwrap(), None);

        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        write!(f, "first chunk\n").unwrap();
        assert_eq!(
            poll_file(&path, &mut state).await.unwrap(),
            Some(TailEvent::Data("first chunk\n".to_string()))
        );

        // No growth, no event
        assert_eq!(poll_file(&path, &mut state).await.unwrap(), None);

        write!(f, "second chunk\n").unwrap();
        assert_eq!(
            poll_file(&path, &mut state).await.unwrap(),
            Some(TailEvent::Data("second chunk\n".to_string()))
        );
    }

    #[tokio::test]
    async fn test_waiting_notice_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "missing.out");
        let mut state = TailerState::default();

        assert_eq!(
            poll_file(&path, &mut state).await.unwrap(),
            Some(TailEvent::Waiting)
        );
        assert_eq!(poll_file(&path, &mut state).await.unwrap(), None);

        // Content written after the wait is picked up from byte zero
        std::fs::write(&path, "late\n").unwrap();
        assert_eq!(
            poll_file(&path, &mut state).await.unwrap(),
            Some(TailEvent::Data("late\n".to_string()))
        );
    }

    #[tokio::test]
    async fn test_truncation_resynchronizes_silently() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "job.out");
        let mut state = TailerState::default();

        std::fs::write(&path, "0123456789").unwrap();
        assert!(matches!(
            poll_file(&path, &mut state).await.unwrap(),
            Some(TailEvent::Data(_))
        ));

        std::fs::write(&path, "abc").unwrap();
        assert_eq!(poll_file(&path, &mut state).await.unwrap(), None);

        std::fs::write(&path, "abcdef").unwrap();
        assert_eq!(
            poll_file(&path, &mut state).await.unwrap(),
            Some(TailEvent::Data("def".to_string()))
        );
    }
}
