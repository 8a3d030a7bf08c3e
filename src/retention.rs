//! Time-limited retention of materialized files
//!
//! Every materialized file gets a deletion timer keyed by its path. A
//! rematerialization of the same path claims the path before the overwrite
//! and re-arms the timer after it, so an overwrite can never be deleted
//! early by a stale timer from an earlier request.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio::time::{Duration, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

struct TimerEntry {
    generation: u64,
    token: CancellationToken,
}

/// Schedules per-path deletion timers for materialized files.
///
/// At most one live timer exists per path; scheduling an already-tracked
/// path supersedes its timer. The generation counter guards the window
/// between a timer firing and a reschedule taking the map lock.
pub struct RetentionScheduler {
    ttl: Duration,
    timers: Mutex<HashMap<PathBuf, TimerEntry>>,
    next_generation: AtomicU64,
}

impl RetentionScheduler {
    /// Create a scheduler deleting files `ttl` after their (re)scheduling
    pub fn new(ttl: Duration) -> Arc<Self> {
        Arc::new(Self {
            ttl,
            timers: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
        })
    }

    /// The configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Schedule (or reschedule) deletion of `path` after the TTL.
    ///
    /// Any previous timer for the same path is cancelled before the new one
    /// is armed.
    pub async fn schedule(self: &Arc<Self>, path: PathBuf) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        let previous = {
            let mut timers = self.timers.lock().await;
            timers.insert(
                path.clone(),
                TimerEntry {
                    generation,
                    token: token.clone(),
                },
            )
        };
        if let Some(previous) = previous {
            previous.token.cancel();
            debug!(file = %path.display(), "Superseded previous deletion timer");
        }

        info!(
            file = %path.display(),
            ttl_secs = self.ttl.as_secs(),
            "Scheduled file deletion"
        );

        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = sleep(scheduler.ttl) => {
                    scheduler.expire(&path, generation).await;
                }
            }
        });
    }

    /// Claim `path` ahead of an overwrite, without arming a timer.
    ///
    /// Bumps the path's generation so that an already-armed timer expiring
    /// between the claim and the overwrite fails the generation check and
    /// leaves the new file alone. The caller re-arms with [`schedule`] once
    /// the overwrite is done, or releases with [`cancel`] if it fails.
    ///
    /// [`schedule`]: RetentionScheduler::schedule
    /// [`cancel`]: RetentionScheduler::cancel
    pub async fn claim(&self, path: PathBuf) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        let previous = self
            .timers
            .lock()
            .await
            .insert(path.clone(), TimerEntry { generation, token });
        if let Some(previous) = previous {
            previous.token.cancel();
            debug!(file = %path.display(), "Claimed path from previous deletion timer");
        }
    }

    /// Cancel the timer for `path`, if one is armed
    pub async fn cancel(&self, path: &Path) {
        if let Some(entry) = self.timers.lock().await.remove(path) {
            entry.token.cancel();
            debug!(file = %path.display(), "Cancelled deletion timer");
        }
    }

    /// Number of currently tracked paths (armed timers plus open claims)
    pub(crate) async fn active_timers(&self) -> usize {
        self.timers.lock().await.len()
    }

    /// Delete the file for an expired timer, unless it was superseded
    async fn expire(&self, path: &Path, generation: u64) {
        {
            let mut timers = self.timers.lock().await;
            match timers.get(path) {
                Some(entry) if entry.generation == generation => {
                    timers.remove(path);
                }
                // A newer timer owns the path now; this expiry is stale.
                _ => return,
            }
        }

        match tokio::fs::remove_file(path).await {
            Ok(()) => info!(file = %path.display(), "Deleted expired file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(file = %path.display(), "Expired file was already gone");
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Failed to delete expired file");
            }
        }
    }
}
