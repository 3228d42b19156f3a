//! Background pruning task
//!
//! Runs [`ActivityLog::prune_expired`] on a fixed interval until its
//! [`PrunerHandle`] is shut down or dropped. The first tick fires one full
//! interval after spawning; the pass at open time is done by the log itself.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::log::ActivityLog;

/// Periodic expiry pass over one log
pub struct PruneTask {
    log: Arc<ActivityLog>,
    interval: Duration,
    shutdown_rx: broadcast::Receiver<()>,
    /// Number of passes run so far
    cycle_count: u64,
}

impl PruneTask {
    /// Spawn a pruner using the log's configured interval
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(log: Arc<ActivityLog>) -> PrunerHandle {
        let interval = log.config().prune_interval;
        Self::spawn_with_interval(log, interval)
    }

    /// Spawn a pruner with an explicit interval
    pub fn spawn_with_interval(log: Arc<ActivityLog>, interval: Duration) -> PrunerHandle {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let task = Self {
            log,
            interval,
            shutdown_rx,
            cycle_count: 0,
        };

        let join = tokio::spawn(async move {
            task.run().await;
        });

        PrunerHandle {
            shutdown_tx,
            join: Some(join),
        }
    }

    async fn run(mut self) {
        info!(interval_secs = self.interval.as_secs(), "Activity pruner started");

        let mut interval = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown_rx.recv() => {
                    info!(cycles = self.cycle_count, "Activity pruner shutting down");
                    break;
                }
                _ = interval.tick() => {
                    self.cycle_count += 1;
                    let removed = self.log.prune_expired();
                    debug!(cycle = self.cycle_count, removed, "Prune pass complete");
                }
            }
        }
    }
}

/// Owner of a running [`PruneTask`]
///
/// Dropping the handle stops the task as well; [`shutdown`](Self::shutdown)
/// additionally waits for it to finish.
#[derive(Debug)]
pub struct PrunerHandle {
    shutdown_tx: broadcast::Sender<()>,
    join: Option<JoinHandle<()>>,
}

impl PrunerHandle {
    /// Stop the task and wait for it to exit
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(join) = self.join.take()
            && let Err(e) = join.await
            && !e.is_cancelled()
        {
            warn!(error = %e, "Activity pruner task failed");
        }
    }

    /// Whether the task has exited
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for PrunerHandle {
    fn drop(&mut self) {
        if let Some(join) = self.join.take() {
            let _ = self.shutdown_tx.send(());
            join.abort();
        }
    }
}
