//! Composition of a log with its single background pruner
//!
//! Application roots create one [`ActivityService`] per session and hand
//! clones of [`ActivityService::log`] to collaborators.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::log::ActivityLog;
use crate::pruner::{PruneTask, PrunerHandle};

/// Owns an [`ActivityLog`] and at most one running pruner
#[derive(Debug)]
pub struct ActivityService {
    log: Arc<ActivityLog>,
    pruner: Mutex<Option<PrunerHandle>>,
}

impl ActivityService {
    /// Wrap a log without starting the pruner
    pub fn new(log: ActivityLog) -> Self {
        Self {
            log: Arc::new(log),
            pruner: Mutex::new(None),
        }
    }

    /// Wrap a log and start the pruner immediately
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(log: ActivityLog) -> Self {
        let service = Self::new(log);
        service.start_pruner();
        service
    }

    /// The shared log
    pub fn log(&self) -> &Arc<ActivityLog> {
        &self.log
    }

    /// Start the pruner, replacing (and stopping) any running one
    pub fn start_pruner(&self) {
        let handle = PruneTask::spawn(self.log.clone());
        if self.pruner.lock().replace(handle).is_some() {
            debug!("Replaced running activity pruner");
        }
    }

    /// Whether a pruner is currently running
    pub fn is_pruner_running(&self) -> bool {
        self.pruner
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the pruner and wait for it to exit; a no-op when none is running
    pub async fn shutdown(&self) {
        let handle = self.pruner.lock().take();
        if let Some(handle) = handle {
            handle.shutdown().await;
        }
    }
}
