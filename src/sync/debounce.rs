//! Debounced coalescing of rapid local writes.
//!
//! Dragging an influence arrow can fire many directives for the same entity
//! in quick succession. Each scheduled write is deferred by a short fixed
//! delay; scheduling again for the same entity cancels and replaces the
//! pending task, so only the last write in a burst fires.

use crate::graph::character::CharacterId;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Default deferral before a scheduled write fires.
pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Per-entity cancellable write scheduler.
pub struct WriteDebouncer {
    delay: Duration,
    pending: Mutex<HashMap<CharacterId, JoinHandle<()>>>,
}

impl WriteDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Schedule `write` to run after the configured delay, superseding any
    /// pending write for the same entity. The superseded task is fully
    /// cancelled — it never fires.
    pub async fn schedule(&self, key: CharacterId, write: BoxFuture<'static, ()>) {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            write.await;
        });

        let mut pending = self.pending.lock().await;
        if let Some(previous) = pending.insert(key, handle) {
            previous.abort();
        }
    }

    /// Cancel the pending write for an entity, if one exists and has not
    /// fired yet.
    pub async fn cancel(&self, key: &CharacterId) -> bool {
        match self.pending.lock().await.remove(key) {
            Some(handle) => {
                let live = !handle.is_finished();
                handle.abort();
                live
            }
            None => false,
        }
    }

    /// Number of scheduled writes that have not fired yet.
    pub async fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .await
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }
}
