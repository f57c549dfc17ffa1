//! The relay channel: pub/sub forwarding of writes a client cannot make.
//!
//! Transport contract: at-least-once delivery, possibly duplicated, ordered
//! only within one publisher's own stream. Requests carry the computed
//! post-state rather than the originating directive, so a coordinator never
//! re-derives state from data that may have gone stale in flight, and a
//! duplicated delivery commits the same final state twice — harmlessly.

use crate::graph::character::{CharacterId, UserId};
use crate::graph::entry::InfluenceEntry;
use crate::rounds::RoundParticipationMap;
use crate::store::SessionStore;
use crate::sync::election;
use crate::sync::permission::SessionDirectory;
use crate::sync::SyncError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Buffered requests per subscriber before a slow worker starts lagging.
const CHANNEL_CAPACITY: usize = 64;

/// A forwarded write request, carrying full post-state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RelayRequest {
    /// Replace a character's influence entries.
    InfluenceWrite {
        character: CharacterId,
        entries: Vec<InfluenceEntry>,
        origin: UserId,
    },
    /// Replace the round participation map.
    RoundWrite {
        rounds: RoundParticipationMap,
        origin: UserId,
    },
}

/// Pub/sub handle shared by every client in the session.
#[derive(Clone)]
pub struct RelayChannel {
    tx: broadcast::Sender<RelayRequest>,
}

impl Default for RelayChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayChannel {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Broadcast a request to every subscribed worker. Fire-and-forward:
    /// there is no ack and the commit is not awaited.
    pub fn publish(&self, request: RelayRequest) -> Result<(), SyncError> {
        debug!(?request, "publishing relay request");
        self.tx
            .send(request)
            .map(|_| ())
            .map_err(|_| SyncError::Transport("no relay subscribers".to_string()))
    }

    /// Subscribe to the request stream.
    pub fn subscribe(&self) -> broadcast::Receiver<RelayRequest> {
        self.tx.subscribe()
    }
}

/// A client's relay listener.
///
/// Every client may run one; only the elected primary acts on a request.
pub struct RelayWorker;

impl RelayWorker {
    /// Spawn the listener task for `self_user`.
    ///
    /// Handler policy: recompute the election per request from a fresh
    /// presence snapshot; ignore unless primary; perform the privileged
    /// write; log and swallow failures with no retry — the user re-triggers,
    /// or a later relay event completes the edge.
    pub fn spawn(
        store: SessionStore,
        directory: Arc<dyn SessionDirectory>,
        channel: &RelayChannel,
        self_user: UserId,
    ) -> JoinHandle<()> {
        let mut rx = channel.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(request) => {
                        handle_request(&store, directory.as_ref(), &self_user, request).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(%self_user, skipped, "relay worker lagged; requests dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

async fn handle_request(
    store: &SessionStore,
    directory: &dyn SessionDirectory,
    self_user: &UserId,
    request: RelayRequest,
) {
    let snapshot = directory.active_users();
    if !election::is_primary(self_user, &snapshot) {
        debug!(%self_user, "not primary; ignoring relay request");
        return;
    }

    match request {
        RelayRequest::InfluenceWrite {
            character,
            entries,
            origin,
        } => {
            if let Err(error) = store.write_entries_privileged(character, entries).await {
                warn!(%character, %origin, %error, "relayed influence write failed");
            }
        }
        RelayRequest::RoundWrite { rounds, origin } => {
            debug!(%origin, "applying relayed round write");
            store.write_rounds_privileged(rounds).await;
        }
    }
}
