//! InfluenceSession - the primary public API for one client process.
//!
//! Wraps the store handle, permission gate, relay channel, pair
//! synchronizer, and debouncer behind a single facade configured for the
//! acting user.

use crate::announce::{Announcement, AnnouncementSink, LogSink};
use crate::graph::character::{CharacterId, UserId};
use crate::graph::mutator::Directive;
use crate::graph::query::{self, EdgeView};
use crate::persist::{self, PersistError};
use crate::rounds::DEFAULT_ROUND_RETENTION;
use crate::store::{SessionStore, StoreAccessor, StoreError};
use crate::sync::debounce::{WriteDebouncer, DEFAULT_DEBOUNCE_DELAY};
use crate::sync::election;
use crate::sync::pair::{PairSynchronizer, SyncReport};
use crate::sync::permission::{PermissionGate, SessionDirectory};
use crate::sync::relay::{RelayChannel, RelayRequest, RelayWorker};
use crate::sync::SyncError;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::warn;

/// Configuration for one client's session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The acting user.
    pub user: UserId,

    /// Deferral applied to debounced writes.
    pub debounce_delay: Duration,

    /// Rounds of participation history to retain.
    pub round_retention: usize,

    /// Whether `Reset` may clear locked entries.
    pub reset_unlocks: bool,
}

impl SessionConfig {
    /// Create a config for the given user with default policies.
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            debounce_delay: DEFAULT_DEBOUNCE_DELAY,
            round_retention: DEFAULT_ROUND_RETENTION,
            reset_unlocks: false,
        }
    }

    /// Set the debounce deferral.
    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    /// Set the participation history window.
    pub fn with_round_retention(mut self, retention: usize) -> Self {
        self.round_retention = retention;
        self
    }

    /// Allow `Reset` to clear locked entries.
    pub fn with_reset_unlocks(mut self, allow: bool) -> Self {
        self.reset_unlocks = allow;
        self
    }
}

/// How a round-map write landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundWriteOutcome {
    /// Committed locally.
    Applied,
    /// Forwarded to a coordinator; not yet committed.
    Forwarded,
    /// No permission and no active coordinator.
    NoCoordinator,
}

impl RoundWriteOutcome {
    /// Whether the write has not been observed to commit.
    pub fn is_partial(&self) -> bool {
        !matches!(self, RoundWriteOutcome::Applied)
    }
}

/// Result of toggling a character's round participation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticipationReport {
    /// The toggled character.
    pub character: CharacterId,
    /// Whether the character is inactive after the toggle (as computed;
    /// a forwarded write may not have landed yet).
    pub now_inactive: bool,
    /// How the write landed.
    pub outcome: RoundWriteOutcome,
}

/// A client session over the shared influence graph.
pub struct InfluenceSession {
    config: SessionConfig,
    store: SessionStore,
    directory: Arc<dyn SessionDirectory>,
    gate: PermissionGate,
    relay: RelayChannel,
    synchronizer: PairSynchronizer,
    debouncer: WriteDebouncer,
    sink: Arc<dyn AnnouncementSink>,
}

impl InfluenceSession {
    /// Create a session over shared collaborators.
    pub fn new(
        config: SessionConfig,
        store: SessionStore,
        directory: Arc<dyn SessionDirectory>,
        relay: RelayChannel,
    ) -> Self {
        let gate = PermissionGate::new(Arc::clone(&directory));
        let accessor = StoreAccessor::new(store.clone(), gate.clone(), config.user);
        let synchronizer = PairSynchronizer::new(accessor, relay.clone())
            .with_reset_unlocks(config.reset_unlocks);
        let debouncer = WriteDebouncer::new(config.debounce_delay);

        Self {
            config,
            store,
            directory,
            gate,
            relay,
            synchronizer,
            debouncer,
            sink: Arc::new(LogSink),
        }
    }

    /// Replace the announcement sink.
    pub fn with_sink(mut self, sink: Arc<dyn AnnouncementSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The acting user.
    pub fn user(&self) -> UserId {
        self.config.user
    }

    /// The shared store handle.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    // =========================================================================
    // Influence writes
    // =========================================================================

    /// Synchronize both halves of the edge between `a` and `b`, announcing
    /// every side that changed.
    pub async fn sync_pair(
        &self,
        a: CharacterId,
        b: CharacterId,
        directive: Directive,
    ) -> Result<SyncReport, SyncError> {
        let report = self.synchronizer.sync_pair(a, b, directive).await?;
        for announcement in Announcement::from_report(&report) {
            self.sink.publish(&announcement);
        }
        Ok(report)
    }

    /// Debounced [`InfluenceSession::sync_pair`], keyed by `a`.
    ///
    /// Rapid repeated calls for the same entity coalesce: only the last
    /// directive in a burst fires, after the configured delay.
    pub async fn sync_pair_debounced(&self, a: CharacterId, b: CharacterId, directive: Directive) {
        let synchronizer = self.synchronizer.clone();
        let sink = Arc::clone(&self.sink);
        let write = Box::pin(async move {
            match synchronizer.sync_pair(a, b, directive).await {
                Ok(report) => {
                    for announcement in Announcement::from_report(&report) {
                        sink.publish(&announcement);
                    }
                }
                Err(error) => warn!(%error, "deferred influence sync failed"),
            }
        });
        self.debouncer.schedule(a, write).await;
    }

    // =========================================================================
    // Graph queries
    // =========================================================================

    /// Classify every edge out of `focal` for rendering.
    pub async fn edges_from(&self, focal: CharacterId) -> Result<Vec<EdgeView>, StoreError> {
        query::edges_from(&self.store, focal).await
    }

    // =========================================================================
    // Round participation
    // =========================================================================

    /// The active round number.
    pub async fn current_round(&self) -> u32 {
        self.store.read_rounds().await.current_round()
    }

    /// Characters marked inactive in the active round.
    pub async fn inactive_this_round(&self) -> Vec<CharacterId> {
        let rounds = self.store.read_rounds().await;
        rounds
            .get_for_round(rounds.current_round())
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Flip a character's participation in the active round.
    ///
    /// Gated on the toggled character: its owners and coordinators write
    /// directly, everyone else forwards the computed post-state map.
    pub async fn toggle_participation(
        &self,
        id: CharacterId,
    ) -> Result<ParticipationReport, SyncError> {
        let record = self.store.character(id).await?;

        let mut rounds = self.store.read_rounds().await;
        let now_inactive = rounds.toggle(id);
        rounds.prune(self.config.round_retention);

        let outcome = if self.gate.can_write(&self.config.user, &record) {
            self.store
                .write_rounds(&self.gate, &self.config.user, id, rounds)
                .await?;
            RoundWriteOutcome::Applied
        } else {
            self.forward_rounds(rounds)?
        };

        Ok(ParticipationReport {
            character: id,
            now_inactive,
            outcome,
        })
    }

    /// Advance to the next round, pruning history. Coordinator-only as a
    /// local write; other clients forward.
    pub async fn advance_round(&self) -> Result<(u32, RoundWriteOutcome), SyncError> {
        let mut rounds = self.store.read_rounds().await;
        let round = rounds.advance();
        rounds.prune(self.config.round_retention);

        let outcome = if self.directory.is_coordinator(&self.config.user) {
            self.store.write_rounds_privileged(rounds).await;
            RoundWriteOutcome::Applied
        } else {
            self.forward_rounds(rounds)?
        };

        Ok((round, outcome))
    }

    fn forward_rounds(
        &self,
        rounds: crate::rounds::RoundParticipationMap,
    ) -> Result<RoundWriteOutcome, SyncError> {
        let snapshot = self.directory.active_users();
        if !election::coordinator_reachable(&snapshot) {
            warn!(user = %self.config.user, "no coordinator reachable; round write dropped");
            return Ok(RoundWriteOutcome::NoCoordinator);
        }
        self.relay.publish(RelayRequest::RoundWrite {
            rounds,
            origin: self.config.user,
        })?;
        Ok(RoundWriteOutcome::Forwarded)
    }

    // =========================================================================
    // Infrastructure
    // =========================================================================

    /// Spawn this client's relay listener.
    pub fn spawn_relay_worker(&self) -> JoinHandle<()> {
        RelayWorker::spawn(
            self.store.clone(),
            Arc::clone(&self.directory),
            &self.relay,
            self.config.user,
        )
    }

    /// Save the shared document to a JSON snapshot.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        persist::save_session(&self.store, path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::character::CharacterRecord;
    use crate::testing::MockDirectory;

    fn session_for(
        store: &SessionStore,
        directory: &MockDirectory,
        relay: &RelayChannel,
        user: UserId,
    ) -> InfluenceSession {
        InfluenceSession::new(
            SessionConfig::new(user),
            store.clone(),
            Arc::new(directory.clone()),
            relay.clone(),
        )
    }

    #[tokio::test]
    async fn test_owner_toggles_participation_locally() {
        let player = UserId::new();
        let directory = MockDirectory::new();
        directory.add_user(player, false, true);

        let store = SessionStore::new();
        let id = store
            .add_character(CharacterRecord::new("Kate").with_owner(player))
            .await;

        let relay = RelayChannel::new();
        let session = session_for(&store, &directory, &relay, player);

        let report = session.toggle_participation(id).await.unwrap();
        assert!(report.now_inactive);
        assert_eq!(report.outcome, RoundWriteOutcome::Applied);
        assert_eq!(session.inactive_this_round().await, vec![id]);

        let report = session.toggle_participation(id).await.unwrap();
        assert!(!report.now_inactive);
        assert!(session.inactive_this_round().await.is_empty());
    }

    #[tokio::test]
    async fn test_coordinator_advances_round() {
        let coordinator = UserId::new();
        let directory = MockDirectory::new();
        directory.add_user(coordinator, true, true);

        let store = SessionStore::new();
        let relay = RelayChannel::new();
        let session = session_for(&store, &directory, &relay, coordinator);

        let (round, outcome) = session.advance_round().await.unwrap();
        assert_eq!(round, 2);
        assert_eq!(outcome, RoundWriteOutcome::Applied);
        assert_eq!(session.current_round().await, 2);
    }

    #[tokio::test]
    async fn test_stranger_toggle_with_no_coordinator_is_dropped() {
        let stranger = UserId::new();
        let directory = MockDirectory::new();
        directory.add_user(stranger, false, true);

        let store = SessionStore::new();
        let id = store.add_character(CharacterRecord::new("Kate")).await;

        let relay = RelayChannel::new();
        let session = session_for(&store, &directory, &relay, stranger);

        let report = session.toggle_participation(id).await.unwrap();
        assert_eq!(report.outcome, RoundWriteOutcome::NoCoordinator);
        // Nothing landed in the shared document.
        assert!(session.inactive_this_round().await.is_empty());
    }
}
