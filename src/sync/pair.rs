//! The pair synchronizer: one directive, two stored edge halves.

use crate::graph::character::{CharacterId, CharacterRecord};
use crate::graph::entry::EntryState;
use crate::graph::mutator::{self, Directive, MutationStatus};
use crate::store::StoreAccessor;
use crate::sync::election;
use crate::sync::permission::UserPresence;
use crate::sync::relay::{RelayChannel, RelayRequest};
use crate::sync::SyncError;
use tracing::warn;

/// What happened to one side of the pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideOutcome {
    /// Committed locally.
    Applied {
        before: EntryState,
        after: EntryState,
        pruned: bool,
    },
    /// Forwarded to a coordinator via the relay; not yet committed.
    Forwarded {
        before: EntryState,
        after: EntryState,
        pruned: bool,
    },
    /// The directive was a no-op for this side.
    Unchanged,
    /// The matched entry is locked; this side was skipped.
    SkippedLocked,
    /// No permission and no active coordinator to forward to.
    NoCoordinator,
    /// The local write or the relay publish failed.
    Failed { note: String },
}

impl SideOutcome {
    /// Whether this side leaves the edge possibly asymmetric.
    pub fn is_partial(&self) -> bool {
        matches!(
            self,
            SideOutcome::Forwarded { .. } | SideOutcome::NoCoordinator | SideOutcome::Failed { .. }
        )
    }

    /// Before/after flag snapshots, when the directive landed.
    pub fn transition(&self) -> Option<(EntryState, EntryState)> {
        match self {
            SideOutcome::Applied { before, after, .. }
            | SideOutcome::Forwarded { before, after, .. } => Some((*before, *after)),
            _ => None,
        }
    }
}

/// Report for one endpoint of a synchronized pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideReport {
    /// The endpoint the directive was applied to.
    pub character: CharacterId,
    /// Endpoint display name.
    pub name: String,
    /// Counterpart display name the entry was keyed by.
    pub counterpart: String,
    /// What happened.
    pub outcome: SideOutcome,
}

/// Aggregated result of a pair synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// The side the directive named first.
    pub a: SideReport,
    /// The mirrored side.
    pub b: SideReport,
    /// True when some side was forwarded, unreachable, or failed.
    pub partial: bool,
}

/// Orchestrates the edge mutator across both endpoints, applying the
/// permission gate per side and falling back to the relay channel.
#[derive(Clone)]
pub struct PairSynchronizer {
    accessor: StoreAccessor,
    relay: RelayChannel,
    reset_unlocks: bool,
}

impl PairSynchronizer {
    pub fn new(accessor: StoreAccessor, relay: RelayChannel) -> Self {
        Self {
            accessor,
            relay,
            reset_unlocks: false,
        }
    }

    /// Allow `Reset` to clear locked entries.
    pub fn with_reset_unlocks(mut self, allow: bool) -> Self {
        self.reset_unlocks = allow;
        self
    }

    /// Apply `directive` to `a`'s entry for `b`, and the mirrored directive
    /// to `b`'s entry for `a`.
    ///
    /// Neither side's failure aborts the other. Relay publishes are
    /// fire-and-forward; a forwarded side is reported `partial` because the
    /// remote commit has not been observed.
    pub async fn sync_pair(
        &self,
        a: CharacterId,
        b: CharacterId,
        directive: Directive,
    ) -> Result<SyncReport, SyncError> {
        let record_a = self.accessor.store().character(a).await?;
        let record_b = self.accessor.store().character(b).await?;

        if !record_a.kind.holds_influence() || !record_b.kind.holds_influence() {
            return Err(SyncError::Ineligible {
                a: record_a.name,
                b: record_b.name,
            });
        }

        let snapshot = self.accessor.gate().directory().active_users();

        let side_a = self
            .sync_side(&record_a, &record_b.name, directive, &snapshot)
            .await;
        let side_b = self
            .sync_side(&record_b, &record_a.name, directive.mirrored(), &snapshot)
            .await;

        let partial = side_a.outcome.is_partial() || side_b.outcome.is_partial();
        Ok(SyncReport {
            a: side_a,
            b: side_b,
            partial,
        })
    }

    async fn sync_side(
        &self,
        record: &CharacterRecord,
        counterpart: &str,
        directive: Directive,
        snapshot: &[UserPresence],
    ) -> SideReport {
        let report = |outcome| SideReport {
            character: record.id,
            name: record.name.clone(),
            counterpart: counterpart.to_string(),
            outcome,
        };

        let entries = match self.accessor.read_entries(record.id).await {
            Ok(entries) => entries,
            Err(error) => {
                warn!(character = %record.id, %error, "could not read entries");
                return report(SideOutcome::Failed {
                    note: error.to_string(),
                });
            }
        };

        let outcome =
            mutator::apply_directive(&entries, counterpart, directive, self.reset_unlocks);
        let (before, after, pruned) = match outcome.status {
            MutationStatus::SkippedLocked => return report(SideOutcome::SkippedLocked),
            MutationStatus::NoMatch | MutationStatus::Unchanged { .. } => {
                return report(SideOutcome::Unchanged)
            }
            MutationStatus::Applied {
                before,
                after,
                pruned,
            } => (before, after, pruned),
        };

        if self.accessor.gate().can_write(self.accessor.user(), record) {
            match self.accessor.write_entries(record.id, outcome.entries).await {
                Ok(()) => report(SideOutcome::Applied {
                    before,
                    after,
                    pruned,
                }),
                Err(error) => {
                    warn!(character = %record.id, %error, "local influence write failed");
                    report(SideOutcome::Failed {
                        note: error.to_string(),
                    })
                }
            }
        } else if election::coordinator_reachable(snapshot) {
            let request = RelayRequest::InfluenceWrite {
                character: record.id,
                entries: outcome.entries,
                origin: *self.accessor.user(),
            };
            match self.relay.publish(request) {
                Ok(()) => report(SideOutcome::Forwarded {
                    before,
                    after,
                    pruned,
                }),
                Err(error) => {
                    warn!(character = %record.id, %error, "relay publish failed");
                    report(SideOutcome::Failed {
                        note: error.to_string(),
                    })
                }
            }
        } else {
            warn!(character = %record.id, "no coordinator reachable; side not updated");
            report(SideOutcome::NoCoordinator)
        }
    }
}
