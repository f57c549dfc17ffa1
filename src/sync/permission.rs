//! Write permissions and the session-layer capability query.

use crate::graph::character::{CharacterRecord, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A connected user as seen by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPresence {
    /// Stable user identifier.
    pub id: UserId,
    /// Holds the elevated coordinator role.
    pub is_coordinator: bool,
    /// Currently connected.
    pub is_active: bool,
}

/// Capability queries answered by the surrounding session layer.
///
/// The graph core never guesses at privilege or presence; it asks through
/// this seam and treats each answer as a point-in-time snapshot.
pub trait SessionDirectory: Send + Sync {
    /// Whether the user holds the elevated coordinator role.
    fn is_coordinator(&self, user: &UserId) -> bool;

    /// Whether the user is a registered owner of the record.
    fn owns_character(&self, user: &UserId, record: &CharacterRecord) -> bool {
        record.owners.contains(user)
    }

    /// Snapshot of currently known users and their presence.
    fn active_users(&self) -> Vec<UserPresence>;
}

/// Decides whether an acting user may write a character directly.
#[derive(Clone)]
pub struct PermissionGate {
    directory: Arc<dyn SessionDirectory>,
}

impl PermissionGate {
    pub fn new(directory: Arc<dyn SessionDirectory>) -> Self {
        Self { directory }
    }

    /// True iff the user is a coordinator or a registered owner of the
    /// record. Consulted before every local write attempt.
    pub fn can_write(&self, user: &UserId, record: &CharacterRecord) -> bool {
        self.directory.is_coordinator(user) || self.directory.owns_character(user, record)
    }

    /// The underlying directory.
    pub fn directory(&self) -> &Arc<dyn SessionDirectory> {
        &self.directory
    }
}
