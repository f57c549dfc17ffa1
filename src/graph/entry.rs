//! Influence entries — one character's half of an edge.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for influence entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One direction-pair of influence, attached to a single character.
///
/// Entries are keyed by counterpart *name* rather than character id, so two
/// counterparts whose normalized names collide will merge. That matching
/// behavior is load-bearing for decorated labels and is preserved as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfluenceEntry {
    /// Unique identifier.
    pub id: EntryId,
    /// Display name of the counterpart character.
    pub counterpart: String,
    /// This character holds influence over the counterpart.
    pub have_influence_over: bool,
    /// The counterpart holds influence over this character.
    pub has_influence_over: bool,
    /// Locked entries ignore mutation directives.
    pub locked: bool,
}

impl InfluenceEntry {
    /// Create a fresh entry for a counterpart, with no influence either way.
    pub fn new(counterpart: impl Into<String>) -> Self {
        Self {
            id: EntryId::new(),
            counterpart: counterpart.into(),
            have_influence_over: false,
            has_influence_over: false,
            locked: false,
        }
    }

    /// Set the forward flag.
    pub fn with_have(mut self, have: bool) -> Self {
        self.have_influence_over = have;
        self
    }

    /// Set the backward flag.
    pub fn with_has(mut self, has: bool) -> Self {
        self.has_influence_over = has;
        self
    }

    /// Lock the entry against mutation.
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// An entry that encodes no relationship and is not locked must not
    /// persist; the mutator prunes it after every application.
    pub fn is_vacant(&self) -> bool {
        !self.have_influence_over && !self.has_influence_over && !self.locked
    }

    /// Snapshot of the direction flags.
    pub fn state(&self) -> EntryState {
        EntryState {
            have: self.have_influence_over,
            has: self.has_influence_over,
        }
    }
}

/// A before/after snapshot of one entry's direction flags.
///
/// The default value doubles as the state of an absent (or pruned) entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryState {
    /// Entry holder dominates the counterpart.
    pub have: bool,
    /// Counterpart dominates the entry holder.
    pub has: bool,
}
