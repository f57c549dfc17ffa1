//! Character records and identifiers.

use crate::graph::entry::InfluenceEntry;
use crate::naming::NameKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for characters.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for users (connected clients).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of character a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterKind {
    /// A full participant that can hold and originate influence edges.
    Participant,
    /// Scenery or background characters; never an edge endpoint.
    Extra,
}

impl CharacterKind {
    /// Whether this kind of character can be an influence edge endpoint.
    pub fn holds_influence(&self) -> bool {
        matches!(self, CharacterKind::Participant)
    }
}

/// A character document shared by the table.
///
/// The attached `influences` list is this character's half of every edge it
/// participates in. The list is replaced wholesale on write; there are no
/// partial-field updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterRecord {
    /// Unique identifier.
    pub id: CharacterId,
    /// Primary display name.
    pub name: String,
    /// Alternate name or nickname, if any.
    pub alt_name: Option<String>,
    /// Users registered as owners of this record.
    pub owners: Vec<UserId>,
    /// Participant vs. background character.
    pub kind: CharacterKind,
    /// Attached influence entries, in insertion order.
    pub influences: Vec<InfluenceEntry>,
}

impl CharacterRecord {
    /// Create a new participant record.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            alt_name: None,
            owners: Vec::new(),
            kind: CharacterKind::Participant,
            influences: Vec::new(),
        }
    }

    /// Set the alternate name.
    pub fn with_alt_name(mut self, alt: impl Into<String>) -> Self {
        self.alt_name = Some(alt.into());
        self
    }

    /// Register an owner.
    pub fn with_owner(mut self, owner: UserId) -> Self {
        self.owners.push(owner);
        self
    }

    /// Set the character kind.
    pub fn with_kind(mut self, kind: CharacterKind) -> Self {
        self.kind = kind;
        self
    }

    /// Normalized key for the primary name.
    pub fn name_key(&self) -> NameKey {
        NameKey::normalize(&self.name)
    }

    /// Check whether a candidate key matches this record's name or alternate.
    pub fn matches_key(&self, candidate: &NameKey) -> bool {
        if self.name_key().matches(candidate) {
            return true;
        }
        self.alt_name
            .as_deref()
            .is_some_and(|alt| NameKey::normalize(alt).matches(candidate))
    }

    /// Find this record's entry for a counterpart name, if any.
    pub fn entry_for(&self, counterpart: &str) -> Option<&InfluenceEntry> {
        let key = NameKey::normalize(counterpart);
        if key.is_empty() {
            return None;
        }
        self.influences
            .iter()
            .find(|e| NameKey::normalize(&e.counterpart).matches(&key))
    }
}
