//! The shared session document and its permission-checked accessor.
//!
//! Every client process holds a handle to the same document store; the
//! store's write lock is the per-document write serialization the rest of
//! the design leans on. Writes replace an entire attachment (entry list or
//! round map) at once — concurrent writers race last-write-wins, with no
//! merge.

use crate::graph::character::{CharacterId, CharacterRecord, UserId};
use crate::graph::entry::InfluenceEntry;
use crate::naming::NameKey;
use crate::rounds::RoundParticipationMap;
use crate::sync::permission::PermissionGate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors from document store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("user {user} may not write character {character}")]
    WriteDenied { user: UserId, character: CharacterId },

    #[error("unknown character: {0}")]
    UnknownCharacter(CharacterId),
}

/// The shared session document: character records plus round participation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionDocument {
    /// All character records, with their attached influence entries.
    pub characters: HashMap<CharacterId, CharacterRecord>,
    /// Round participation history.
    pub rounds: RoundParticipationMap,
}

/// Handle to the shared session document.
///
/// Cheap to clone; all clones address the same document.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<SessionDocument>>,
    commits: Arc<AtomicU64>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store over an existing document (e.g. a loaded snapshot).
    pub fn from_document(document: SessionDocument) -> Self {
        Self {
            inner: Arc::new(RwLock::new(document)),
            commits: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Clone out the full document.
    pub async fn snapshot(&self) -> SessionDocument {
        self.inner.read().await.clone()
    }

    /// Number of committed attachment writes since creation.
    ///
    /// Lets tests assert *how many* writes landed, which idempotent
    /// final-state writes would otherwise hide.
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::Relaxed)
    }

    // =========================================================================
    // Character CRUD
    // =========================================================================

    /// Add a character record, returning its id.
    pub async fn add_character(&self, record: CharacterRecord) -> CharacterId {
        let id = record.id;
        self.inner.write().await.characters.insert(id, record);
        id
    }

    /// Fetch a character by id (cloned, never aliased).
    pub async fn character(&self, id: CharacterId) -> Result<CharacterRecord, StoreError> {
        self.inner
            .read()
            .await
            .characters
            .get(&id)
            .cloned()
            .ok_or(StoreError::UnknownCharacter(id))
    }

    /// Remove a character record.
    pub async fn remove_character(&self, id: CharacterId) -> bool {
        self.inner.write().await.characters.remove(&id).is_some()
    }

    /// All character records (cloned).
    pub async fn characters(&self) -> Vec<CharacterRecord> {
        self.inner.read().await.characters.values().cloned().collect()
    }

    /// Ids of all characters in the session.
    pub async fn character_ids(&self) -> Vec<CharacterId> {
        self.inner.read().await.characters.keys().copied().collect()
    }

    /// Find a character whose name or alternate matches the given name.
    pub async fn find_by_name(&self, name: &str) -> Option<CharacterRecord> {
        let key = NameKey::normalize(name);
        if key.is_empty() {
            return None;
        }
        self.inner
            .read()
            .await
            .characters
            .values()
            .find(|record| record.matches_key(&key))
            .cloned()
    }

    // =========================================================================
    // Attachment reads
    // =========================================================================

    /// Read a character's entry list. Defensive copy, never aliased.
    pub async fn read_entries(&self, id: CharacterId) -> Result<Vec<InfluenceEntry>, StoreError> {
        self.inner
            .read()
            .await
            .characters
            .get(&id)
            .map(|record| record.influences.clone())
            .ok_or(StoreError::UnknownCharacter(id))
    }

    /// Read the round participation map (cloned).
    pub async fn read_rounds(&self) -> RoundParticipationMap {
        self.inner.read().await.rounds.clone()
    }

    // =========================================================================
    // Attachment writes
    // =========================================================================

    /// Permission-checked whole-list replacement of a character's entries.
    pub async fn write_entries(
        &self,
        gate: &PermissionGate,
        user: &UserId,
        id: CharacterId,
        entries: Vec<InfluenceEntry>,
    ) -> Result<(), StoreError> {
        let mut doc = self.inner.write().await;
        let record = doc
            .characters
            .get_mut(&id)
            .ok_or(StoreError::UnknownCharacter(id))?;
        if !gate.can_write(user, record) {
            return Err(StoreError::WriteDenied {
                user: *user,
                character: id,
            });
        }
        record.influences = entries;
        self.commits.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Replacement of a character's entries on the relay-worker path, where
    /// the election has already vetted the writer.
    pub async fn write_entries_privileged(
        &self,
        id: CharacterId,
        entries: Vec<InfluenceEntry>,
    ) -> Result<(), StoreError> {
        let mut doc = self.inner.write().await;
        let record = doc
            .characters
            .get_mut(&id)
            .ok_or(StoreError::UnknownCharacter(id))?;
        record.influences = entries;
        self.commits.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Permission-checked round-map replacement. Permission derives from a
    /// target character: whoever may write that character may record its
    /// participation.
    pub async fn write_rounds(
        &self,
        gate: &PermissionGate,
        user: &UserId,
        target: CharacterId,
        rounds: RoundParticipationMap,
    ) -> Result<(), StoreError> {
        let mut doc = self.inner.write().await;
        let record = doc
            .characters
            .get(&target)
            .ok_or(StoreError::UnknownCharacter(target))?;
        if !gate.can_write(user, record) {
            return Err(StoreError::WriteDenied {
                user: *user,
                character: target,
            });
        }
        doc.rounds = rounds;
        self.commits.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Round-map replacement on the relay-worker or coordinator path.
    pub async fn write_rounds_privileged(&self, rounds: RoundParticipationMap) {
        self.inner.write().await.rounds = rounds;
        self.commits.fetch_add(1, Ordering::Relaxed);
    }
}

/// A client's permission-aware view of the store: the acting user bound
/// together with the gate that vets their writes.
#[derive(Clone)]
pub struct StoreAccessor {
    store: SessionStore,
    gate: PermissionGate,
    user: UserId,
}

impl StoreAccessor {
    pub fn new(store: SessionStore, gate: PermissionGate, user: UserId) -> Self {
        Self { store, gate, user }
    }

    /// The acting user.
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// The underlying store handle.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The permission gate in use.
    pub fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    /// Read a character's entry list.
    pub async fn read_entries(&self, id: CharacterId) -> Result<Vec<InfluenceEntry>, StoreError> {
        self.store.read_entries(id).await
    }

    /// Write a character's entry list as the acting user.
    pub async fn write_entries(
        &self,
        id: CharacterId,
        entries: Vec<InfluenceEntry>,
    ) -> Result<(), StoreError> {
        self.store
            .write_entries(&self.gate, &self.user, id, entries)
            .await
    }

    /// Write the round map as the acting user, gated on a target character.
    pub async fn write_rounds(
        &self,
        target: CharacterId,
        rounds: RoundParticipationMap,
    ) -> Result<(), StoreError> {
        self.store
            .write_rounds(&self.gate, &self.user, target, rounds)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDirectory;

    fn gate_for(directory: &MockDirectory) -> PermissionGate {
        PermissionGate::new(Arc::new(directory.clone()))
    }

    #[tokio::test]
    async fn test_read_entries_returns_defensive_copy() {
        let store = SessionStore::new();
        let mut record = CharacterRecord::new("Kate");
        record.influences = vec![InfluenceEntry::new("Bison").with_have(true)];
        let id = store.add_character(record).await;

        let mut copy = store.read_entries(id).await.unwrap();
        copy.clear();

        assert_eq!(store.read_entries(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_write_entries_denied_without_permission() {
        let stranger = UserId::new();
        let directory = MockDirectory::new();
        directory.add_user(stranger, false, true);

        let store = SessionStore::new();
        let id = store.add_character(CharacterRecord::new("Kate")).await;

        let result = store
            .write_entries(&gate_for(&directory), &stranger, id, Vec::new())
            .await;
        assert!(matches!(result, Err(StoreError::WriteDenied { .. })));
        assert_eq!(store.commit_count(), 0);
    }

    #[tokio::test]
    async fn test_write_entries_replaces_whole_list() {
        let owner = UserId::new();
        let directory = MockDirectory::new();
        directory.add_user(owner, false, true);

        let store = SessionStore::new();
        let mut record = CharacterRecord::new("Kate").with_owner(owner);
        record.influences = vec![
            InfluenceEntry::new("Bison").with_have(true),
            InfluenceEntry::new("Afraid").with_has(true),
        ];
        let id = store.add_character(record).await;

        let replacement = vec![InfluenceEntry::new("Bison").with_has(true)];
        store
            .write_entries(&gate_for(&directory), &owner, id, replacement.clone())
            .await
            .unwrap();

        assert_eq!(store.read_entries(id).await.unwrap(), replacement);
        assert_eq!(store.commit_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_character_errors() {
        let store = SessionStore::new();
        let missing = CharacterId::new();
        assert!(matches!(
            store.read_entries(missing).await,
            Err(StoreError::UnknownCharacter(_))
        ));
    }

    #[tokio::test]
    async fn test_find_by_name_uses_normalizer() {
        let store = SessionStore::new();
        let id = store
            .add_character(CharacterRecord::new("The Lady Kate"))
            .await;

        let found = store.find_by_name("kate").await;
        assert_eq!(found.map(|r| r.id), Some(id));
        assert!(store.find_by_name("  ").await.is_none());
    }
}
