//! Session snapshot persistence.
//!
//! Serializes the shared session document — character records with their
//! attached influence entries, plus round participation — as versioned,
//! human-readable JSON. Long-term document storage remains the hosting
//! platform's concern; this is the attachment state materialized for
//! save/restore.

use crate::store::{SessionDocument, SessionStore};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current snapshot format version.
const SNAPSHOT_VERSION: u32 = 1;

/// A saved session document with format metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedSession {
    /// Snapshot format version for compatibility checking.
    pub version: u32,

    /// When the snapshot was created (seconds since the Unix epoch).
    pub saved_at: String,

    /// The complete session document.
    pub document: SessionDocument,
}

impl SavedSession {
    /// Wrap the current document state for saving.
    pub fn new(document: SessionDocument) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: epoch_now(),
            document,
        }
    }
}

/// Save the store's current document to a JSON file.
pub async fn save_session(store: &SessionStore, path: impl AsRef<Path>) -> Result<(), PersistError> {
    let saved = SavedSession::new(store.snapshot().await);
    let json = serde_json::to_string_pretty(&saved)?;
    fs::write(path, json).await?;
    Ok(())
}

/// Load a session document from a JSON file into a fresh store.
pub async fn load_session(path: impl AsRef<Path>) -> Result<SessionStore, PersistError> {
    let json = fs::read_to_string(path).await?;
    let saved: SavedSession = serde_json::from_str(&json)?;

    if saved.version != SNAPSHOT_VERSION {
        return Err(PersistError::VersionMismatch {
            expected: SNAPSHOT_VERSION,
            found: saved.version,
        });
    }

    Ok(SessionStore::from_document(saved.document))
}

/// Epoch-seconds timestamp string.
fn epoch_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", now.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::character::CharacterRecord;
    use crate::graph::entry::InfluenceEntry;

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let store = SessionStore::new();
        let mut record = CharacterRecord::new("Kate");
        record.influences = vec![InfluenceEntry::new("Bison").with_have(true)];
        let id = store.add_character(record).await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        save_session(&store, &path).await.unwrap();
        let restored = load_session(&path).await.unwrap();

        let entries = restored.read_entries(id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].have_influence_over);
    }

    #[tokio::test]
    async fn test_version_mismatch_is_rejected() {
        let saved = SavedSession {
            version: 99,
            saved_at: "0".to_string(),
            document: SessionDocument::default(),
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.json");
        fs::write(&path, serde_json::to_string(&saved).unwrap())
            .await
            .unwrap();

        let result = load_session(&path).await;
        assert!(matches!(
            result,
            Err(PersistError::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                found: 99
            })
        ));
    }
}
