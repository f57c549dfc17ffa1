//! Testing utilities for the influence graph.
//!
//! This module provides tools for integration testing:
//! - `MockDirectory` for scripting privilege and presence without a host
//!   platform
//! - `CollectingSink` for capturing announcements
//! - `TestHarness` for multi-client scenarios over one shared table

use crate::announce::{Announcement, AnnouncementSink};
use crate::graph::character::{CharacterId, CharacterRecord, UserId};
use crate::session::{InfluenceSession, SessionConfig};
use crate::store::SessionStore;
use crate::sync::permission::{SessionDirectory, UserPresence};
use crate::sync::relay::RelayChannel;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// A scriptable session directory.
///
/// Clones share state, so a test can flip presence mid-scenario and every
/// client observes the change on its next snapshot.
#[derive(Clone, Default)]
pub struct MockDirectory {
    users: Arc<RwLock<HashMap<UserId, UserPresence>>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user with the given privilege and presence.
    pub fn add_user(&self, id: UserId, is_coordinator: bool, is_active: bool) {
        self.users
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(
                id,
                UserPresence {
                    id,
                    is_coordinator,
                    is_active,
                },
            );
    }

    /// Flip a user's presence.
    pub fn set_active(&self, id: UserId, is_active: bool) {
        if let Some(user) = self
            .users
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(&id)
        {
            user.is_active = is_active;
        }
    }
}

impl SessionDirectory for MockDirectory {
    fn is_coordinator(&self, user: &UserId) -> bool {
        self.users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(user)
            .is_some_and(|u| u.is_coordinator)
    }

    fn active_users(&self) -> Vec<UserPresence> {
        self.users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .copied()
            .collect()
    }
}

/// Sink that records announcements for assertions.
#[derive(Clone, Default)]
pub struct CollectingSink {
    records: Arc<Mutex<Vec<Announcement>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the captured announcements.
    pub fn take(&self) -> Vec<Announcement> {
        std::mem::take(&mut *self.records.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl AnnouncementSink for CollectingSink {
    fn publish(&self, announcement: &Announcement) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(announcement.clone());
    }
}

/// One shared table for multi-client test scenarios: a store, a directory,
/// and a relay channel that every simulated client plugs into.
#[derive(Clone, Default)]
pub struct TestHarness {
    pub store: SessionStore,
    pub directory: MockDirectory,
    pub relay: RelayChannel,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an active coordinator and return their id.
    pub fn coordinator(&self) -> UserId {
        let id = UserId::new();
        self.directory.add_user(id, true, true);
        id
    }

    /// Register an active unprivileged player and return their id.
    pub fn player(&self) -> UserId {
        let id = UserId::new();
        self.directory.add_user(id, false, true);
        id
    }

    /// Add a participant character, optionally owned by a user.
    pub async fn add_participant(&self, name: &str, owner: Option<UserId>) -> CharacterId {
        let mut record = CharacterRecord::new(name);
        if let Some(owner) = owner {
            record = record.with_owner(owner);
        }
        self.store.add_character(record).await
    }

    /// Build a session for a user with default config.
    pub fn session(&self, user: UserId) -> InfluenceSession {
        self.session_with(SessionConfig::new(user))
    }

    /// Build a session from an explicit config.
    pub fn session_with(&self, config: SessionConfig) -> InfluenceSession {
        InfluenceSession::new(
            config,
            self.store.clone(),
            Arc::new(self.directory.clone()),
            self.relay.clone(),
        )
    }

    /// Yield until spawned relay workers have had a chance to drain their
    /// queues. Bounded; does not guarantee quiescence under load.
    pub async fn settle(&self) {
        for _ in 0..64 {
            tokio::task::yield_now().await;
        }
    }
}
