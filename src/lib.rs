//! Shared-table influence graph engine.
//!
//! This crate maintains a directed, possibly-asymmetric influence
//! relationship between pairs of character records shared by concurrent
//! clients, where a client may hold only partial write permission over the
//! stored state. It provides:
//! - Fuzzy, name-keyed identity resolution
//! - Redundant bilateral edge storage with best-effort mirroring
//! - Permission-aware write forwarding through an elected relay coordinator
//! - On-demand graph classification for rendering
//! - Bounded per-round participation tracking
//!
//! # Quick Start
//!
//! ```ignore
//! use influence_core::{Directive, InfluenceSession, SessionConfig};
//!
//! let session = InfluenceSession::new(config, store, directory, relay);
//! session.spawn_relay_worker();
//!
//! let report = session.sync_pair(kate, bison, Directive::SetMutual).await?;
//! assert!(!report.partial);
//! ```

pub mod announce;
pub mod graph;
pub mod naming;
pub mod persist;
pub mod rounds;
pub mod session;
pub mod store;
pub mod sync;
pub mod testing;

// Primary public API
pub use announce::{Announcement, AnnouncementSink, DirectionSymbol, LogSink};
pub use graph::{
    CharacterId, CharacterKind, CharacterRecord, Directive, EdgeClass, EdgeView, EntryState,
    InfluenceEntry, UserId,
};
pub use naming::NameKey;
pub use persist::{load_session, save_session, PersistError, SavedSession};
pub use rounds::RoundParticipationMap;
pub use session::{InfluenceSession, ParticipationReport, RoundWriteOutcome, SessionConfig};
pub use store::{SessionDocument, SessionStore, StoreAccessor, StoreError};
pub use sync::{
    PairSynchronizer, PermissionGate, RelayChannel, RelayRequest, RelayWorker, SessionDirectory,
    SideOutcome, SideReport, SyncError, SyncReport, UserPresence, WriteDebouncer,
};
