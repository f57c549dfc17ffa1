//! Write synchronization: permissions, election, relay, and pairing.
//!
//! The write path for one side of an edge:
//!
//! ```text
//!                  ┌──────────────────┐
//!   directive ───> │ PairSynchronizer │──── mirrored directive ───> (other side)
//!                  └────────┬─────────┘
//!                           │ computed post-state
//!              ┌────────────┴────────────┐
//!              │ PermissionGate.can_write│
//!              └────┬───────────────┬────┘
//!                 yes│             no│
//!                    v               v
//!            StoreAccessor      RelayChannel ──> RelayWorker (primary
//!            (local commit)     (fire-and-forward)  coordinator commits)
//! ```

pub mod debounce;
pub mod election;
pub mod pair;
pub mod permission;
pub mod relay;

use crate::store::StoreError;
use thiserror::Error;

pub use debounce::WriteDebouncer;
pub use election::{coordinator_reachable, is_primary};
pub use pair::{PairSynchronizer, SideOutcome, SideReport, SyncReport};
pub use permission::{PermissionGate, SessionDirectory, UserPresence};
pub use relay::{RelayChannel, RelayRequest, RelayWorker};

/// Errors from the synchronization layer.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    #[error("neither '{a}' nor '{b}' is eligible to hold an influence relationship")]
    Ineligible { a: String, b: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("relay transport failure: {0}")]
    Transport(String),
}
