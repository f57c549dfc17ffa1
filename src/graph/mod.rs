//! The influence graph: characters, entries, mutation, and queries.
//!
//! An "edge" here is never a single stored object. It is realized as two
//! independently stored [`InfluenceEntry`] halves, one attached to each
//! endpoint, kept in agreement on a best-effort basis by the pair
//! synchronizer:
//!
//! ```text
//! ┌────────────────────┐                    ┌────────────────────┐
//! │ CharacterRecord A  │                    │ CharacterRecord B  │
//! │                    │    logical edge    │                    │
//! │ influences:        │ <────────────────> │ influences:        │
//! │   "B" have=true    │                    │   "A" has=true     │
//! └────────────────────┘                    └────────────────────┘
//! ```
//!
//! Either half may lag or drift after a partial failure; queries therefore
//! cross-reference both lists instead of trusting one.

pub mod character;
pub mod entry;
pub mod mutator;
pub mod query;

pub use character::{CharacterId, CharacterKind, CharacterRecord, UserId};
pub use entry::{EntryId, EntryState, InfluenceEntry};
pub use mutator::{apply_directive, Directive, MutationOutcome, MutationStatus};
pub use query::{classify, edges_from, EdgeClass, EdgeView};
