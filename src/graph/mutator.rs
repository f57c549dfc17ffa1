//! The edge mutator: applies a directive to one side of an edge.

use crate::graph::entry::{EntryState, InfluenceEntry};
use crate::naming::NameKey;
use serde::{Deserialize, Serialize};

/// A requested change to one side of an influence edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Directive {
    /// This character gains influence over the counterpart.
    SetForward,
    /// The counterpart gains influence over this character.
    SetBackward,
    /// Both directions set at once.
    SetMutual,
    /// Clear both directions (and prune the entry if it ends vacant).
    Reset,
    /// Flip the forward flag.
    ToggleForward,
    /// Flip the backward flag; the counterpart-side mirror of
    /// [`Directive::ToggleForward`].
    ToggleBackward,
}

impl Directive {
    /// The directive the counterpart side must apply so the two stored
    /// halves of the edge agree on direction.
    pub fn mirrored(&self) -> Directive {
        match self {
            Directive::SetForward => Directive::SetBackward,
            Directive::SetBackward => Directive::SetForward,
            Directive::ToggleForward => Directive::ToggleBackward,
            Directive::ToggleBackward => Directive::ToggleForward,
            Directive::SetMutual => Directive::SetMutual,
            Directive::Reset => Directive::Reset,
        }
    }

    fn apply(&self, entry: &mut InfluenceEntry) {
        match self {
            Directive::SetForward => entry.have_influence_over = true,
            Directive::SetBackward => entry.has_influence_over = true,
            Directive::SetMutual => {
                entry.have_influence_over = true;
                entry.has_influence_over = true;
            }
            Directive::Reset => {
                entry.have_influence_over = false;
                entry.has_influence_over = false;
            }
            Directive::ToggleForward => entry.have_influence_over = !entry.have_influence_over,
            Directive::ToggleBackward => entry.has_influence_over = !entry.has_influence_over,
        }
    }
}

/// How a directive landed on an entry list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationStatus {
    /// The entry changed. `pruned` is set when the entry ended vacant and
    /// was removed from the list.
    Applied {
        before: EntryState,
        after: EntryState,
        pruned: bool,
    },
    /// The directive was a no-op on the current state.
    Unchanged { state: EntryState },
    /// The matched entry is locked and the directive was refused.
    SkippedLocked,
    /// No entry matched and the directive does not create one.
    NoMatch,
}

impl MutationStatus {
    /// Whether the list was modified.
    pub fn changed(&self) -> bool {
        matches!(self, MutationStatus::Applied { .. })
    }
}

/// Result of applying a directive: the replacement list plus a report of
/// what happened, for announcements.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    /// The full replacement entry list.
    pub entries: Vec<InfluenceEntry>,
    /// What happened to the matched (or created) entry.
    pub status: MutationStatus,
}

/// Apply `directive` to the entry matching `counterpart` in `entries`.
///
/// The input list is never modified; callers write the returned list back
/// through the store accessor (whole-list replacement). Lookup goes through
/// the name normalizer; a missing entry is created for every directive
/// except `Reset`. Locked entries refuse all directives, with `Reset`
/// additionally honored when `reset_unlocks` is set (it then clears the
/// lock too, so the entry prunes).
pub fn apply_directive(
    entries: &[InfluenceEntry],
    counterpart: &str,
    directive: Directive,
    reset_unlocks: bool,
) -> MutationOutcome {
    let key = NameKey::normalize(counterpart);
    if key.is_empty() {
        // A directive naming nobody can neither match nor create.
        return MutationOutcome {
            entries: entries.to_vec(),
            status: MutationStatus::NoMatch,
        };
    }

    let mut next = entries.to_vec();
    let position = next
        .iter()
        .position(|e| NameKey::normalize(&e.counterpart).matches(&key));

    let Some(index) = position else {
        if directive == Directive::Reset {
            return MutationOutcome {
                entries: next,
                status: MutationStatus::NoMatch,
            };
        }
        let mut entry = InfluenceEntry::new(counterpart);
        let before = entry.state();
        directive.apply(&mut entry);
        let after = entry.state();
        if after == before {
            return MutationOutcome {
                entries: next,
                status: MutationStatus::Unchanged { state: before },
            };
        }
        next.push(entry);
        return MutationOutcome {
            entries: next,
            status: MutationStatus::Applied {
                before,
                after,
                pruned: false,
            },
        };
    };

    if next[index].locked {
        if directive != Directive::Reset || !reset_unlocks {
            return MutationOutcome {
                entries: next,
                status: MutationStatus::SkippedLocked,
            };
        }
        next[index].locked = false;
    }

    let before = next[index].state();
    directive.apply(&mut next[index]);
    let after = next[index].state();

    if after == before {
        return MutationOutcome {
            entries: next,
            status: MutationStatus::Unchanged { state: before },
        };
    }

    let pruned = next[index].is_vacant();
    if pruned {
        next.remove(index);
    }

    MutationOutcome {
        entries: next,
        status: MutationStatus::Applied {
            before,
            after,
            pruned,
        },
    }
}
