//! Deterministic coordinator election.
//!
//! "Who is primary" is a pure function over a presence snapshot, recomputed
//! for every relay event. It is never cached: a stale answer is exactly the
//! split-brain this exists to avoid.

use crate::graph::character::UserId;
use crate::sync::permission::UserPresence;

/// Whether `self_id` is the primary coordinator for the given snapshot.
///
/// Among active coordinators, the lowest id wins — every client sorts the
/// same list the same way, so at most one considers itself primary.
/// Degenerate fallback: with no coordinator active, any coordinator-capable
/// client is locally primary. A duplicate commit in that window is an
/// idempotent final-state write, so it is harmless.
pub fn is_primary(self_id: &UserId, users: &[UserPresence]) -> bool {
    let mut active: Vec<&UserPresence> = users
        .iter()
        .filter(|u| u.is_coordinator && u.is_active)
        .collect();

    if active.is_empty() {
        return users
            .iter()
            .any(|u| u.id == *self_id && u.is_coordinator);
    }

    active.sort_by_key(|u| u.id);
    active[0].id == *self_id
}

/// Whether any active coordinator exists to service relayed writes.
pub fn coordinator_reachable(users: &[UserPresence]) -> bool {
    users.iter().any(|u| u.is_coordinator && u.is_active)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presence(id: UserId, is_coordinator: bool, is_active: bool) -> UserPresence {
        UserPresence {
            id,
            is_coordinator,
            is_active,
        }
    }

    #[test]
    fn test_exactly_one_primary_among_active_coordinators() {
        let ids = [UserId::new(), UserId::new(), UserId::new()];
        let users: Vec<_> = ids.iter().map(|&id| presence(id, true, true)).collect();

        let primaries: Vec<_> = ids
            .iter()
            .filter(|&id| is_primary(id, &users))
            .collect();
        assert_eq!(primaries.len(), 1);
        assert_eq!(Some(*primaries[0]), ids.iter().copied().min());
    }

    #[test]
    fn test_inactive_coordinators_are_skipped() {
        let offline = UserId::new();
        let online = UserId::new();
        let users = vec![presence(offline, true, false), presence(online, true, true)];

        assert!(is_primary(&online, &users));
        assert!(!is_primary(&offline, &users));
    }

    #[test]
    fn test_degenerate_fallback_when_none_active() {
        let capable = UserId::new();
        let player = UserId::new();
        let users = vec![presence(capable, true, false), presence(player, false, true)];

        // Every coordinator-capable client services requests locally.
        assert!(is_primary(&capable, &users));
        assert!(!is_primary(&player, &users));
    }

    #[test]
    fn test_non_coordinator_is_never_primary() {
        let player = UserId::new();
        let users = vec![presence(player, false, true)];
        assert!(!is_primary(&player, &users));
    }

    #[test]
    fn test_coordinator_reachability() {
        let coordinator = UserId::new();
        assert!(!coordinator_reachable(&[presence(coordinator, true, false)]));
        assert!(coordinator_reachable(&[presence(coordinator, true, true)]));
        assert!(!coordinator_reachable(&[]));
    }
}
