//! Graph queries for visualization.
//!
//! Classification is always recomputed on demand. The two per-character
//! entry lists are the sole source of truth and may have drifted apart, so
//! caching a derived edge here would hide exactly the divergence the
//! renderer needs to show.

use crate::graph::character::{CharacterId, CharacterRecord};
use crate::graph::entry::InfluenceEntry;
use crate::naming::NameKey;
use crate::store::{SessionStore, StoreError};
use serde::{Deserialize, Serialize};

/// Direction classification of the logical edge between two characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeClass {
    /// No influence either way.
    None,
    /// Focal character influences the other.
    Forward,
    /// The other character influences the focal one.
    Backward,
    /// Influence runs both ways.
    Mutual,
}

impl EdgeClass {
    fn from_directions(forward: bool, backward: bool) -> Self {
        match (forward, backward) {
            (true, true) => EdgeClass::Mutual,
            (true, false) => EdgeClass::Forward,
            (false, true) => EdgeClass::Backward,
            (false, false) => EdgeClass::None,
        }
    }
}

/// One classified edge from a focal character, for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeView {
    /// The other endpoint.
    pub other: CharacterId,
    /// Edge direction relative to the focal character.
    pub class: EdgeClass,
}

/// Find `record`'s entry about `subject`, matching either of the subject's
/// names against the stored counterpart label.
fn entry_about<'a>(
    record: &'a CharacterRecord,
    subject: &CharacterRecord,
) -> Option<&'a InfluenceEntry> {
    record
        .influences
        .iter()
        .find(|e| subject.matches_key(&NameKey::normalize(&e.counterpart)))
}

/// Classify the edge between `focal` and `other` by cross-referencing both
/// entry lists. A direction counts when *either* side asserts it, so a
/// half-written (drifted) edge still renders.
pub fn classify(focal: &CharacterRecord, other: &CharacterRecord) -> EdgeClass {
    if !focal.kind.holds_influence() || !other.kind.holds_influence() {
        return EdgeClass::None;
    }

    let ours = entry_about(focal, other);
    let theirs = entry_about(other, focal);

    let forward = ours.is_some_and(|e| e.have_influence_over)
        || theirs.is_some_and(|e| e.has_influence_over);
    let backward = ours.is_some_and(|e| e.has_influence_over)
        || theirs.is_some_and(|e| e.have_influence_over);

    EdgeClass::from_directions(forward, backward)
}

/// Classify every edge out of `focal` against all other participants.
///
/// O(n) over the session's characters, which is fine at table scale.
/// Background characters are skipped; they cannot hold edges.
pub async fn edges_from(
    store: &SessionStore,
    focal: CharacterId,
) -> Result<Vec<EdgeView>, StoreError> {
    let characters = store.characters().await;
    let focal_record = characters
        .iter()
        .find(|c| c.id == focal)
        .ok_or(StoreError::UnknownCharacter(focal))?;

    Ok(characters
        .iter()
        .filter(|c| c.id != focal && c.kind.holds_influence())
        .map(|other| EdgeView {
            other: other.id,
            class: classify(focal_record, other),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::character::CharacterKind;
    use crate::graph::entry::InfluenceEntry;

    fn with_entries(name: &str, entries: Vec<InfluenceEntry>) -> CharacterRecord {
        let mut record = CharacterRecord::new(name);
        record.influences = entries;
        record
    }

    #[test]
    fn test_classify_mutual_from_matching_sides() {
        let kate = with_entries("Kate", vec![InfluenceEntry::new("Bison").with_have(true)]);
        let bison = with_entries("Bison", vec![InfluenceEntry::new("Kate").with_have(true)]);
        assert_eq!(classify(&kate, &bison), EdgeClass::Mutual);
    }

    #[test]
    fn test_classify_forward_only() {
        let kate = with_entries("Kate", vec![InfluenceEntry::new("Bison").with_have(true)]);
        let bison = with_entries("Bison", vec![]);
        assert_eq!(classify(&kate, &bison), EdgeClass::Forward);
    }

    #[test]
    fn test_classify_reads_drifted_counterpart_side() {
        // Kate's own list is empty, but Bison's half of the edge says Kate
        // dominates him. The drifted direction must still render.
        let kate = with_entries("Kate", vec![]);
        let bison = with_entries("Bison", vec![InfluenceEntry::new("Kate").with_has(true)]);
        assert_eq!(classify(&kate, &bison), EdgeClass::Forward);
        assert_eq!(classify(&bison, &kate), EdgeClass::Backward);
    }

    #[test]
    fn test_classify_none_without_entries() {
        let kate = with_entries("Kate", vec![]);
        let bison = with_entries("Bison", vec![]);
        assert_eq!(classify(&kate, &bison), EdgeClass::None);
    }

    #[test]
    fn test_extras_always_classify_none() {
        let kate = with_entries("Kate", vec![InfluenceEntry::new("Shopkeeper").with_have(true)]);
        let extra = CharacterRecord::new("Shopkeeper").with_kind(CharacterKind::Extra);
        assert_eq!(classify(&kate, &extra), EdgeClass::None);
    }

    #[test]
    fn test_classify_matches_alternate_name() {
        let kate = with_entries("Kate", vec![InfluenceEntry::new("Hawkeye").with_have(true)]);
        let bishop = CharacterRecord::new("Kate Bishop").with_alt_name("Hawkeye");
        // Entry was recorded under the alternate name.
        assert_eq!(classify(&kate, &bishop), EdgeClass::Forward);
    }
}
