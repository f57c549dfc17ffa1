//! Name canonicalization for fuzzy identity resolution.
//!
//! Influence entries are keyed by counterpart *name*, not by character id,
//! so every lookup funnels through [`NameKey`]. Matching tolerates decorated
//! labels ("Afraid (-2 to engage)" finds a stored "Afraid") at the cost of a
//! known false positive: distinct names that nest after normalization merge.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

lazy_static! {
    /// Honorific and article tokens dropped during normalization.
    static ref STRIP_TOKENS: HashSet<&'static str> = [
        "the", "a", "an", "sir", "lady", "lord", "dr", "mr", "mrs", "ms",
        "madame", "master",
    ]
    .into_iter()
    .collect();
}

/// A canonical, matchable form of a display name.
///
/// Construction is pure and deterministic: lowercase, strip honorific and
/// article tokens, collapse whitespace. The empty key never matches anything,
/// including another empty key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameKey(String);

impl NameKey {
    /// Canonicalize a display name into a matchable key.
    pub fn normalize(name: &str) -> Self {
        let lowered = name.to_lowercase();
        let key = lowered
            .split_whitespace()
            .filter(|token| !STRIP_TOKENS.contains(token))
            .collect::<Vec<_>>()
            .join(" ");
        Self(key)
    }

    /// Whether this key is empty (blank or honorifics-only input).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fuzzy match against another key.
    ///
    /// Keys match on exact equality or substring containment in either
    /// direction, so a stored "afraid (-2 to engage)" finds a candidate
    /// "afraid" and a stored "afraid" finds the decorated candidate.
    /// Empty keys never match.
    pub fn matches(&self, other: &NameKey) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.0 == other.0 || self.0.contains(&other.0) || other.0.contains(&self.0)
    }
}

impl fmt::Display for NameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
