//! Human-readable transition announcements.
//!
//! Consumers are external log/chat collaborators; this module only builds
//! the structured record and hands it to a sink.

use crate::graph::entry::EntryState;
use crate::sync::pair::SyncReport;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Direction glyph for a post-transition entry state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectionSymbol {
    /// Holder dominates counterpart only.
    Forward,
    /// Counterpart dominates holder only.
    Backward,
    /// Both directions.
    Mutual,
    /// No influence either way.
    None,
}

impl DirectionSymbol {
    /// Classify an entry state.
    pub fn from_state(state: EntryState) -> Self {
        match (state.have, state.has) {
            (true, false) => DirectionSymbol::Forward,
            (false, true) => DirectionSymbol::Backward,
            (true, true) => DirectionSymbol::Mutual,
            (false, false) => DirectionSymbol::None,
        }
    }

    /// The rendered glyph.
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectionSymbol::Forward => ">",
            DirectionSymbol::Backward => "<",
            DirectionSymbol::Mutual => "=",
            DirectionSymbol::None => "—",
        }
    }
}

impl fmt::Display for DirectionSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A transition summary for one side of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    /// Entry holder's display name.
    pub a_name: String,
    /// Counterpart display name.
    pub b_name: String,
    /// Flags before the directive.
    pub before: EntryState,
    /// Flags after the directive.
    pub after: EntryState,
}

impl Announcement {
    /// Direction glyph for the post-transition state.
    pub fn direction(&self) -> DirectionSymbol {
        DirectionSymbol::from_state(self.after)
    }

    /// Build one announcement per side of the report that changed.
    pub fn from_report(report: &SyncReport) -> Vec<Announcement> {
        [&report.a, &report.b]
            .into_iter()
            .filter_map(|side| {
                side.outcome.transition().map(|(before, after)| Announcement {
                    a_name: side.name.clone(),
                    b_name: side.counterpart.clone(),
                    before,
                    after,
                })
            })
            .collect()
    }
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} (have {} -> {}, has {} -> {})",
            self.a_name,
            self.direction(),
            self.b_name,
            self.before.have,
            self.after.have,
            self.before.has,
            self.after.has,
        )
    }
}

/// Where announcements go. The chat surface is an external collaborator;
/// implementations adapt this seam to it.
pub trait AnnouncementSink: Send + Sync {
    fn publish(&self, announcement: &Announcement);
}

/// Sink that writes announcements to the structured log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AnnouncementSink for LogSink {
    fn publish(&self, announcement: &Announcement) {
        info!(%announcement, "influence changed");
    }
}
