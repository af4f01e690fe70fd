//! Narrative thread definitions - groups of signals that tell one story arc.

use serde::{Deserialize, Serialize};

use crate::ids::{SignalId, ThreadId};
use crate::signals::SignalCatalog;

/// An ordered group of signals. Membership is fixed once the session starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeThread {
    pub id: ThreadId,
    pub name: String,
    #[serde(default)]
    pub description: String,

    /// Member signals in story order. Left empty in the signal pack, members are
    /// gathered from catalog entries that name this thread.
    #[serde(default)]
    pub members: Vec<SignalId>,

    #[serde(default)]
    pub is_main_story: bool,
}

impl NarrativeThread {
    pub fn new(id: impl Into<ThreadId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            members: Vec::new(),
            is_main_story: false,
        }
    }

    pub fn with_members(mut self, members: impl IntoIterator<Item = impl Into<SignalId>>) -> Self {
        self.members = members.into_iter().map(Into::into).collect();
        self
    }

    pub fn main_story(mut self) -> Self {
        self.is_main_story = true;
        self
    }

    pub fn contains(&self, signal: &SignalId) -> bool {
        self.members.contains(signal)
    }

    /// Fill `members` from catalog entries tagged with this thread.
    ///
    /// Sequenced entries come first in ascending sequence; unordered entries
    /// (sequence 0) follow in registration order.
    pub fn collect_members(&mut self, catalog: &SignalCatalog) {
        let mut tagged: Vec<(usize, u32, SignalId)> = catalog
            .all()
            .enumerate()
            .filter(|(_, signal)| signal.narrative_thread_id.as_ref() == Some(&self.id))
            .map(|(position, signal)| (position, signal.narrative_sequence, signal.id.clone()))
            .collect();

        tagged.sort_by_key(|(position, sequence, _)| match sequence {
            0 => (1, 0, *position),
            n => (0, *n, *position),
        });

        self.members = tagged.into_iter().map(|(_, _, id)| id).collect();
    }
}
