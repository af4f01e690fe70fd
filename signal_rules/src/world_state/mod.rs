//! World facts - the quest, location and inventory state pushed in by the host.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::ids::{ItemId, LocationId, QuestId};

/// The set of items the player currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Inventory(BTreeSet<ItemId>);

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item. Returns `false` if it was already held.
    pub fn insert(&mut self, item: ItemId) -> bool {
        self.0.insert(item)
    }

    /// Remove an item. Returns `false` if it was not held.
    pub fn remove(&mut self, item: &ItemId) -> bool {
        self.0.remove(item)
    }

    pub fn contains(&self, item: &ItemId) -> bool {
        self.0.contains(item)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ItemId> for Inventory {
    fn from_iter<I: IntoIterator<Item = ItemId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Everything outside the radio that progression depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WorldFacts {
    pub inventory: Inventory,

    pub completed_quests: BTreeSet<QuestId>,

    /// Quests handed to the player but not yet completed.
    pub active_quests: BTreeSet<QuestId>,

    pub discovered_locations: BTreeSet<LocationId>,

    pub current_location: Option<LocationId>,

    /// Centre frequencies of every signal discovered so far, in discovery order.
    pub discovered_frequencies: Vec<f32>,
}

impl WorldFacts {
    /// Create an empty set of facts.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_quest_completed(&self, quest: &QuestId) -> bool {
        self.completed_quests.contains(quest)
    }

    pub fn is_location_discovered(&self, location: &LocationId) -> bool {
        self.discovered_locations.contains(location)
    }

    pub fn has_item(&self, item: &ItemId) -> bool {
        self.inventory.contains(item)
    }

    pub fn has_discovered_frequency(&self) -> bool {
        !self.discovered_frequencies.is_empty()
    }

    /// Mark a quest completed. Returns `false` if it already was.
    pub fn complete_quest(&mut self, quest: QuestId) -> bool {
        self.active_quests.remove(&quest);
        self.completed_quests.insert(quest)
    }

    /// Hand a quest to the player. Completed quests are not reactivated.
    pub fn activate_quest(&mut self, quest: QuestId) -> bool {
        if self.completed_quests.contains(&quest) {
            return false;
        }
        self.active_quests.insert(quest)
    }

    /// Mark a location discovered. Returns `false` if it already was.
    pub fn discover_location(&mut self, location: LocationId) -> bool {
        self.discovered_locations.insert(location)
    }

    /// Record a discovered frequency. Returns `false` for a repeat.
    pub fn add_discovered_frequency(&mut self, frequency: f32) -> bool {
        if self.discovered_frequencies.contains(&frequency) {
            return false;
        }
        self.discovered_frequencies.push(frequency);
        true
    }
}
