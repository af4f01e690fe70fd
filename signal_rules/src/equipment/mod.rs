//! Equipment effects - how held items change what the radio can pick up.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::ids::ItemId;
use crate::world_state::Inventory;

/// Reception modifiers granted by one item, or by a whole inventory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquipmentEffect {
    /// Multiplier applied to signal strength (>= 0).
    pub signal_boost: f32,
    pub can_detect_hidden_signals: bool,
}

impl Default for EquipmentEffect {
    fn default() -> Self {
        Self::neutral()
    }
}

impl EquipmentEffect {
    /// The effect of holding nothing useful.
    pub const fn neutral() -> Self {
        Self {
            signal_boost: 1.0,
            can_detect_hidden_signals: false,
        }
    }

    pub fn new(signal_boost: f32, can_detect_hidden_signals: bool) -> Self {
        Self {
            signal_boost,
            can_detect_hidden_signals,
        }
    }

    /// Stack two effects: boosts multiply, hidden detection is OR'd.
    pub fn combine(self, other: EquipmentEffect) -> EquipmentEffect {
        EquipmentEffect {
            signal_boost: self.signal_boost * other.signal_boost,
            can_detect_hidden_signals: self.can_detect_hidden_signals
                || other.can_detect_hidden_signals,
        }
    }
}

/// Item effect entry as written in the signal pack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectEntry {
    pub item: ItemId,
    pub signal_boost: f32,
    #[serde(default)]
    pub can_detect_hidden_signals: bool,
}

/// Derives the aggregate equipment effect from an inventory.
#[derive(Debug, Clone, Default)]
pub struct EquipmentEffectsResolver {
    table: HashMap<ItemId, EquipmentEffect>,
}

impl EquipmentEffectsResolver {
    /// Create a resolver with an empty effect table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver seeded with the stock radio equipment.
    pub fn with_defaults() -> Self {
        let mut resolver = Self::new();
        resolver.register_effect(ItemId::from("radio"), 1.0, false);
        resolver.register_effect(ItemId::from("radio_enhanced"), 2.0, false);
        resolver.register_effect(ItemId::from("strange_crystal"), 1.5, true);
        resolver
    }

    pub fn from_entries(entries: impl IntoIterator<Item = EffectEntry>) -> Self {
        let mut resolver = Self::new();
        for entry in entries {
            resolver.register_effect(
                entry.item,
                entry.signal_boost,
                entry.can_detect_hidden_signals,
            );
        }
        resolver
    }

    /// Add or replace the effect of an item. Negative boosts are clamped to 0.
    ///
    /// Returns `false` and leaves the table unchanged for a NaN or infinite boost.
    pub fn register_effect(
        &mut self,
        item: ItemId,
        signal_boost: f32,
        can_detect_hidden: bool,
    ) -> bool {
        if !signal_boost.is_finite() {
            warn!(
                target: "signal_rules::equipment",
                item = %item,
                signal_boost,
                "equipment.non_finite_boost_rejected"
            );
            return false;
        }
        let boost = if signal_boost < 0.0 {
            warn!(
                target: "signal_rules::equipment",
                item = %item,
                signal_boost,
                "equipment.negative_boost_clamped"
            );
            0.0
        } else {
            signal_boost
        };
        self.table
            .insert(item, EquipmentEffect::new(boost, can_detect_hidden));
        true
    }

    /// Effect of a single item, if it has one.
    pub fn effect_for(&self, item: &ItemId) -> Option<EquipmentEffect> {
        self.table.get(item).copied()
    }

    /// Aggregate effect of everything in `inventory`. Unknown items contribute nothing.
    pub fn resolve(&self, inventory: &Inventory) -> EquipmentEffect {
        inventory
            .iter()
            .filter_map(|item| self.table.get(item))
            .fold(EquipmentEffect::neutral(), |acc, effect| acc.combine(*effect))
    }
}
