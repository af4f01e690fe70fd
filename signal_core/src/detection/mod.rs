//! Signal detection - what the player hears at the tuned frequency.
//!
//! A scan walks the whole catalog:
//! 1. **Proximity**: linear falloff from the signal centre to its bandwidth edge
//! 2. **Boost**: multiply by the equipment boost (not clamped to 1.0)
//! 3. **Gate**: threshold, hidden-ness, story progress and required item
//! 4. **Selection**: the strongest eligible signal becomes current; on a tie the
//!    earlier catalog entry wins
//! 5. **Report**: eligible signals not yet in the tracker are newly discovered,
//!    and a current signal that vanished without replacement is lost

mod interference;

pub use interference::*;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::discovery::DiscoveryTracker;
use signal_rules::{
    EquipmentEffect, Inventory, SignalCatalog, SignalDefinition, SignalId, StaticProfile,
};

/// Outcome of one scan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionResult {
    pub current_signal_id: Option<SignalId>,
    /// Post-boost strength of the current signal; 0.0 when there is none.
    pub current_strength: f32,
    pub newly_discovered: Vec<SignalId>,
    pub lost: Option<SignalId>,
    pub static_level: f32,
}

/// Post-boost strength of `signal` at `frequency`.
pub fn signal_strength(signal: &SignalDefinition, frequency: f32, effect: &EquipmentEffect) -> f32 {
    signal.raw_strength(frequency) * effect.signal_boost
}

/// Whether a signal heard at `strength` can be detected at all.
pub fn is_eligible(
    signal: &SignalDefinition,
    strength: f32,
    effect: &EquipmentEffect,
    story_progress: u32,
    inventory: &Inventory,
) -> bool {
    // NaN strength fails the threshold.
    if strength.is_nan() || strength < signal.min_signal_strength {
        return false;
    }
    if signal.is_hidden && !effect.can_detect_hidden_signals {
        return false;
    }
    signal.is_unlocked(story_progress, inventory)
}

/// Inputs for a scan other than the catalog and tracker.
#[derive(Debug, Clone, Copy)]
pub struct ScanInput<'a> {
    pub frequency: f32,
    pub effect: &'a EquipmentEffect,
    pub story_progress: u32,
    pub inventory: &'a Inventory,
}

/// Tracks the current signal between scans.
#[derive(Debug, Clone, Default)]
pub struct SignalDetector {
    static_profile: StaticProfile,
    interference: InterferenceField,
    current: Option<SignalId>,
    current_strength: f32,
    static_level: f32,
}

impl SignalDetector {
    pub fn new(static_profile: StaticProfile) -> Self {
        Self {
            static_profile,
            ..Self::default()
        }
    }

    /// Rescan the catalog at the tuned frequency.
    pub fn scan(
        &mut self,
        catalog: &SignalCatalog,
        tracker: &DiscoveryTracker,
        input: ScanInput<'_>,
    ) -> DetectionResult {
        let previous = self.current.take();
        let mut best: Option<(&SignalDefinition, f32)> = None;
        let mut newly_discovered = Vec::new();

        for signal in catalog.all() {
            let strength = signal_strength(signal, input.frequency, input.effect);
            if !is_eligible(
                signal,
                strength,
                input.effect,
                input.story_progress,
                input.inventory,
            ) {
                continue;
            }

            if best.map_or(true, |(_, best_strength)| strength > best_strength) {
                best = Some((signal, strength));
            }

            if !tracker.is_discovered(&signal.id) {
                newly_discovered.push(signal.id.clone());
            }
        }

        self.current = best.map(|(signal, _)| signal.id.clone());
        self.current_strength = best.map_or(0.0, |(_, strength)| strength);
        self.static_level = static_intensity(
            &self.static_profile,
            input.frequency,
            best,
            &self.interference,
        );

        let lost = match (&previous, &self.current) {
            (Some(previous), None) => Some(previous.clone()),
            _ => None,
        };

        debug!(
            target: "signal_core::detector",
            frequency = input.frequency,
            boost = input.effect.signal_boost,
            current = ?self.current,
            strength = self.current_strength,
            discovered = newly_discovered.len(),
            "detector.scan"
        );

        DetectionResult {
            current_signal_id: self.current.clone(),
            current_strength: self.current_strength,
            newly_discovered,
            lost,
            static_level: self.static_level,
        }
    }

    /// Drop the current signal, as when the radio is switched off.
    ///
    /// Returns the signal that was current, if any.
    pub fn clear(&mut self) -> Option<SignalId> {
        self.current_strength = 0.0;
        self.static_level = 0.0;
        self.current.take()
    }

    pub fn current_signal(&self) -> Option<&SignalId> {
        self.current.as_ref()
    }

    pub fn current_strength(&self) -> f32 {
        self.current_strength
    }

    pub fn static_level(&self) -> f32 {
        self.static_level
    }

    pub fn interference(&self) -> &InterferenceField {
        &self.interference
    }

    pub fn interference_mut(&mut self) -> &mut InterferenceField {
        &mut self.interference
    }
}
