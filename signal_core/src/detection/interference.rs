//! Static and environmental interference on the dial.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use signal_rules::{SignalDefinition, StaticProfile};

/// Named interference sources, each contributing an amount in [0, 1].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterferenceField {
    sources: BTreeMap<String, f32>,
}

impl InterferenceField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a source. The amount is clamped to [0, 1].
    ///
    /// Returns `false` and changes nothing for a NaN amount.
    pub fn add(&mut self, source: impl Into<String>, amount: f32) -> bool {
        if amount.is_nan() {
            return false;
        }
        self.sources.insert(source.into(), amount.clamp(0.0, 1.0));
        true
    }

    /// Remove a source. Returns `false` if it was not present.
    pub fn remove(&mut self, source: &str) -> bool {
        self.sources.remove(source).is_some()
    }

    /// Sum of all sources, clamped to [0, 1].
    pub fn total(&self) -> f32 {
        self.sources.values().sum::<f32>().min(1.0)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Static heard with `current` tuned in at `strength`, or background static
/// at `frequency` when nothing is, plus interference. Clamped to [0, 1].
pub fn static_intensity(
    profile: &StaticProfile,
    frequency: f32,
    current: Option<(&SignalDefinition, f32)>,
    interference: &InterferenceField,
) -> f32 {
    let base = match current {
        Some((signal, strength)) => {
            let missing = 1.0 - strength.clamp(0.0, 1.0);
            if signal.is_static {
                missing
            } else {
                missing * 0.5
            }
        }
        None => profile.background(frequency),
    };
    // A NaN level reads as silence.
    (base + interference.total()).max(0.0).min(1.0)
}
