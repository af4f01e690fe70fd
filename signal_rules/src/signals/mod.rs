//! Signal definitions - the immutable catalog entries a player can tune into.

mod catalog;
mod content;
mod frequency;

pub use catalog::*;
pub use content::*;
pub use frequency::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::{ItemId, LocationId, SignalId, ThreadId};
use crate::world_state::Inventory;

/// Default half-width of the detection window.
pub const DEFAULT_BANDWIDTH: f32 = 0.3;

/// Default detection threshold.
pub const DEFAULT_MIN_SIGNAL_STRENGTH: f32 = 0.5;

/// How a signal's content is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ContentType {
    #[default]
    Voice,
    Morse,
    Data,
}

/// A single broadcast in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalDefinition {
    pub id: SignalId,
    pub name: String,
    #[serde(default)]
    pub description: String,

    /// Centre of the broadcast, in MHz.
    pub frequency: f32,

    /// Half-width of the window around `frequency` in which anything is heard.
    #[serde(default = "default_bandwidth")]
    pub bandwidth: f32,

    /// Detection threshold in [0, 1], compared against post-boost strength.
    #[serde(default = "default_min_signal_strength")]
    pub min_signal_strength: f32,

    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub encoded_content: String,
    #[serde(default)]
    pub decoded_content: String,

    /// Only heard with equipment that can detect hidden signals.
    #[serde(default)]
    pub is_hidden: bool,

    /// Always broadcasting, as opposed to a one-shot transmission.
    #[serde(default)]
    pub is_static: bool,

    #[serde(default)]
    pub story_progress_required: u32,
    #[serde(default)]
    pub required_item_to_unlock: Option<ItemId>,

    #[serde(default)]
    pub narrative_thread_id: Option<ThreadId>,
    /// Position within the thread; 0 means unordered.
    #[serde(default)]
    pub narrative_sequence: u32,

    #[serde(default)]
    pub location_id: Option<LocationId>,

    /// Presentation data the core carries but never reads (audio clips, images).
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

fn default_bandwidth() -> f32 {
    DEFAULT_BANDWIDTH
}

fn default_min_signal_strength() -> f32 {
    DEFAULT_MIN_SIGNAL_STRENGTH
}

impl SignalDefinition {
    /// Create a new signal with default bandwidth and threshold.
    pub fn new(id: impl Into<SignalId>, name: impl Into<String>, frequency: f32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            frequency,
            bandwidth: DEFAULT_BANDWIDTH,
            min_signal_strength: DEFAULT_MIN_SIGNAL_STRENGTH,
            content_type: ContentType::Voice,
            encoded_content: String::new(),
            decoded_content: String::new(),
            is_hidden: false,
            is_static: false,
            story_progress_required: 0,
            required_item_to_unlock: None,
            narrative_thread_id: None,
            narrative_sequence: 0,
            location_id: None,
            extra: HashMap::new(),
        }
    }

    pub fn with_bandwidth(mut self, bandwidth: f32) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    pub fn with_min_strength(mut self, min_signal_strength: f32) -> Self {
        self.min_signal_strength = min_signal_strength;
        self
    }

    pub fn with_content(
        mut self,
        content_type: ContentType,
        encoded: impl Into<String>,
        decoded: impl Into<String>,
    ) -> Self {
        self.content_type = content_type;
        self.encoded_content = encoded.into();
        self.decoded_content = decoded.into();
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.is_hidden = hidden;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_story_progress(mut self, required: u32) -> Self {
        self.story_progress_required = required;
        self
    }

    pub fn with_required_item(mut self, item: impl Into<ItemId>) -> Self {
        self.required_item_to_unlock = Some(item.into());
        self
    }

    /// Place this signal in a narrative thread at `sequence` (0 = unordered).
    pub fn in_thread(mut self, thread: impl Into<ThreadId>, sequence: u32) -> Self {
        self.narrative_thread_id = Some(thread.into());
        self.narrative_sequence = sequence;
        self
    }

    pub fn with_location(mut self, location: impl Into<LocationId>) -> Self {
        self.location_id = Some(location.into());
        self
    }

    /// Pre-boost strength at `frequency`: 1.0 on the centre, falling linearly
    /// to 0.0 at the bandwidth edge and 0.0 beyond it. A NaN frequency is out of range.
    pub fn raw_strength(&self, frequency: f32) -> f32 {
        let distance = (frequency - self.frequency).abs();
        if distance.is_nan() || distance > self.bandwidth {
            return 0.0;
        }
        1.0 - distance / self.bandwidth
    }

    /// Story and item gates. Strength and hidden-ness are checked by the detector.
    pub fn is_unlocked(&self, story_progress: u32, inventory: &Inventory) -> bool {
        if story_progress < self.story_progress_required {
            return false;
        }
        match &self.required_item_to_unlock {
            Some(item) => inventory.contains(item),
            None => true,
        }
    }

    /// Check the catalog invariants against `band`.
    pub fn validate(&self, band: &FrequencyBand) -> Result<(), CatalogError> {
        if !self.bandwidth.is_finite() || self.bandwidth <= 0.0 {
            return Err(CatalogError::InvalidBandwidth {
                id: self.id.clone(),
                bandwidth: self.bandwidth,
            });
        }
        if !(0.0..=1.0).contains(&self.min_signal_strength) {
            return Err(CatalogError::InvalidMinStrength {
                id: self.id.clone(),
                min_signal_strength: self.min_signal_strength,
            });
        }
        if !band.contains(self.frequency) {
            return Err(CatalogError::OutOfBand {
                id: self.id.clone(),
                frequency: self.frequency,
                min: band.min,
                max: band.max,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_strength_peaks_on_centre() {
        let signal = SignalDefinition::new("s", "S", 91.5);
        assert_eq!(signal.raw_strength(91.5), 1.0);
    }

    #[test]
    fn test_raw_strength_linear_falloff() {
        let signal = SignalDefinition::new("s", "S", 100.0).with_bandwidth(0.4);
        assert!((signal.raw_strength(100.1) - 0.75).abs() < 1e-4);
        assert!((signal.raw_strength(99.8) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_raw_strength_zero_outside_bandwidth() {
        let signal = SignalDefinition::new("s", "S", 91.5).with_bandwidth(0.3);
        assert_eq!(signal.raw_strength(91.9), 0.0);
        assert_eq!(signal.raw_strength(90.0), 0.0);
    }

    #[test]
    fn test_raw_strength_zero_for_non_finite_tuning() {
        let signal = SignalDefinition::new("s", "S", 91.5);
        assert_eq!(signal.raw_strength(f32::NAN), 0.0);
        assert_eq!(signal.raw_strength(f32::INFINITY), 0.0);
    }

    #[test]
    fn test_unlock_gates() {
        let signal = SignalDefinition::new("s", "S", 120.0)
            .with_story_progress(5)
            .with_required_item("military_badge");

        let mut inventory = Inventory::new();
        assert!(!signal.is_unlocked(5, &inventory));

        inventory.insert(ItemId::from("military_badge"));
        assert!(!signal.is_unlocked(3, &inventory));
        assert!(signal.is_unlocked(5, &inventory));
    }

    #[test]
    fn test_validate_rejects_broken_definitions() {
        let band = FrequencyBand::default();

        let zero_width = SignalDefinition::new("a", "A", 100.0).with_bandwidth(0.0);
        assert!(matches!(
            zero_width.validate(&band),
            Err(CatalogError::InvalidBandwidth { .. })
        ));

        let loud = SignalDefinition::new("b", "B", 100.0).with_min_strength(1.5);
        assert!(matches!(
            loud.validate(&band),
            Err(CatalogError::InvalidMinStrength { .. })
        ));

        let far = SignalDefinition::new("c", "C", 300.0);
        assert!(matches!(far.validate(&band), Err(CatalogError::OutOfBand { .. })));

        let endless = SignalDefinition::new("e", "E", 100.0).with_bandwidth(f32::INFINITY);
        assert!(matches!(
            endless.validate(&band),
            Err(CatalogError::InvalidBandwidth { .. })
        ));

        assert!(SignalDefinition::new("d", "D", 100.0).validate(&band).is_ok());
    }
}
