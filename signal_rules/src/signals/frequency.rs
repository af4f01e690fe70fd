//! The tunable band and the background static across it.

use serde::{Deserialize, Serialize};

use super::CatalogError;

/// Inclusive range of frequencies the dial can reach.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    pub min: f32,
    pub max: f32,
}

impl Default for FrequencyBand {
    fn default() -> Self {
        Self {
            min: 85.0,
            max: 165.0,
        }
    }
}

impl FrequencyBand {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, frequency: f32) -> bool {
        (self.min..=self.max).contains(&frequency)
    }

    /// Pull `frequency` into the band. Never panics, even on a broken band;
    /// a NaN frequency lands on `min`.
    pub fn clamp(&self, frequency: f32) -> f32 {
        frequency.max(self.min).min(self.max)
    }

    /// Both ends finite and `min <= max`.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.min.is_finite() && self.max.is_finite() && self.min <= self.max {
            return Ok(());
        }
        Err(CatalogError::InvalidBand {
            min: self.min,
            max: self.max,
        })
    }
}

/// Shape of the static heard when nothing is tuned in.
///
/// Background static is `base + (sin(f * 0.5) * swing + 0.5) * scale`, which
/// gives the dial quiet stretches and noisy stretches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticProfile {
    pub base: f32,
    pub swing: f32,
    pub scale: f32,
}

impl Default for StaticProfile {
    fn default() -> Self {
        Self {
            base: 0.3,
            swing: 0.3,
            scale: 0.7,
        }
    }
}

impl StaticProfile {
    /// Static level with no signal tuned in.
    pub fn background(&self, frequency: f32) -> f32 {
        let noise_factor = (frequency * 0.5).sin() * self.swing + 0.5;
        self.base + noise_factor * self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_clamp() {
        let band = FrequencyBand::new(88.0, 108.0);
        assert_eq!(band.clamp(80.0), 88.0);
        assert_eq!(band.clamp(120.0), 108.0);
        assert_eq!(band.clamp(95.5), 95.5);
        assert!(band.contains(88.0));
        assert!(band.contains(108.0));
        assert!(!band.contains(108.1));
    }

    #[test]
    fn test_band_clamp_nan_lands_on_min() {
        assert_eq!(FrequencyBand::new(88.0, 108.0).clamp(f32::NAN), 88.0);
    }

    #[test]
    fn test_band_validate() {
        assert!(FrequencyBand::default().validate().is_ok());
        assert!(FrequencyBand::new(100.0, 100.0).validate().is_ok());
        assert_eq!(
            FrequencyBand::new(165.0, 85.0).validate(),
            Err(CatalogError::InvalidBand {
                min: 165.0,
                max: 85.0
            })
        );
        assert!(FrequencyBand::new(f32::NAN, 165.0).validate().is_err());
        assert!(FrequencyBand::new(85.0, f32::INFINITY).validate().is_err());

        // A broken band still clamps without panicking.
        assert_eq!(FrequencyBand::new(165.0, 85.0).clamp(100.0), 85.0);
    }

    #[test]
    fn test_background_static_stays_in_profile_range() {
        let profile = StaticProfile::default();
        for step in 0..800 {
            let frequency = 85.0 + step as f32 * 0.1;
            let level = profile.background(frequency);
            // base + (0.5 +/- swing) * scale
            assert!(level >= 0.3 + 0.2 * 0.7 - 1e-4);
            assert!(level <= 0.3 + 0.8 * 0.7 + 1e-4);
        }
    }
}
