//! Signal catalog - the registry of every signal that can be heard.

use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

use super::{FrequencyBand, SignalDefinition};
use crate::ids::SignalId;

/// A band or definition that breaks the catalog invariants.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("tunable band {min}-{max} must be finite with min <= max")]
    InvalidBand { min: f32, max: f32 },
    #[error("signal {id} has non-positive bandwidth {bandwidth}")]
    InvalidBandwidth { id: SignalId, bandwidth: f32 },
    #[error("signal {id} has detection threshold {min_signal_strength} outside [0, 1]")]
    InvalidMinStrength {
        id: SignalId,
        min_signal_strength: f32,
    },
    #[error("signal {id} at {frequency} MHz lies outside the tunable band {min}-{max}")]
    OutOfBand {
        id: SignalId,
        frequency: f32,
        min: f32,
        max: f32,
    },
}

/// Registry of signal definitions, iterated in registration order.
///
/// Re-registering an id replaces the definition in place, so its position in
/// iteration order is kept.
#[derive(Debug, Clone, Default)]
pub struct SignalCatalog {
    band: FrequencyBand,
    order: Vec<SignalId>,
    signals: HashMap<SignalId, SignalDefinition>,
}

impl SignalCatalog {
    /// Create an empty catalog over `band`.
    pub fn new(band: FrequencyBand) -> Self {
        Self {
            band,
            order: Vec::new(),
            signals: HashMap::new(),
        }
    }

    /// Build a catalog from a list of definitions, stopping at an invalid band
    /// or the first invalid definition.
    pub fn from_definitions(
        band: FrequencyBand,
        definitions: impl IntoIterator<Item = SignalDefinition>,
    ) -> Result<Self, CatalogError> {
        band.validate()?;
        let mut catalog = Self::new(band);
        for definition in definitions {
            catalog.register(definition)?;
        }
        Ok(catalog)
    }

    /// Insert a definition, replacing any previous one with the same id.
    ///
    /// Returns the replaced definition, if any.
    pub fn register(
        &mut self,
        signal: SignalDefinition,
    ) -> Result<Option<SignalDefinition>, CatalogError> {
        signal.validate(&self.band)?;

        let id = signal.id.clone();
        let previous = self.signals.insert(id.clone(), signal);
        if previous.is_some() {
            warn!(
                target: "signal_rules::catalog",
                signal = %id,
                "signal.replaced"
            );
        } else {
            self.order.push(id);
        }
        Ok(previous)
    }

    /// Get a definition by id.
    pub fn get(&self, id: &SignalId) -> Option<&SignalDefinition> {
        self.signals.get(id)
    }

    pub fn contains(&self, id: &SignalId) -> bool {
        self.signals.contains_key(id)
    }

    /// All definitions in registration order.
    pub fn all(&self) -> impl Iterator<Item = &SignalDefinition> {
        self.order.iter().filter_map(|id| self.signals.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn band(&self) -> &FrequencyBand {
        &self.band
    }
}
