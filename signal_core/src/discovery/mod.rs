//! Discovery and decode bookkeeping.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use signal_rules::{SignalCatalog, SignalDefinition, SignalId};

/// What the player has learned about one signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryState {
    pub signal_id: SignalId,
    /// Session clock tick of the first detection.
    pub discovered_at: u64,
    pub is_decoded: bool,
    pub decoded_at: Option<u64>,
}

impl DiscoveryState {
    pub fn new(signal_id: SignalId, discovered_at: u64) -> Self {
        Self {
            signal_id,
            discovered_at,
            is_decoded: false,
            decoded_at: None,
        }
    }
}

/// Owns every `DiscoveryState`, keyed by signal id, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryTracker {
    order: Vec<SignalId>,
    states: HashMap<SignalId, DiscoveryState>,
}

impl DiscoveryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a first detection. Returns `false` if the signal was already known.
    pub fn discover(&mut self, signal_id: SignalId, at: u64) -> bool {
        if self.states.contains_key(&signal_id) {
            return false;
        }

        info!(
            target: "signal_core::discovery",
            signal = %signal_id,
            at,
            "signal.discovered"
        );
        self.order.push(signal_id.clone());
        self.states
            .insert(signal_id.clone(), DiscoveryState::new(signal_id, at));
        true
    }

    /// Mark a signal decoded.
    ///
    /// Returns `false` and changes nothing when the catalog does not know the
    /// signal or it is already decoded. A known signal that was never detected
    /// is recorded as discovered at the same tick.
    pub fn decode(&mut self, catalog: &SignalCatalog, signal_id: &SignalId, at: u64) -> bool {
        if !catalog.contains(signal_id) || self.is_decoded(signal_id) {
            return false;
        }

        self.discover(signal_id.clone(), at);
        let Some(state) = self.states.get_mut(signal_id) else {
            return false;
        };
        state.is_decoded = true;
        state.decoded_at = Some(at);

        info!(
            target: "signal_core::discovery",
            signal = %signal_id,
            at,
            "signal.decoded"
        );
        true
    }

    pub fn is_discovered(&self, signal_id: &SignalId) -> bool {
        self.states.contains_key(signal_id)
    }

    pub fn is_decoded(&self, signal_id: &SignalId) -> bool {
        self.states
            .get(signal_id)
            .is_some_and(|state| state.is_decoded)
    }

    pub fn state(&self, signal_id: &SignalId) -> Option<&DiscoveryState> {
        self.states.get(signal_id)
    }

    /// Definitions of every discovered signal the catalog still knows.
    pub fn discovered_signals<'a>(
        &'a self,
        catalog: &'a SignalCatalog,
    ) -> impl Iterator<Item = &'a SignalDefinition> + 'a {
        self.order.iter().filter_map(move |id| catalog.get(id))
    }

    /// All states in discovery order.
    pub fn states(&self) -> impl Iterator<Item = &DiscoveryState> {
        self.order.iter().filter_map(|id| self.states.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Replace all bookkeeping with saved states. Later duplicates win.
    pub fn restore(&mut self, states: impl IntoIterator<Item = DiscoveryState>) {
        self.order.clear();
        self.states.clear();
        for state in states {
            if !self.states.contains_key(&state.signal_id) {
                self.order.push(state.signal_id.clone());
            }
            self.states.insert(state.signal_id.clone(), state);
        }
    }
}
