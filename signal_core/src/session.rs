//! One radio, one player: the synchronous pipeline behind every host input.
//!
//! Each input runs to completion before returning:
//! equipment resolve -> detection -> discovery -> narrative -> progression.
//! Events are published on the session's `EventBus` in that order.

use rand::Rng;
use tracing::{debug, warn};

use crate::detection::{DetectionResult, ScanInput, SignalDetector};
use crate::discovery::DiscoveryTracker;
use crate::events::{EventBus, RadioEvent};
use crate::narrative::NarrativeProgressionEngine;
use crate::progression::GameProgressionManager;
use crate::snapshot::SessionSnapshot;
use signal_rules::{
    ConfigError, EquipmentEffect, EquipmentEffectsResolver, Inventory, ItemId, LocationId,
    NarrativeThread, ProgressionStage, QuestId, SignalCatalog, SignalDefinition, SignalId,
    SignalPack, ThreadId, WorldFacts,
};

/// Tuned frequency of a fresh session, before clamping into the band.
pub const DEFAULT_FREQUENCY: f32 = 90.0;

pub struct RadioSession {
    catalog: SignalCatalog,
    resolver: EquipmentEffectsResolver,
    detector: SignalDetector,
    tracker: DiscoveryTracker,
    narrative: NarrativeProgressionEngine,
    progression: GameProgressionManager,
    events: EventBus,
    facts: WorldFacts,
    frequency: f32,
    radio_on: bool,
    clock: u64,
}

impl RadioSession {
    /// Assemble a session from already-built components. The radio starts off.
    pub fn new(
        catalog: SignalCatalog,
        resolver: EquipmentEffectsResolver,
        detector: SignalDetector,
        narrative: NarrativeProgressionEngine,
        progression: GameProgressionManager,
    ) -> Self {
        let frequency = catalog.band().clamp(DEFAULT_FREQUENCY);
        Self {
            catalog,
            resolver,
            detector,
            tracker: DiscoveryTracker::new(),
            narrative,
            progression,
            events: EventBus::new(),
            facts: WorldFacts::new(),
            frequency,
            radio_on: false,
            clock: 0,
        }
    }

    pub fn from_pack(pack: &SignalPack) -> Result<Self, ConfigError> {
        let catalog = pack.build_catalog()?;
        let threads = pack.build_threads(&catalog);
        Ok(Self::new(
            catalog,
            pack.build_resolver(),
            SignalDetector::new(pack.static_profile),
            NarrativeProgressionEngine::new(threads),
            GameProgressionManager::new(pack.requirements(), pack.unlocks()),
        ))
    }

    /// Session over the signal pack compiled into the binary.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_pack(&SignalPack::builtin())
    }

    // ------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------

    /// Tune the dial. Returns the frequency actually tuned after clamping.
    ///
    /// A NaN or infinite frequency is ignored and the dial stays put.
    pub fn set_frequency(&mut self, frequency: f32) -> f32 {
        self.tick();
        if !frequency.is_finite() {
            warn!(
                target: "signal_core::detector",
                frequency,
                "tuning.non_finite_ignored"
            );
            return self.frequency;
        }
        self.frequency = self.catalog.band().clamp(frequency);
        self.rescan();
        self.frequency
    }

    /// Switching off drops the current signal and reports it lost.
    pub fn set_radio_power(&mut self, on: bool) {
        self.tick();
        if self.radio_on == on {
            return;
        }
        self.radio_on = on;

        if on {
            self.rescan();
        } else if let Some(signal_id) = self.detector.clear() {
            self.events.publish(RadioEvent::SignalLost { signal_id });
        }
    }

    pub fn set_inventory(&mut self, inventory: Inventory) {
        self.tick();
        self.facts.inventory = inventory;
        self.rescan();
        self.check_progression();
    }

    /// Returns `false` if the item was already held.
    pub fn add_item(&mut self, item: impl Into<ItemId>) -> bool {
        self.tick();
        if !self.facts.inventory.insert(item.into()) {
            return false;
        }
        self.rescan();
        self.check_progression();
        true
    }

    /// Returns `false` if the item was not held.
    pub fn remove_item(&mut self, item: impl Into<ItemId>) -> bool {
        self.tick();
        if !self.facts.inventory.remove(&item.into()) {
            return false;
        }
        self.rescan();
        true
    }

    /// Add or replace an equipment effect at runtime.
    ///
    /// Returns `false` for a NaN or infinite boost, which is not registered.
    pub fn register_effect(
        &mut self,
        item: impl Into<ItemId>,
        signal_boost: f32,
        can_detect_hidden: bool,
    ) -> bool {
        self.tick();
        if !self
            .resolver
            .register_effect(item.into(), signal_boost, can_detect_hidden)
        {
            return false;
        }
        self.rescan();
        true
    }

    /// Returns `false` if the quest was already completed.
    pub fn complete_quest(&mut self, quest: impl Into<QuestId>) -> bool {
        self.tick();
        if !self.facts.complete_quest(quest.into()) {
            return false;
        }
        self.check_progression();
        true
    }

    /// Returns `false` if the location was already discovered.
    pub fn discover_location(&mut self, location: impl Into<LocationId>) -> bool {
        self.tick();
        if !self.facts.discover_location(location.into()) {
            return false;
        }
        self.check_progression();
        true
    }

    pub fn set_location(&mut self, location: impl Into<LocationId>) {
        self.tick();
        self.facts.current_location = Some(location.into());
    }

    /// Host-driven progress value. Signals gated on progress are rescanned.
    pub fn set_game_progress(&mut self, progress: u32) {
        self.tick();
        self.progression.set_game_progress(progress);
        self.rescan();
    }

    /// Decode a signal the catalog knows.
    ///
    /// Returns `false` with no side effects for unknown or already decoded
    /// signals. Decoding a signal never heard also discovers it.
    pub fn decode_signal(&mut self, signal_id: &SignalId) -> bool {
        self.tick();
        let was_discovered = self.tracker.is_discovered(signal_id);
        if !self.tracker.decode(&self.catalog, signal_id, self.clock) {
            return false;
        }

        if !was_discovered {
            self.announce_discovery(signal_id);
        }
        self.events.publish(RadioEvent::SignalDecoded {
            signal_id: signal_id.clone(),
        });

        let update = self.narrative.on_signal_decoded(signal_id, &self.tracker);
        self.events.publish_all(update.events);
        if let Some(progress) = update.main_story_progress {
            self.progression.set_game_progress(progress);
        }

        if !was_discovered {
            self.check_progression();
        }
        true
    }

    /// Step the story forward unconditionally. `None` at `Endgame`.
    pub fn advance_stage(&mut self) -> Option<ProgressionStage> {
        self.tick();
        let stage = self.progression.advance()?;
        self.enter_stage(stage);
        Some(stage)
    }

    /// Jump to `stage`, handing out every unlock up to it.
    pub fn set_stage(&mut self, stage: ProgressionStage) {
        self.tick();
        let changed = self.progression.set_stage(stage);

        let unlocks: Vec<_> = self.progression.unlocks_through(stage).cloned().collect();
        for unlock in unlocks {
            self.apply_unlocks(unlock.locations, unlock.quests);
        }

        if changed {
            self.events
                .publish(RadioEvent::ProgressionStageChanged { stage });
        }
        self.rescan();
    }

    /// Returns `false` for a NaN amount, which is ignored.
    pub fn add_interference(&mut self, source: impl Into<String>, amount: f32) -> bool {
        self.tick();
        if !self.detector.interference_mut().add(source, amount) {
            return false;
        }
        self.rescan();
        true
    }

    /// Returns `false` if no such source was active.
    pub fn remove_interference(&mut self, source: &str) -> bool {
        self.tick();
        if !self.detector.interference_mut().remove(source) {
            return false;
        }
        self.rescan();
        true
    }

    /// Returns `false` for an unknown thread.
    pub fn set_active_thread(&mut self, thread_id: &ThreadId) -> bool {
        self.narrative.set_active_thread(thread_id)
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: FnMut(&RadioEvent) + 'static,
    {
        self.events.subscribe(subscriber);
    }

    pub fn pending_events(&self) -> &[RadioEvent] {
        self.events.pending()
    }

    pub fn drain_events(&mut self) -> Vec<RadioEvent> {
        self.events.drain()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn is_radio_on(&self) -> bool {
        self.radio_on
    }

    pub fn current_signal(&self) -> Option<&SignalDefinition> {
        self.detector
            .current_signal()
            .and_then(|id| self.catalog.get(id))
    }

    pub fn current_strength(&self) -> f32 {
        self.detector.current_strength()
    }

    pub fn static_level(&self) -> f32 {
        self.detector.static_level()
    }

    /// What the player reads off the current signal, if one is tuned in.
    pub fn current_content<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        let signal = self.current_signal()?;
        let decoded = self.tracker.is_decoded(&signal.id);
        Some(signal.display_content(self.current_strength(), decoded, rng))
    }

    /// Aggregate effect of everything currently held.
    pub fn equipment_effect(&self) -> EquipmentEffect {
        self.resolver.resolve(&self.facts.inventory)
    }

    pub fn is_discovered(&self, signal_id: &SignalId) -> bool {
        self.tracker.is_discovered(signal_id)
    }

    pub fn is_decoded(&self, signal_id: &SignalId) -> bool {
        self.tracker.is_decoded(signal_id)
    }

    pub fn discovered_signals(&self) -> impl Iterator<Item = &SignalDefinition> {
        self.tracker.discovered_signals(&self.catalog)
    }

    pub fn thread_progress(&self, thread_id: &ThreadId) -> f32 {
        self.narrative.thread_progress(thread_id, &self.tracker)
    }

    pub fn is_thread_complete(&self, thread_id: &ThreadId) -> bool {
        self.narrative.is_thread_complete(thread_id, &self.tracker)
    }

    pub fn next_signal_in_thread(&self, thread_id: &ThreadId) -> Option<&SignalId> {
        self.narrative.next_signal_in_thread(thread_id, &self.tracker)
    }

    pub fn discovered_threads(&self) -> impl Iterator<Item = &NarrativeThread> {
        self.narrative.discovered_threads()
    }

    pub fn active_thread(&self) -> Option<&NarrativeThread> {
        self.narrative.active_thread()
    }

    pub fn stage(&self) -> ProgressionStage {
        self.progression.stage()
    }

    pub fn game_progress(&self) -> u32 {
        self.progression.game_progress()
    }

    pub fn catalog(&self) -> &SignalCatalog {
        &self.catalog
    }

    pub fn tracker(&self) -> &DiscoveryTracker {
        &self.tracker
    }

    pub fn narrative(&self) -> &NarrativeProgressionEngine {
        &self.narrative
    }

    pub fn progression(&self) -> &GameProgressionManager {
        &self.progression
    }

    pub fn facts(&self) -> &WorldFacts {
        &self.facts
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    // ------------------------------------------------------------------
    // Save / load
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            frequency: self.frequency,
            radio_on: self.radio_on,
            discoveries: self.tracker.states().cloned().collect(),
            stage: self.progression.stage(),
            game_progress: self.progression.game_progress(),
            facts: self.facts.clone(),
            active_thread: self.narrative.active_thread().map(|thread| thread.id.clone()),
            clock: self.clock,
        }
    }

    /// Put the session back to a saved state. Publishes no events.
    pub fn restore(&mut self, snapshot: SessionSnapshot) {
        self.events.clear();
        self.detector.clear();

        self.tracker.restore(snapshot.discoveries);
        self.narrative.rebuild(&self.tracker);
        if let Some(thread_id) = &snapshot.active_thread {
            self.narrative.set_active_thread(thread_id);
        }
        self.progression
            .restore(snapshot.stage, snapshot.game_progress);
        self.facts = snapshot.facts;
        self.frequency = self.catalog.band().clamp(snapshot.frequency);
        self.radio_on = snapshot.radio_on;
        self.clock = snapshot.clock;

        if self.radio_on {
            self.rescan();
            self.events.clear();
        }
    }

    // ------------------------------------------------------------------
    // Pipeline
    // ------------------------------------------------------------------

    fn tick(&mut self) {
        self.clock += 1;
    }

    fn rescan(&mut self) {
        if !self.radio_on {
            return;
        }

        let previous = self.detector.current_signal().cloned();
        let previous_strength = self.detector.current_strength();

        let effect = self.resolver.resolve(&self.facts.inventory);
        let result = self.detector.scan(
            &self.catalog,
            &self.tracker,
            ScanInput {
                frequency: self.frequency,
                effect: &effect,
                story_progress: self.progression.game_progress(),
                inventory: &self.facts.inventory,
            },
        );

        let found_new = self.record_discoveries(&result);

        if let Some(signal_id) = result.lost {
            self.events.publish(RadioEvent::SignalLost { signal_id });
        }

        if let Some(signal_id) = result.current_signal_id {
            let moved = previous.as_ref() != Some(&signal_id)
                || previous_strength != result.current_strength;
            if moved {
                self.events.publish(RadioEvent::SignalStrengthChanged {
                    signal_id,
                    strength: result.current_strength,
                });
            }
        }

        if found_new {
            self.check_progression();
        }
    }

    /// Returns `true` if anything was newly discovered.
    fn record_discoveries(&mut self, result: &DetectionResult) -> bool {
        let mut found_new = false;
        for signal_id in &result.newly_discovered {
            if self.tracker.discover(signal_id.clone(), self.clock) {
                self.announce_discovery(signal_id);
                found_new = true;
            }
        }
        found_new
    }

    fn announce_discovery(&mut self, signal_id: &SignalId) {
        if let Some(signal) = self.catalog.get(signal_id) {
            self.facts.add_discovered_frequency(signal.frequency);
        }
        self.events.publish(RadioEvent::SignalDiscovered {
            signal_id: signal_id.clone(),
        });
        let thread_events = self.narrative.on_signal_discovered(signal_id);
        self.events.publish_all(thread_events);
    }

    fn check_progression(&mut self) {
        if let Some(stage) = self.progression.check_requirements(&self.facts) {
            self.enter_stage(stage);
        }
    }

    fn enter_stage(&mut self, stage: ProgressionStage) {
        self.events
            .publish(RadioEvent::ProgressionStageChanged { stage });
        if let Some(unlocks) = self.progression.unlocks_for(stage).cloned() {
            self.apply_unlocks(unlocks.locations, unlocks.quests);
        }
    }

    fn apply_unlocks(&mut self, locations: Vec<LocationId>, quests: Vec<QuestId>) {
        for location in locations {
            if self.facts.discover_location(location.clone()) {
                debug!(
                    target: "signal_core::progression",
                    location = %location,
                    "unlock.location"
                );
            }
        }
        for quest in quests {
            if self.facts.activate_quest(quest.clone()) {
                debug!(
                    target: "signal_core::progression",
                    quest = %quest,
                    "unlock.quest"
                );
            }
        }
    }
}

impl std::fmt::Debug for RadioSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadioSession")
            .field("frequency", &self.frequency)
            .field("radio_on", &self.radio_on)
            .field("current", &self.detector.current_signal())
            .field("stage", &self.progression.stage())
            .field("clock", &self.clock)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session() -> RadioSession {
        RadioSession::builtin().unwrap()
    }

    #[test]
    fn test_new_session_starts_quiet() {
        let session = session();
        assert!(!session.is_radio_on());
        assert_eq!(session.frequency(), DEFAULT_FREQUENCY);
        assert_eq!(session.stage(), ProgressionStage::Beginning);
        assert!(session.current_signal().is_none());
        assert!(session.pending_events().is_empty());
    }

    #[test]
    fn test_frequency_is_clamped_into_band() {
        let mut session = session();
        assert_eq!(session.set_frequency(10.0), 85.0);
        assert_eq!(session.set_frequency(500.0), 165.0);
    }

    #[test]
    fn test_radio_off_hears_nothing() {
        let mut session = session();
        session.set_frequency(121.5);
        assert!(session.current_signal().is_none());
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_tuning_in_publishes_discovery_chain() {
        let mut session = session();
        session.set_radio_power(true);
        session.set_frequency(121.5);

        let names: Vec<&str> = session.drain_events().iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec![
                "signalDiscovered",
                "narrativeThreadDiscovered",
                "signalStrengthChanged",
            ]
        );
        assert_eq!(session.current_signal().unwrap().id.as_str(), "emergency_broadcast");
        assert!(session.facts().has_discovered_frequency());
    }

    #[test]
    fn test_power_off_loses_current_signal() {
        let mut session = session();
        session.set_radio_power(true);
        session.set_frequency(121.5);
        session.drain_events();

        session.set_radio_power(false);
        assert_eq!(
            session.drain_events(),
            vec![RadioEvent::SignalLost {
                signal_id: SignalId::from("emergency_broadcast")
            }]
        );
        assert_eq!(session.static_level(), 0.0);
    }

    #[test]
    fn test_retuning_same_signal_stays_silent() {
        let mut session = session();
        session.set_radio_power(true);
        session.set_frequency(121.5);
        session.drain_events();

        session.set_frequency(121.5);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_subscriber_sees_events() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut session = session();
        session.subscribe(move |event| sink.borrow_mut().push(event.name()));
        session.set_radio_power(true);
        session.set_frequency(121.5);

        assert!(seen.borrow().contains(&"signalDiscovered"));
    }

    #[test]
    fn test_stage_unlocks_are_applied() {
        let mut session = session();
        session.complete_quest("quest_radio_repair");
        assert_eq!(session.stage(), ProgressionStage::RadioRepair);
        assert!(session
            .facts()
            .active_quests
            .contains(&QuestId::from("quest_find_signal")));
    }

    #[test]
    fn test_set_stage_reapplies_earlier_unlocks() {
        let mut session = session();
        session.set_stage(ProgressionStage::ForestExploration);

        for location in ["forest", "cabin", "lake", "road"] {
            assert!(session
                .facts()
                .is_location_discovered(&LocationId::from(location)));
        }
        assert_eq!(session.game_progress(), 3);
        assert_eq!(
            session.drain_events(),
            vec![RadioEvent::ProgressionStageChanged {
                stage: ProgressionStage::ForestExploration
            }]
        );
    }

    #[test]
    fn test_current_content_needs_decode() {
        let mut session = session();
        let mut rng = StdRng::seed_from_u64(7);
        session.set_radio_power(true);
        session.set_frequency(121.5);

        assert_eq!(
            session.current_content(&mut rng).as_deref(),
            Some(signal_rules::ENCRYPTED_PLACEHOLDER)
        );

        assert!(session.decode_signal(&SignalId::from("emergency_broadcast")));
        let content = session.current_content(&mut rng).unwrap();
        assert_eq!(
            content,
            session.catalog().get(&SignalId::from("emergency_broadcast")).unwrap().decoded_content
        );
    }

    #[test]
    fn test_interference_raises_static() {
        let mut session = session();
        session.set_radio_power(true);
        session.set_frequency(121.5);
        assert_eq!(session.static_level(), 0.0);

        session.add_interference("storm", 0.4);
        assert!((session.static_level() - 0.4).abs() < 1e-6);

        assert!(session.remove_interference("storm"));
        assert!(!session.remove_interference("storm"));
        assert_eq!(session.static_level(), 0.0);
    }

    #[test]
    fn test_clock_ticks_per_input() {
        let mut session = session();
        session.set_frequency(100.0);
        session.set_location("bunker");
        assert_eq!(session.clock(), 2);
    }

    #[test]
    fn test_non_finite_frequency_is_ignored() {
        let mut session = session();
        session.set_radio_power(true);
        session.set_frequency(121.5);
        session.drain_events();

        assert_eq!(session.set_frequency(f32::NAN), 121.5);
        assert_eq!(session.set_frequency(f32::INFINITY), 121.5);
        assert_eq!(session.frequency(), 121.5);
        assert_eq!(session.current_strength(), 1.0);
        assert_eq!(session.tracker().len(), 1);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_non_finite_boost_is_rejected() {
        let mut session = session();
        session.set_radio_power(true);
        session.set_frequency(130.0);
        session.add_item("radio");

        assert!(!session.register_effect("radio", f32::NAN, false));
        assert_eq!(session.equipment_effect().signal_boost, 1.0);
        assert!(session.current_signal().is_none());
        assert!(session.tracker().is_empty());
    }

    #[test]
    fn test_nan_interference_is_rejected() {
        let mut session = session();
        session.set_radio_power(true);
        session.set_frequency(121.5);

        assert!(!session.add_interference("storm", f32::NAN));
        assert_eq!(session.static_level(), 0.0);
    }
}
