//! Property tests for decoding, thread progress and stage advancement.

use proptest::prelude::*;
use signal_core::{DiscoveryTracker, GameProgressionManager, NarrativeProgressionEngine};
use signal_rules::{
    FrequencyBand, NarrativeThread, ProgressionStage, SignalCatalog, SignalDefinition, SignalId,
    ThreadId,
};

fn catalog_of(size: usize) -> SignalCatalog {
    SignalCatalog::from_definitions(
        FrequencyBand::default(),
        (0..size).map(|i| SignalDefinition::new(format!("s{i}"), format!("S{i}"), 90.0 + i as f32)),
    )
    .unwrap()
}

proptest! {
    #[test]
    fn second_decode_is_a_no_op(picks in prop::collection::vec(0usize..12, 1..20)) {
        let catalog = catalog_of(8);
        let mut tracker = DiscoveryTracker::new();

        for (tick, pick) in picks.into_iter().enumerate() {
            let id = SignalId::new(format!("s{pick}"));
            let known = pick < 8;
            let already = tracker.is_decoded(&id);

            let first = tracker.decode(&catalog, &id, tick as u64);
            prop_assert_eq!(first, known && !already);

            let before: Vec<_> = tracker.states().cloned().collect();
            prop_assert!(!tracker.decode(&catalog, &id, tick as u64 + 100));
            let after: Vec<_> = tracker.states().cloned().collect();
            prop_assert_eq!(before, after);
        }
    }

    #[test]
    fn thread_fraction_is_decoded_over_total(
        decoded in prop::collection::vec(any::<bool>(), 1..10),
    ) {
        let catalog = catalog_of(decoded.len());
        let members: Vec<String> = (0..decoded.len()).map(|i| format!("s{i}")).collect();
        let engine = NarrativeProgressionEngine::new(vec![
            NarrativeThread::new("t", "T").with_members(members.clone()),
        ]);

        let mut tracker = DiscoveryTracker::new();
        for (member, &is_decoded) in members.iter().zip(&decoded) {
            if is_decoded {
                tracker.decode(&catalog, &SignalId::new(member.as_str()), 0);
            }
        }

        let expected = decoded.iter().filter(|d| **d).count() as f32 / decoded.len() as f32;
        let thread = ThreadId::from("t");
        prop_assert_eq!(engine.thread_progress(&thread, &tracker), expected);
        prop_assert_eq!(engine.is_thread_complete(&thread, &tracker), decoded.iter().all(|d| *d));
    }

    #[test]
    fn advancing_saturates_at_endgame(steps in 0usize..20) {
        let mut manager = GameProgressionManager::with_defaults();
        let mut entered_endgame = 0;
        for _ in 0..steps {
            if manager.advance() == Some(ProgressionStage::Endgame) {
                entered_endgame += 1;
            }
        }

        let expected = ProgressionStage::from_ordinal(steps.min(7) as u32).unwrap();
        prop_assert_eq!(manager.stage(), expected);
        prop_assert_eq!(entered_endgame, usize::from(steps >= 7));
    }
}
