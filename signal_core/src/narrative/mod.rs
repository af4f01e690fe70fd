//! Narrative thread discovery, progress and completion.
//!
//! Progress is never stored. Every fraction is recomputed from the
//! `DiscoveryTracker`, so a restored tracker yields the same thread state.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::discovery::DiscoveryTracker;
use crate::events::RadioEvent;
use signal_rules::{NarrativeThread, SignalId, ThreadId};

/// Events produced by one narrative step, plus the main-story percentage to
/// forward to progression when the main story moved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NarrativeUpdate {
    pub events: Vec<RadioEvent>,
    pub main_story_progress: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct NarrativeProgressionEngine {
    threads: Vec<NarrativeThread>,
    discovered: Vec<ThreadId>,
    active: Option<ThreadId>,
}

impl NarrativeProgressionEngine {
    pub fn new(threads: impl IntoIterator<Item = NarrativeThread>) -> Self {
        Self {
            threads: threads.into_iter().collect(),
            ..Self::default()
        }
    }

    /// A signal was detected for the first time.
    pub fn on_signal_discovered(&mut self, signal_id: &SignalId) -> Vec<RadioEvent> {
        let mut events = Vec::new();
        for thread in self.threads.iter().filter(|t| t.contains(signal_id)) {
            if self.discovered.contains(&thread.id) {
                continue;
            }
            info!(
                target: "signal_core::narrative",
                thread = %thread.id,
                signal = %signal_id,
                "thread.discovered"
            );
            self.discovered.push(thread.id.clone());
            events.push(RadioEvent::NarrativeThreadDiscovered {
                thread_id: thread.id.clone(),
            });
        }
        events
    }

    /// A signal was decoded. `tracker` must already reflect the decode.
    pub fn on_signal_decoded(
        &mut self,
        signal_id: &SignalId,
        tracker: &DiscoveryTracker,
    ) -> NarrativeUpdate {
        let mut update = NarrativeUpdate::default();

        for thread in self.threads.iter().filter(|t| t.contains(signal_id)) {
            let fraction = fraction_decoded(thread, tracker);
            update.events.push(RadioEvent::NarrativeThreadProgressed {
                thread_id: thread.id.clone(),
                fraction,
            });

            let complete = is_complete(thread, tracker);
            if complete {
                info!(
                    target: "signal_core::narrative",
                    thread = %thread.id,
                    "thread.completed"
                );
                update.events.push(RadioEvent::NarrativeThreadCompleted {
                    thread_id: thread.id.clone(),
                });
            }

            if thread.is_main_story {
                let percent = if complete {
                    100
                } else {
                    (fraction * 100.0).round() as u32
                };
                update.main_story_progress = Some(percent);
            }
        }

        update
    }

    /// First member in thread order that is not yet decoded.
    pub fn next_signal_in_thread(
        &self,
        thread_id: &ThreadId,
        tracker: &DiscoveryTracker,
    ) -> Option<&SignalId> {
        self.thread(thread_id)?
            .members
            .iter()
            .find(|member| !tracker.is_decoded(member))
    }

    /// Decoded members over total members; 0.0 for unknown or empty threads.
    pub fn thread_progress(&self, thread_id: &ThreadId, tracker: &DiscoveryTracker) -> f32 {
        self.thread(thread_id)
            .map_or(0.0, |thread| fraction_decoded(thread, tracker))
    }

    pub fn is_thread_complete(&self, thread_id: &ThreadId, tracker: &DiscoveryTracker) -> bool {
        self.thread(thread_id)
            .is_some_and(|thread| is_complete(thread, tracker))
    }

    /// Threads in the order they were discovered.
    pub fn discovered_threads(&self) -> impl Iterator<Item = &NarrativeThread> {
        self.discovered.iter().filter_map(|id| self.thread(id))
    }

    pub fn completed_threads<'a>(
        &'a self,
        tracker: &'a DiscoveryTracker,
    ) -> impl Iterator<Item = &'a NarrativeThread> + 'a {
        self.threads
            .iter()
            .filter(move |thread| is_complete(thread, tracker))
    }

    pub fn is_thread_discovered(&self, thread_id: &ThreadId) -> bool {
        self.discovered.contains(thread_id)
    }

    pub fn thread(&self, thread_id: &ThreadId) -> Option<&NarrativeThread> {
        self.threads.iter().find(|thread| &thread.id == thread_id)
    }

    pub fn threads(&self) -> &[NarrativeThread] {
        &self.threads
    }

    /// Choose the thread the player is following. Unknown ids return `false`.
    pub fn set_active_thread(&mut self, thread_id: &ThreadId) -> bool {
        if self.thread(thread_id).is_none() {
            return false;
        }
        self.active = Some(thread_id.clone());
        true
    }

    pub fn active_thread(&self) -> Option<&NarrativeThread> {
        self.active.as_ref().and_then(|id| self.thread(id))
    }

    /// Re-derive discovered threads from a restored tracker and forget the
    /// active thread. Emits nothing.
    pub fn rebuild(&mut self, tracker: &DiscoveryTracker) {
        self.discovered.clear();
        self.active = None;
        for state in tracker.states() {
            for thread in self.threads.iter().filter(|t| t.contains(&state.signal_id)) {
                if !self.discovered.contains(&thread.id) {
                    self.discovered.push(thread.id.clone());
                }
            }
        }
    }
}

fn fraction_decoded(thread: &NarrativeThread, tracker: &DiscoveryTracker) -> f32 {
    if thread.members.is_empty() {
        return 0.0;
    }
    let decoded = thread
        .members
        .iter()
        .filter(|member| tracker.is_decoded(member))
        .count();
    decoded as f32 / thread.members.len() as f32
}

fn is_complete(thread: &NarrativeThread, tracker: &DiscoveryTracker) -> bool {
    !thread.members.is_empty() && thread.members.iter().all(|member| tracker.is_decoded(member))
}
