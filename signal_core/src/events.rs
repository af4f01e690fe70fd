//! Events emitted by the core, and the bus that delivers them.

use serde::{Deserialize, Serialize};
use signal_rules::{ProgressionStage, SignalId, ThreadId};

/// Everything the core tells the outside world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RadioEvent {
    SignalDiscovered { signal_id: SignalId },
    SignalLost { signal_id: SignalId },
    SignalStrengthChanged { signal_id: SignalId, strength: f32 },
    SignalDecoded { signal_id: SignalId },
    NarrativeThreadDiscovered { thread_id: ThreadId },
    NarrativeThreadProgressed { thread_id: ThreadId, fraction: f32 },
    NarrativeThreadCompleted { thread_id: ThreadId },
    ProgressionStageChanged { stage: ProgressionStage },
}

impl RadioEvent {
    /// Stable event name for hosts that route by string.
    pub fn name(&self) -> &'static str {
        match self {
            RadioEvent::SignalDiscovered { .. } => "signalDiscovered",
            RadioEvent::SignalLost { .. } => "signalLost",
            RadioEvent::SignalStrengthChanged { .. } => "signalStrengthChanged",
            RadioEvent::SignalDecoded { .. } => "signalDecoded",
            RadioEvent::NarrativeThreadDiscovered { .. } => "narrativeThreadDiscovered",
            RadioEvent::NarrativeThreadProgressed { .. } => "narrativeThreadProgressed",
            RadioEvent::NarrativeThreadCompleted { .. } => "narrativeThreadCompleted",
            RadioEvent::ProgressionStageChanged { .. } => "progressionStageChanged",
        }
    }

    /// The signal this event is about, if any.
    pub fn signal_id(&self) -> Option<&SignalId> {
        match self {
            RadioEvent::SignalDiscovered { signal_id }
            | RadioEvent::SignalLost { signal_id }
            | RadioEvent::SignalStrengthChanged { signal_id, .. }
            | RadioEvent::SignalDecoded { signal_id } => Some(signal_id),
            _ => None,
        }
    }

    /// The narrative thread this event is about, if any.
    pub fn thread_id(&self) -> Option<&ThreadId> {
        match self {
            RadioEvent::NarrativeThreadDiscovered { thread_id }
            | RadioEvent::NarrativeThreadProgressed { thread_id, .. }
            | RadioEvent::NarrativeThreadCompleted { thread_id } => Some(thread_id),
            _ => None,
        }
    }
}

type Subscriber = Box<dyn FnMut(&RadioEvent)>;

/// Delivers events to subscribers as they happen and queues them for polling.
///
/// Subscribers run synchronously inside `publish`; the queue keeps every event
/// until the host drains it.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    pending: Vec<RadioEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked for every event.
    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: FnMut(&RadioEvent) + 'static,
    {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn publish(&mut self, event: RadioEvent) {
        for subscriber in self.subscribers.iter_mut() {
            subscriber(&event);
        }
        self.pending.push(event);
    }

    pub fn publish_all(&mut self, events: impl IntoIterator<Item = RadioEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Events published since the last drain.
    pub fn pending(&self) -> &[RadioEvent] {
        &self.pending
    }

    /// Take all queued events.
    pub fn drain(&mut self) -> Vec<RadioEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("pending", &self.pending)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_event_names() {
        let event = RadioEvent::SignalDiscovered {
            signal_id: SignalId::from("a"),
        };
        assert_eq!(event.name(), "signalDiscovered");
        assert_eq!(event.signal_id(), Some(&SignalId::from("a")));
        assert!(event.thread_id().is_none());

        let event = RadioEvent::NarrativeThreadProgressed {
            thread_id: ThreadId::from("main_story"),
            fraction: 0.5,
        };
        assert_eq!(event.name(), "narrativeThreadProgressed");
        assert_eq!(event.thread_id(), Some(&ThreadId::from("main_story")));
    }

    #[test]
    fn test_subscribers_see_every_event() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        let sink = Rc::clone(&seen);
        bus.subscribe(move |event| sink.borrow_mut().push(event.name()));

        bus.publish(RadioEvent::SignalDecoded {
            signal_id: SignalId::from("a"),
        });
        bus.publish(RadioEvent::ProgressionStageChanged {
            stage: ProgressionStage::RadioRepair,
        });

        assert_eq!(
            *seen.borrow(),
            vec!["signalDecoded", "progressionStageChanged"]
        );
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut bus = EventBus::new();
        bus.publish(RadioEvent::SignalLost {
            signal_id: SignalId::from("a"),
        });

        assert_eq!(bus.pending().len(), 1);
        assert_eq!(bus.drain().len(), 1);
        assert!(bus.pending().is_empty());
    }
}
