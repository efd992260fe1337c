//! Event system for transmission progress
//!
//! This module provides an in-process event bus for distributing sequencer
//! events to subscribers without blocking the transmission.
//!
//! # Architecture
//!
//! The event bus uses `tokio::sync::broadcast` for multi-subscriber support.
//! The transmitter task emits one event per sequencer transition and any
//! number of subscribers (the CLI renderer, the TUI lamp) consume them.
//!
//! # Non-Blocking Behavior
//!
//! If no subscribers exist, events are dropped immediately. Subscribers can
//! lag without blocking the transmitter.
//!
//! # Example
//!
//! ```no_run
//! use libmorsecast::service::events::{EventBus, Event};
//! use libmorsecast::TransformMode;
//!
//! # async fn example() {
//! let event_bus = EventBus::new(256);
//! let mut receiver = event_bus.subscribe();
//!
//! event_bus.emit(Event::TransmissionStarted {
//!     transmission_id: "abc123".to_string(),
//!     display_text: "SOS".to_string(),
//!     mode: TransformMode::None,
//!     char_total: 3,
//!     pulse_total: 9,
//! });
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::sequencer::Snapshot;
use crate::types::{HistoryEntry, PulseSymbol, TransformMode};

/// Event receiver type alias
pub type EventReceiver = broadcast::Receiver<Event>;

/// Default per-subscriber buffer
pub const DEFAULT_CAPACITY: usize = 256;

/// Event bus for distributing sequencer events
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus with the specified per-subscriber capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events emitted after this call
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Never blocks. Events are dropped if nobody is listening.
    pub fn emit(&self, event: Event) {
        let _ = self.sender.send(event);
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Events emitted while a transmission runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Sequencer left idle
    TransmissionStarted {
        transmission_id: String,
        display_text: String,
        mode: TransformMode,
        char_total: usize,
        pulse_total: usize,
    },

    /// A pulse began: the lamp lights and the tone starts in the same tick
    FlashBegin {
        transmission_id: String,
        pulse: PulseSymbol,
        frequency_hz: u32,
        duration_ms: u64,
        snapshot: Snapshot,
    },

    /// The pulse's duration elapsed
    FlashEnd {
        transmission_id: String,
        snapshot: Snapshot,
    },

    /// A word separator is holding silence
    WordGap {
        transmission_id: String,
        snapshot: Snapshot,
    },

    /// The inter-character gap elapsed and the next character is current
    CharacterAdvanced {
        transmission_id: String,
        snapshot: Snapshot,
    },

    /// Every character was keyed and the entry has been logged
    TransmissionCompleted {
        transmission_id: String,
        entry: HistoryEntry,
    },
}

impl Event {
    pub fn transmission_id(&self) -> &str {
        match self {
            Event::TransmissionStarted { transmission_id, .. }
            | Event::FlashBegin { transmission_id, .. }
            | Event::FlashEnd { transmission_id, .. }
            | Event::WordGap { transmission_id, .. }
            | Event::CharacterAdvanced { transmission_id, .. }
            | Event::TransmissionCompleted { transmission_id, .. } => transmission_id,
        }
    }

    /// Sequencer snapshot carried by the event, if any
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            Event::FlashBegin { snapshot, .. }
            | Event::FlashEnd { snapshot, .. }
            | Event::WordGap { snapshot, .. }
            | Event::CharacterAdvanced { snapshot, .. } => Some(snapshot),
            Event::TransmissionStarted { .. } | Event::TransmissionCompleted { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(id: &str) -> Event {
        Event::TransmissionStarted {
            transmission_id: id.to_string(),
            display_text: "SOS".to_string(),
            mode: TransformMode::None,
            char_total: 3,
            pulse_total: 9,
        }
    }

    #[tokio::test]
    async fn test_event_emission_and_subscription() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        event_bus.emit(started("test123"));

        let received = receiver.recv().await.unwrap();
        match received {
            Event::TransmissionStarted {
                transmission_id,
                char_total,
                ..
            } => {
                assert_eq!(transmission_id, "test123");
                assert_eq!(char_total, 3);
            }
            _ => panic!("Wrong event type received"),
        }
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let event_bus = EventBus::new(10);
        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();

        event_bus.emit(started("shared"));

        assert_eq!(receiver1.recv().await.unwrap().transmission_id(), "shared");
        assert_eq!(receiver2.recv().await.unwrap().transmission_id(), "shared");
    }

    #[tokio::test]
    async fn test_no_subscribers() {
        let event_bus = EventBus::new(10);
        event_bus.emit(started("nobody"));
        assert_eq!(event_bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = Event::FlashEnd {
            transmission_id: "t1".to_string(),
            snapshot: Snapshot::default(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"flash_end\""));

        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_snapshot_accessor() {
        assert!(started("x").snapshot().is_none());
        let event = Event::WordGap {
            transmission_id: "x".to_string(),
            snapshot: Snapshot::default(),
        };
        assert!(event.snapshot().is_some());
    }
}
