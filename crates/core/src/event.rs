//! Domain event system — decoupled observation of the farm loop.
//!
//! Events are published when the loop changes state. Anything that wants to
//! observe the loop (status output, tests) subscribes without the loop
//! knowing about it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Which scheduled pause was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    Iteration,
    Short,
    Long,
}

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FarmEvent {
    /// Challenge text was found in recent messages
    ChallengeDetected { timestamp: DateTime<Utc> },

    /// The challenge wait ended, either cleared or timed out
    ChallengeResolved {
        timed_out: bool,
        waited_secs: u64,
        timestamp: DateTime<Utc>,
    },

    /// A consume command was dispatched
    ResourcesConsumed {
        ids: Vec<u16>,
        command: String,
        timestamp: DateTime<Utc>,
    },

    /// A pause was scheduled by the cadence rules
    BreakScheduled {
        kind: BreakKind,
        secs: u64,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for farm events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<FarmEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: FarmEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<FarmEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(FarmEvent::ResourcesConsumed {
            ids: vec![57, 64],
            command: "ouse 057 064".into(),
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            FarmEvent::ResourcesConsumed { ids, command, .. } => {
                assert_eq!(ids, &vec![57, 64]);
                assert_eq!(command, "ouse 057 064");
            }
            _ => panic!("Expected ResourcesConsumed event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(FarmEvent::ChallengeDetected {
            timestamp: Utc::now(),
        });
    }
}
