//! Event bus abstraction for outbound host events.
//!
//! The bridge never talks to the host runtime directly: every event leaves
//! through an [`EventBus`]. The Tauri plugin provides the real implementation,
//! tests use [`InMemoryEventBus`].

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Sink for outbound events.
///
/// `emit` may be called from native capture threads, so implementations must
/// not block for long and must be callable concurrently.
pub trait EventBus: Send + Sync {
    /// Emit an event with a JSON payload.
    ///
    /// # Arguments
    /// * `topic` - Event name (e.g., "IdCaptureListener.didCaptureId")
    /// * `payload` - JSON payload to emit
    fn emit(&self, topic: &str, payload: serde_json::Value);
}

/// Type alias for shared event bus reference.
pub type EventBusRef = Arc<dyn EventBus>;

/// A captured event from [`InMemoryEventBus`].
#[derive(Debug, Clone)]
pub struct EmittedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

/// In-memory event bus for tests and headless runs.
///
/// Records every emitted event and lets a test thread block until an event
/// shows up, which is how tests observe an emission that is holding a native
/// callback thread.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: Mutex<Vec<EmittedEvent>>,
    arrived: Condvar,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<EmittedEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All captured events, in emission order.
    pub fn events(&self) -> Vec<EmittedEvent> {
        self.lock().clone()
    }

    /// Captured events for one topic.
    pub fn events_for(&self, topic: &str) -> Vec<EmittedEvent> {
        self.lock()
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
    }

    /// Block until at least `count` events for `topic` were emitted.
    ///
    /// Returns false if `timeout` elapsed first.
    pub fn wait_for(&self, topic: &str, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut events = self.lock();
        loop {
            if events.iter().filter(|e| e.topic == topic).count() >= count {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            events = self
                .arrived
                .wait_timeout(events, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        self.lock().push(EmittedEvent {
            topic: topic.to_string(),
            payload,
        });
        self.arrived.notify_all();
    }
}

/// Event bus that discards everything.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&self, _topic: &str, _payload: serde_json::Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_in_memory_event_bus_filters_by_topic() {
        let bus = InMemoryEventBus::new();

        bus.emit("IdCaptureListener.didCaptureId", json!({"modeId": 1}));
        bus.emit("IdCaptureListener.didRejectId", json!({"modeId": 1}));
        bus.emit("IdCaptureListener.didCaptureId", json!({"modeId": 2}));

        assert_eq!(bus.len(), 3);
        assert_eq!(bus.events_for("IdCaptureListener.didCaptureId").len(), 2);
        assert_eq!(bus.events_for("IdCaptureListener.didRejectId").len(), 1);
        assert!(bus.events_for("missing").is_empty());
    }

    #[test]
    fn test_wait_for_sees_event_from_other_thread() {
        let bus = Arc::new(InMemoryEventBus::new());
        let producer = Arc::clone(&bus);

        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            producer.emit("topic", json!({}));
        });

        assert!(bus.wait_for("topic", 1, Duration::from_secs(2)));
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_for_times_out() {
        let bus = InMemoryEventBus::new();
        assert!(!bus.wait_for("topic", 1, Duration::from_millis(20)));
    }

    #[test]
    fn test_clear() {
        let bus = InMemoryEventBus::new();
        bus.emit("topic", json!({}));
        assert!(!bus.is_empty());

        bus.clear();
        assert!(bus.is_empty());
    }

    #[test]
    fn test_null_event_bus() {
        NullEventBus.emit("topic", json!({"data": "ignored"}));
    }
}
