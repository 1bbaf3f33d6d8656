//! Host listener bookkeeping in front of an [`EventBus`].
//!
//! The host subscribes in two ways: to an event name for every mode, or to a
//! set of event names for one mode id (what `addIdCaptureListener` does).
//! The event bridge asks the emitter before emitting, so a callback nobody
//! listens to never reaches the host.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::bus::EventBusRef;

#[derive(Default)]
struct Subscriptions {
    global: HashSet<String>,
    by_mode: HashMap<i64, HashSet<String>>,
}

/// Event bus plus the host's current subscriptions.
pub struct Emitter {
    bus: EventBusRef,
    subscriptions: RwLock<Subscriptions>,
}

impl Emitter {
    pub fn new(bus: EventBusRef) -> Self {
        Self {
            bus,
            subscriptions: RwLock::new(Subscriptions::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Subscriptions> {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Subscriptions> {
        self.subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn emit(&self, event: &str, payload: serde_json::Value) {
        self.bus.emit(event, payload);
    }

    /// Subscribe the host to `events` for all modes.
    pub fn register_listener<S: AsRef<str>>(&self, events: &[S]) {
        let mut subs = self.write();
        for event in events {
            subs.global.insert(event.as_ref().to_string());
        }
    }

    pub fn unregister_listener<S: AsRef<str>>(&self, events: &[S]) {
        let mut subs = self.write();
        for event in events {
            subs.global.remove(event.as_ref());
        }
    }

    /// Subscribe the host to `events` emitted by one mode.
    pub fn register_mode_listener<S: AsRef<str>>(&self, mode_id: i64, events: &[S]) {
        let mut subs = self.write();
        let entry = subs.by_mode.entry(mode_id).or_default();
        for event in events {
            entry.insert(event.as_ref().to_string());
        }
        tracing::debug!(mode_id, count = events.len(), "mode listener registered");
    }

    pub fn unregister_mode_listener<S: AsRef<str>>(&self, mode_id: i64, events: &[S]) {
        let mut subs = self.write();
        if let Some(entry) = subs.by_mode.get_mut(&mode_id) {
            for event in events {
                entry.remove(event.as_ref());
            }
            if entry.is_empty() {
                subs.by_mode.remove(&mode_id);
            }
        }
        tracing::debug!(mode_id, "mode listener unregistered");
    }

    /// Whether the host subscribed to `event` for every mode.
    pub fn has_listener(&self, event: &str) -> bool {
        self.read().global.contains(event)
    }

    /// Whether the host subscribed to `event` for this specific mode.
    pub fn has_mode_listener(&self, mode_id: i64, event: &str) -> bool {
        self.read()
            .by_mode
            .get(&mode_id)
            .is_some_and(|events| events.contains(event))
    }

    /// Whether an emission of `event` by `mode_id` would reach anyone.
    pub fn is_observed(&self, mode_id: i64, event: &str) -> bool {
        let subs = self.read();
        subs.global.contains(event)
            || subs
                .by_mode
                .get(&mode_id)
                .is_some_and(|events| events.contains(event))
    }
}
