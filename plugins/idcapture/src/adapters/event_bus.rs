//! Tauri event bus adapter.
//!
//! Implements the EventBus trait using Tauri's event system.

use idbridge_events::EventBus;
use tauri::{AppHandle, Emitter, Runtime};

/// Tauri channel an outbound event is emitted on.
///
/// Tauri event names only allow ASCII alphanumerics and `-`, `/`, `:`, `_`.
/// The `.` of `IdCaptureListener.didCaptureId` becomes `:`, anything else
/// outside the set becomes `_`.
pub fn tauri_event_name(topic: &str) -> String {
    topic
        .chars()
        .map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '-' | '/' | ':' | '_') => c,
            '.' => ':',
            _ => '_',
        })
        .collect()
}

/// EventBus implementation that emits events via Tauri.
pub struct TauriEventBus<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> TauriEventBus<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: Runtime> EventBus for TauriEventBus<R> {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        let channel = tauri_event_name(topic);
        if let Err(e) = self.app.emit(&channel, payload) {
            tracing::warn!(event = topic, channel = %channel, "Failed to emit to the host: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idbridge_events::event_names::{DID_CAPTURE_ID, DID_REJECT_ID, ID_CAPTURE_LISTENER_EVENTS};

    use crate::lifecycle_events;

    fn is_tauri_event_name(name: &str) -> bool {
        !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '/' | ':' | '_'))
    }

    #[test]
    fn test_outbound_event_names_map_to_legal_channels() {
        let names = [DID_CAPTURE_ID, DID_REJECT_ID]
            .into_iter()
            .chain(ID_CAPTURE_LISTENER_EVENTS.iter().copied());

        for name in names {
            let channel = tauri_event_name(name);
            assert!(is_tauri_event_name(&channel), "{name} maps to illegal {channel}");
        }
    }

    #[test]
    fn test_listener_separator_becomes_colon() {
        assert_eq!(tauri_event_name(DID_CAPTURE_ID), "IdCaptureListener:didCaptureId");
        assert_eq!(tauri_event_name(DID_REJECT_ID), "IdCaptureListener:didRejectId");
        assert_eq!(tauri_event_name("a b.c"), "a_b:c");
    }

    #[test]
    fn test_lifecycle_channels_are_already_legal() {
        for name in [
            lifecycle_events::MODE_ADDED,
            lifecycle_events::MODE_REMOVED,
            lifecycle_events::ALL_MODES_REMOVED,
            lifecycle_events::OVERLAY_REMOVED,
            lifecycle_events::ALL_OVERLAYS_REMOVED,
        ] {
            assert!(is_tauri_event_name(name), "{name}");
            assert_eq!(tauri_event_name(name), name);
        }
    }
}
