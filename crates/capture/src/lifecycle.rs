//! Capture context lifecycle notifications.
//!
//! The host deserializes its capture context, modes and overlays itself and
//! announces each step here. Modules observe the steps that concern them.

use std::sync::{Arc, PoisonError, RwLock};

use crate::native::{CaptureView, DataCaptureContext};

/// Observer of capture context lifecycle steps. Every hook is optional.
pub trait LifecycleObserver: Send + Sync {
    fn context_deserialized(&self, _context: Arc<dyn DataCaptureContext>) {}

    fn context_disposed(&self) {}

    /// A mode descriptor was added to the context.
    fn mode_added(&self, _mode_json: &str) {}

    fn mode_removed(&self, _mode_json: &str) {}

    fn all_modes_removed(&self) {}

    /// An overlay descriptor was added to `view`.
    fn overlay_added(&self, _overlay_json: &str, _view: Arc<dyn CaptureView>) {}

    fn overlay_removed(&self, _overlay_json: &str) {}

    fn all_overlays_removed(&self) {}
}

/// Fans lifecycle notifications out to the attached observers.
#[derive(Default)]
pub struct LifecycleDispatcher {
    observers: RwLock<Vec<Arc<dyn LifecycleObserver>>>,
}

impl LifecycleDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, observer: Arc<dyn LifecycleObserver>) {
        let mut observers = self
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if !observers
            .iter()
            .any(|existing| std::ptr::addr_eq(Arc::as_ptr(existing), Arc::as_ptr(&observer)))
        {
            observers.push(observer);
        }
    }

    pub fn detach(&self, observer: &dyn LifecycleObserver) {
        let target = std::ptr::from_ref(observer).cast::<()>();
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|existing| !std::ptr::addr_eq(Arc::as_ptr(existing), target));
    }

    pub fn observer_count(&self) -> usize {
        self.snapshot().len()
    }

    // Observers run outside the lock so they may attach or detach.
    fn snapshot(&self) -> Vec<Arc<dyn LifecycleObserver>> {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn notify_context_deserialized(&self, context: Arc<dyn DataCaptureContext>) {
        for observer in self.snapshot() {
            observer.context_deserialized(Arc::clone(&context));
        }
    }

    pub fn notify_context_disposed(&self) {
        for observer in self.snapshot() {
            observer.context_disposed();
        }
    }

    pub fn notify_mode_added(&self, mode_json: &str) {
        for observer in self.snapshot() {
            observer.mode_added(mode_json);
        }
    }

    pub fn notify_mode_removed(&self, mode_json: &str) {
        for observer in self.snapshot() {
            observer.mode_removed(mode_json);
        }
    }

    pub fn notify_all_modes_removed(&self) {
        for observer in self.snapshot() {
            observer.all_modes_removed();
        }
    }

    pub fn notify_overlay_added(&self, overlay_json: &str, view: Arc<dyn CaptureView>) {
        for observer in self.snapshot() {
            observer.overlay_added(overlay_json, Arc::clone(&view));
        }
    }

    pub fn notify_overlay_removed(&self, overlay_json: &str) {
        for observer in self.snapshot() {
            observer.overlay_removed(overlay_json);
        }
    }

    pub fn notify_all_overlays_removed(&self) {
        for observer in self.snapshot() {
            observer.all_overlays_removed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    impl LifecycleObserver for Recorder {
        fn mode_added(&self, mode_json: &str) {
            self.seen.lock().unwrap().push(format!("added {mode_json}"));
        }

        fn all_modes_removed(&self) {
            self.seen.lock().unwrap().push("cleared".to_string());
        }
    }

    #[test]
    fn test_notifications_reach_attached_observers() {
        let dispatcher = LifecycleDispatcher::new();
        let recorder = Arc::new(Recorder::default());
        dispatcher.attach(recorder.clone());

        dispatcher.notify_mode_added("{}");
        dispatcher.notify_context_disposed();
        dispatcher.notify_all_modes_removed();

        assert_eq!(*recorder.seen.lock().unwrap(), vec!["added {}", "cleared"]);
    }

    #[test]
    fn test_attach_twice_and_detach() {
        let dispatcher = LifecycleDispatcher::new();
        let recorder = Arc::new(Recorder::default());
        dispatcher.attach(recorder.clone());
        dispatcher.attach(recorder.clone());
        assert_eq!(dispatcher.observer_count(), 1);

        dispatcher.detach(recorder.as_ref());
        assert_eq!(dispatcher.observer_count(), 0);

        dispatcher.notify_mode_added("{}");
        assert!(recorder.seen.lock().unwrap().is_empty());
    }
}
