//! Event bridge of one mode: native recognition callbacks in, host events out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use idbridge_events::event_names::{DID_CAPTURE_ID, DID_REJECT_ID};
use idbridge_events::{
    BackImages, DidCaptureIdEvent, DidRejectIdEvent, Emitter, FrontImages, ImageInfo,
    RejectionReason,
};

use crate::config::CallbackTimeouts;
use crate::event_result::EventWithResult;
use crate::image_cache::ImageStore;
use crate::native::IdCaptureObserver;
use crate::types::{CapturedId, IdImages, ImageBytes};

/// `id`, `imageInfo` and `frontReviewImage` of an outbound payload.
struct IdPayload {
    id: String,
    image_info: Option<ImageInfo>,
    front_review_image: Option<String>,
}

pub struct IdCaptureListener {
    mode_id: i64,
    emitter: Arc<Emitter>,
    images: Arc<dyn ImageStore>,
    timeouts: CallbackTimeouts,
    enabled: AtomicBool,
    did_capture: EventWithResult<bool>,
    did_reject: EventWithResult<bool>,
}

impl IdCaptureListener {
    pub fn new(
        mode_id: i64,
        emitter: Arc<Emitter>,
        images: Arc<dyn ImageStore>,
        timeouts: CallbackTimeouts,
    ) -> Self {
        Self {
            mode_id,
            emitter,
            images,
            timeouts,
            enabled: AtomicBool::new(false),
            did_capture: EventWithResult::new(DID_CAPTURE_ID, timeouts.resolution),
            did_reject: EventWithResult::new(DID_REJECT_ID, timeouts.resolution),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Host answer to a `didCaptureId` event.
    pub fn finish_did_capture(&self, enabled: bool) -> bool {
        let resolved = self.did_capture.unlock(enabled);
        if !resolved {
            tracing::debug!(mode_id = self.mode_id, "No pending didCaptureId to finish");
        }
        resolved
    }

    /// Host answer to a `didRejectId` event.
    pub fn finish_did_reject(&self, enabled: bool) -> bool {
        let resolved = self.did_reject.unlock(enabled);
        if !resolved {
            tracing::debug!(mode_id = self.mode_id, "No pending didRejectId to finish");
        }
        resolved
    }

    /// Resolve any waiting emission with the default.
    pub fn reset(&self) {
        self.did_capture.reset();
        self.did_reject.reset();
    }

    /// Resolve any waiting emission and make later callbacks resolve to the
    /// default without reaching the host.
    pub fn close(&self) {
        self.did_capture.close();
        self.did_reject.close();
    }

    pub fn has_pending_emission(&self) -> bool {
        self.did_capture.is_pending() || self.did_reject.is_pending()
    }

    fn should_emit(&self, event: &str) -> bool {
        self.is_enabled() && self.emitter.is_observed(self.mode_id, event)
    }

    /// A persistent mode listener gets the long timeout.
    fn timeout_for(&self, event: &str) -> Duration {
        if self.emitter.has_mode_listener(self.mode_id, event) {
            self.timeouts.with_async_listener
        } else {
            self.timeouts.default
        }
    }

    fn id_payload(&self, captured: &CapturedId) -> IdPayload {
        if !self.images.is_file_system_cache_enabled() {
            return IdPayload {
                id: captured.json.clone(),
                image_info: None,
                front_review_image: None,
            };
        }

        IdPayload {
            id: captured.json_without_images.clone(),
            image_info: Some(self.image_info(&captured.images)),
            front_review_image: captured
                .front_review_image
                .as_ref()
                .and_then(|image| self.images.save_image(image)),
        }
    }

    fn image_info(&self, images: &IdImages) -> ImageInfo {
        let save = |image: &Option<ImageBytes>| {
            image.as_ref().and_then(|i| self.images.save_image(i))
        };
        ImageInfo {
            front: FrontImages {
                face: save(&images.face),
                frame: save(&images.front_frame),
                cropped_document: save(&images.front_cropped_document),
            },
            back: BackImages {
                cropped_document: save(&images.back_cropped_document),
                frame: save(&images.back_frame),
            },
        }
    }
}

impl IdCaptureObserver for IdCaptureListener {
    fn did_capture_id(&self, captured: &CapturedId) -> bool {
        if !self.should_emit(DID_CAPTURE_ID) {
            return self.timeouts.resolution;
        }

        let IdPayload {
            id,
            image_info,
            front_review_image,
        } = self.id_payload(captured);
        let event = DidCaptureIdEvent {
            mode_id: self.mode_id,
            id,
            image_info,
            front_review_image,
        };
        let payload = match serde_json::to_value(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(mode_id = self.mode_id, "Failed to serialize didCaptureId: {}", e);
                return self.timeouts.resolution;
            }
        };

        self.did_capture
            .emit(&self.emitter, payload, self.timeout_for(DID_CAPTURE_ID))
    }

    fn did_reject_id(&self, captured: Option<&CapturedId>, reason: RejectionReason) -> bool {
        if !self.should_emit(DID_REJECT_ID) {
            return self.timeouts.resolution;
        }

        let (id, image_info, front_review_image) = match captured.map(|c| self.id_payload(c)) {
            Some(p) => (Some(p.id), p.image_info, p.front_review_image),
            None => (None, None, None),
        };
        let event = DidRejectIdEvent {
            mode_id: self.mode_id,
            rejection_reason: reason,
            id,
            image_info,
            front_review_image,
        };
        let payload = match serde_json::to_value(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(mode_id = self.mode_id, "Failed to serialize didRejectId: {}", e);
                return self.timeouts.resolution;
            }
        };

        self.did_reject
            .emit(&self.emitter, payload, self.timeout_for(DID_REJECT_ID))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_cache::{FileImageCache, InlineImages};
    use idbridge_events::event_names::ID_CAPTURE_LISTENER_EVENTS;
    use idbridge_events::InMemoryEventBus;
    use std::sync::Barrier;
    use std::thread;

    /// File cache that parks the callback inside `save_image` until released.
    struct GatedStore {
        entered: Barrier,
        release: Barrier,
    }

    impl GatedStore {
        fn new() -> Self {
            Self {
                entered: Barrier::new(2),
                release: Barrier::new(2),
            }
        }
    }

    impl ImageStore for GatedStore {
        fn is_file_system_cache_enabled(&self) -> bool {
            true
        }

        fn save_image(&self, _image: &ImageBytes) -> Option<String> {
            self.entered.wait();
            self.release.wait();
            Some("/tmp/face.png".to_string())
        }
    }

    fn timeouts() -> CallbackTimeouts {
        CallbackTimeouts {
            default: Duration::from_millis(30),
            with_async_listener: Duration::from_secs(10),
            resolution: true,
        }
    }

    fn listener(
        images: Arc<dyn ImageStore>,
    ) -> (Arc<IdCaptureListener>, Arc<Emitter>, Arc<InMemoryEventBus>) {
        let bus = Arc::new(InMemoryEventBus::new());
        let emitter = Arc::new(Emitter::new(bus.clone()));
        let listener = Arc::new(IdCaptureListener::new(
            7,
            Arc::clone(&emitter),
            images,
            timeouts(),
        ));
        listener.set_enabled(true);
        (listener, emitter, bus)
    }

    #[test]
    fn test_no_listener_no_event() {
        let (listener, _, bus) = listener(Arc::new(InlineImages));

        assert!(listener.did_capture_id(&CapturedId::from_json(r#"{"firstName":"A"}"#)));
        assert!(bus.is_empty());
        assert!(!listener.has_pending_emission());
    }

    #[test]
    fn test_disabled_listener_drops_callback() {
        let (listener, emitter, bus) = listener(Arc::new(InlineImages));
        emitter.register_mode_listener(7, ID_CAPTURE_LISTENER_EVENTS);
        listener.set_enabled(false);

        listener.did_reject_id(None, RejectionReason::Timeout);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_capture_emits_and_waits_for_finish() {
        let (listener, emitter, bus) = listener(Arc::new(InlineImages));
        emitter.register_mode_listener(7, ID_CAPTURE_LISTENER_EVENTS);

        let handle = {
            let listener = Arc::clone(&listener);
            thread::spawn(move || {
                listener.did_capture_id(&CapturedId::from_json(r#"{"firstName":"A"}"#))
            })
        };

        assert!(bus.wait_for(DID_CAPTURE_ID, 1, Duration::from_secs(2)));
        assert!(listener.finish_did_capture(false));
        assert!(!handle.join().unwrap());

        let events = bus.events_for(DID_CAPTURE_ID);
        assert_eq!(events[0].payload["modeId"], 7);
        assert_eq!(events[0].payload["id"], r#"{"firstName":"A"}"#);
        assert!(events[0].payload.get("imageInfo").is_none());
    }

    #[test]
    fn test_global_listener_uses_short_timeout() {
        let (listener, emitter, bus) = listener(Arc::new(InlineImages));
        emitter.register_listener(&[DID_REJECT_ID]);

        let started = std::time::Instant::now();
        assert!(listener.did_reject_id(None, RejectionReason::DocumentVoided));
        assert!(started.elapsed() < Duration::from_secs(5));

        let events = bus.events_for(DID_REJECT_ID);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload["rejectionReason"], "documentVoided");
        assert!(events[0].payload["id"].is_null());
    }

    #[test]
    fn test_file_cache_payload() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(FileImageCache::new(dir.path()).unwrap());
        let (listener, emitter, bus) = listener(cache);
        emitter.register_listener(&[DID_CAPTURE_ID]);

        let mut captured = CapturedId::from_json(r#"{"images":"inline"}"#);
        captured.json_without_images = "{}".to_string();
        captured.images.face = Some(Arc::from(&b"face"[..]));
        captured.front_review_image = Some(Arc::from(&b"review"[..]));

        listener.did_capture_id(&captured);

        let payload = &bus.events_for(DID_CAPTURE_ID)[0].payload;
        assert_eq!(payload["id"], "{}");
        let face = payload["imageInfo"]["front"]["face"].as_str().unwrap();
        assert_eq!(std::fs::read(face).unwrap(), b"face");
        assert!(payload["imageInfo"]["back"]["frame"].is_null());
        assert!(payload["frontReviewImage"].is_string());
    }

    #[test]
    fn test_reset_unblocks_pending_capture() {
        let (listener, emitter, bus) = listener(Arc::new(InlineImages));
        emitter.register_mode_listener(7, ID_CAPTURE_LISTENER_EVENTS);

        let handle = {
            let listener = Arc::clone(&listener);
            thread::spawn(move || listener.did_capture_id(&CapturedId::from_json("{}")))
        };

        assert!(bus.wait_for(DID_CAPTURE_ID, 1, Duration::from_secs(2)));
        listener.reset();
        assert!(handle.join().unwrap());
        assert!(!listener.has_pending_emission());
    }

    #[test]
    fn test_close_releases_callback_that_has_not_emitted_yet() {
        let store = Arc::new(GatedStore::new());
        let (listener, emitter, bus) = listener(store.clone());
        emitter.register_mode_listener(7, ID_CAPTURE_LISTENER_EVENTS);

        let handle = {
            let listener = Arc::clone(&listener);
            thread::spawn(move || {
                let mut captured = CapturedId::from_json("{}");
                captured.images.face = Some(Arc::from(&b"face"[..]));
                let started = std::time::Instant::now();
                (listener.did_capture_id(&captured), started.elapsed())
            })
        };

        // The callback is past its gates and building the payload.
        store.entered.wait();
        listener.close();
        store.release.wait();

        let (resolved, elapsed) = handle.join().unwrap();
        assert!(resolved);
        assert!(elapsed < Duration::from_secs(5), "held for {elapsed:?}");
        assert!(bus.is_empty());
        assert!(!listener.has_pending_emission());
    }
}
