//! Adapter binding one native ID capture mode to the bridge.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use idbridge_events::Emitter;

use crate::config::CallbackTimeouts;
use crate::creation::ModeCreationData;
use crate::error::NativeError;
use crate::image_cache::ImageStore;
use crate::listener::IdCaptureListener;
use crate::native::{DataCaptureContext, IdCaptureDeserializer, IdCaptureObserver, NativeIdCapture};
use crate::registry::RegisteredMode;

/// Everything a new mode needs besides its descriptor and context.
#[derive(Clone)]
pub struct ModeFactory {
    pub emitter: Arc<Emitter>,
    pub deserializer: Arc<dyn IdCaptureDeserializer>,
    pub images: Arc<dyn ImageStore>,
    pub timeouts: CallbackTimeouts,
}

impl ModeFactory {
    /// Build the native mode, attach it to `context` and wire its listener.
    ///
    /// Nothing is attached to the context when the deserializer fails.
    pub fn create(
        &self,
        data: &ModeCreationData,
        context: &Arc<dyn DataCaptureContext>,
    ) -> Result<IdCaptureMode, NativeError> {
        let native = self.deserializer.mode(&data.mode_json, context)?;
        let listener = Arc::new(IdCaptureListener::new(
            data.mode_id,
            Arc::clone(&self.emitter),
            Arc::clone(&self.images),
            self.timeouts,
        ));
        let observer: Arc<dyn IdCaptureObserver> = listener.clone();

        let mode = IdCaptureMode {
            mode_id: data.mode_id,
            parent_id: data.parent_id,
            native,
            listener,
            observer,
            context: Arc::clone(context),
            deserializer: Arc::clone(&self.deserializer),
            listener_added: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        };

        mode.context.add_mode(&mode.native);
        if data.has_listeners {
            mode.add_listener();
        }
        mode.set_enabled(data.is_enabled);

        tracing::debug!(
            mode_id = data.mode_id,
            parent_id = ?data.parent_id,
            has_listeners = data.has_listeners,
            "ID capture mode created"
        );
        Ok(mode)
    }
}

pub struct IdCaptureMode {
    mode_id: i64,
    parent_id: Option<i64>,
    native: Arc<dyn NativeIdCapture>,
    listener: Arc<IdCaptureListener>,
    /// The listener as the native side sees it; identity for add/remove.
    observer: Arc<dyn IdCaptureObserver>,
    context: Arc<dyn DataCaptureContext>,
    deserializer: Arc<dyn IdCaptureDeserializer>,
    listener_added: AtomicBool,
    disposed: AtomicBool,
}

impl IdCaptureMode {
    pub fn mode_id(&self) -> i64 {
        self.mode_id
    }

    pub fn parent_id(&self) -> Option<i64> {
        self.parent_id
    }

    pub fn native(&self) -> &Arc<dyn NativeIdCapture> {
        &self.native
    }

    pub fn listener(&self) -> &Arc<IdCaptureListener> {
        &self.listener
    }

    pub fn is_enabled(&self) -> bool {
        self.native.is_enabled()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.native.set_enabled(enabled);
        self.listener.set_enabled(enabled);
    }

    pub fn has_listener(&self) -> bool {
        self.listener_added.load(Ordering::SeqCst)
    }

    pub fn add_listener(&self) {
        if !self.listener_added.swap(true, Ordering::SeqCst) {
            self.native.add_listener(Arc::clone(&self.observer));
        }
    }

    pub fn remove_listener(&self) {
        if self.listener_added.swap(false, Ordering::SeqCst) {
            self.native.remove_listener(&self.observer);
        }
    }

    pub fn apply_settings(&self, settings_json: &str) -> Result<(), NativeError> {
        let settings = self.deserializer.settings(settings_json)?;
        self.native.apply_settings(&settings);
        Ok(())
    }

    pub fn update_from_json(&self, mode_json: &str) -> Result<(), NativeError> {
        self.deserializer
            .update_mode(self.native.as_ref(), mode_json)?;
        // The fragment may have toggled `enabled`.
        self.listener.set_enabled(self.native.is_enabled());
        Ok(())
    }

    pub fn update_feedback(&self, feedback_json: &str) -> Result<(), NativeError> {
        let feedback = self.deserializer.feedback(feedback_json)?;
        self.native.set_feedback(feedback);
        Ok(())
    }

    /// Reset the capture session and release any held callback.
    pub fn reset(&self) {
        self.native.reset();
        self.listener.reset();
    }

    pub fn finish_did_capture(&self, enabled: bool) -> bool {
        self.listener.finish_did_capture(enabled)
    }

    pub fn finish_did_reject(&self, enabled: bool) -> bool {
        self.listener.finish_did_reject(enabled)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Release held callbacks, detach the listener and leave the context.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.listener.close();
        self.remove_listener();
        self.context.remove_mode(&self.native);
        tracing::debug!(mode_id = self.mode_id, "ID capture mode disposed");
    }
}

impl RegisteredMode for IdCaptureMode {
    fn mode_id(&self) -> i64 {
        self.mode_id
    }

    fn parent_id(&self) -> Option<i64> {
        self.parent_id
    }
}
