//! The ID capture module: owns the live modes and serves host commands.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use idbridge_events::Emitter;
use serde_json::Value;

use crate::config::BridgeConfig;
use crate::creation::{removed_mode_id, ModeCreationData, OverlayCreationData, ID_CAPTURE_TYPE};
use crate::defaults::IdCaptureDefaults;
use crate::dispatch::{run_on_view, ViewDispatcher};
use crate::error::{BridgeError, Result};
use crate::image_cache::{FileImageCache, ImageStore, InlineImages};
use crate::lifecycle::{LifecycleDispatcher, LifecycleObserver};
use crate::mode::{IdCaptureMode, ModeFactory};
use crate::native::{
    BarcodeVerifier, CaptureView, DataCaptureContext, IdCaptureDeserializer, NativeOverlay,
    VerificationProvider,
};
use crate::registry::{ModeRegistry, ModeTarget};

/// Work queued until a mode with a given id or parent appears.
pub type PendingAction = Box<dyn FnOnce(&IdCaptureModule) + Send>;

/// Native SDK entry points the module is built on.
pub struct NativeBindings {
    pub deserializer: Arc<dyn IdCaptureDeserializer>,
    /// Execution context overlays are created and mutated on.
    pub dispatcher: Arc<dyn ViewDispatcher>,
    pub verification: Option<Arc<dyn VerificationProvider>>,
}

struct AttachedOverlay {
    mode_id: i64,
    overlay: Arc<dyn NativeOverlay>,
    view: Arc<dyn CaptureView>,
}

type OverlayList = Arc<Mutex<Vec<AttachedOverlay>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn image_store(config: &BridgeConfig) -> Arc<dyn ImageStore> {
    let Some(dir) = &config.image_cache_dir else {
        return Arc::new(InlineImages);
    };
    match FileImageCache::new(dir) {
        Ok(cache) => {
            tracing::info!(dir = %dir.display(), "Image file cache enabled");
            Arc::new(cache)
        }
        Err(e) => {
            tracing::warn!(dir = %dir.display(), "Image cache unavailable, inlining images: {}", e);
            Arc::new(InlineImages)
        }
    }
}

pub struct IdCaptureModule {
    emitter: Arc<Emitter>,
    factory: ModeFactory,
    dispatcher: Arc<dyn ViewDispatcher>,
    verification: Option<Arc<dyn VerificationProvider>>,
    context: RwLock<Option<Arc<dyn DataCaptureContext>>>,
    registry: ModeRegistry<IdCaptureMode, PendingAction>,
    /// Attached overlays in attach order.
    overlays: OverlayList,
    verifier: Mutex<Option<Arc<dyn BarcodeVerifier>>>,
}

impl IdCaptureModule {
    pub fn new(emitter: Arc<Emitter>, bindings: NativeBindings, config: &BridgeConfig) -> Self {
        let factory = ModeFactory {
            emitter: Arc::clone(&emitter),
            deserializer: bindings.deserializer,
            images: image_store(config),
            timeouts: config.timeouts(),
        };
        Self {
            emitter,
            factory,
            dispatcher: bindings.dispatcher,
            verification: bindings.verification,
            context: RwLock::new(None),
            registry: ModeRegistry::new(),
            overlays: Arc::new(Mutex::new(Vec::new())),
            verifier: Mutex::new(None),
        }
    }

    /// Start observing the capture context lifecycle.
    pub fn did_start(self: &Arc<Self>, lifecycle: &LifecycleDispatcher) {
        lifecycle.attach(Arc::clone(self) as Arc<dyn LifecycleObserver>);
        tracing::info!("ID capture module started");
    }

    /// Dispose every mode and stop observing the lifecycle.
    pub fn did_stop(&self, lifecycle: &LifecycleDispatcher) {
        self.dispose_all_modes();
        lifecycle.detach(self);
        tracing::info!("ID capture module stopped");
    }

    pub fn emitter(&self) -> &Arc<Emitter> {
        &self.emitter
    }

    pub fn defaults(&self) -> Value {
        IdCaptureDefaults::default().to_json()
    }

    pub fn context(&self) -> Option<Arc<dyn DataCaptureContext>> {
        self.context
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_context(&self, context: Option<Arc<dyn DataCaptureContext>>) {
        *self
            .context
            .write()
            .unwrap_or_else(PoisonError::into_inner) = context;
    }

    pub fn mode(&self, mode_id: i64) -> Option<Arc<IdCaptureMode>> {
        self.registry.get(mode_id)
    }

    pub fn modes(&self) -> Vec<Arc<IdCaptureMode>> {
        self.registry.get_all()
    }

    pub fn pending_actions(&self, target: ModeTarget) -> usize {
        self.registry.pending_actions(target)
    }

    pub fn overlay_count(&self) -> usize {
        lock(&self.overlays).len()
    }

    // Mode operations. A mode id that is not registered is a no-op: the mode
    // may just have been removed by a lifecycle notification.

    pub fn add_id_capture_listener(&self, mode_id: i64) {
        if let Some(mode) = self.mode(mode_id) {
            mode.add_listener();
        }
    }

    pub fn remove_id_capture_listener(&self, mode_id: i64) {
        if let Some(mode) = self.mode(mode_id) {
            mode.remove_listener();
        }
    }

    pub fn finish_did_capture_callback(&self, mode_id: i64, enabled: bool) {
        if let Some(mode) = self.mode(mode_id) {
            mode.finish_did_capture(enabled);
        }
    }

    pub fn finish_did_reject_callback(&self, mode_id: i64, enabled: bool) {
        if let Some(mode) = self.mode(mode_id) {
            mode.finish_did_reject(enabled);
        }
    }

    pub fn reset_id_capture_mode(&self, mode_id: i64) {
        if let Some(mode) = self.mode(mode_id) {
            mode.reset();
        }
    }

    pub fn set_mode_enabled_state(&self, mode_id: i64, enabled: bool) {
        if let Some(mode) = self.mode(mode_id) {
            mode.set_enabled(enabled);
        }
    }

    pub fn is_mode_enabled(&self, mode_id: i64) -> bool {
        self.mode(mode_id).is_some_and(|mode| mode.is_enabled())
    }

    pub fn is_topmost_mode_enabled(&self) -> bool {
        self.registry
            .topmost()
            .is_some_and(|mode| mode.is_enabled())
    }

    pub fn set_topmost_mode_enabled(&self, enabled: bool) {
        if let Some(mode) = self.registry.topmost() {
            mode.set_enabled(enabled);
        }
    }

    pub fn update_id_capture_mode(&self, mode_json: &str, mode_id: i64) -> Result<()> {
        match self.mode(mode_id) {
            Some(mode) => Ok(mode.update_from_json(mode_json)?),
            None => Ok(()),
        }
    }

    pub fn apply_id_capture_mode_settings(&self, settings_json: &str, mode_id: i64) -> Result<()> {
        match self.mode(mode_id) {
            Some(mode) => Ok(mode.apply_settings(settings_json)?),
            None => Ok(()),
        }
    }

    pub fn update_feedback(&self, feedback_json: &str, mode_id: i64) -> Result<()> {
        match self.mode(mode_id) {
            Some(mode) => Ok(mode.update_feedback(feedback_json)?),
            None => Ok(()),
        }
    }

    /// Update an attached overlay from JSON on the view context.
    ///
    /// The overlay is found through `parentId` or `modeId` in the JSON, else
    /// the first attached overlay is used. An update for a mode that does
    /// not exist yet runs once that mode is registered.
    pub fn update_id_capture_overlay(&self, overlay_json: &str) -> Result<()> {
        let value: Value = serde_json::from_str(overlay_json)?;
        let id_of = |key: &str| value.get(key).and_then(Value::as_i64).filter(|id| *id != -1);
        let target = id_of("parentId")
            .map(ModeTarget::Parent)
            .or_else(|| id_of("modeId").map(ModeTarget::Id));

        let mode_id = match target {
            Some(target) => {
                let json = overlay_json.to_string();
                let resolved = self.registry.resolve_or_defer(target, move || {
                    Box::new(move |module: &IdCaptureModule| {
                        if let Err(e) = module.update_id_capture_overlay(&json) {
                            tracing::warn!("Deferred overlay update failed: {}", e);
                        }
                    }) as PendingAction
                });
                match resolved {
                    Some(mode) => Some(mode.mode_id()),
                    None => {
                        tracing::debug!(?target, "Overlay update deferred until the mode exists");
                        return Ok(());
                    }
                }
            }
            None => None,
        };

        let overlay = lock(&self.overlays)
            .iter()
            .find(|attached| mode_id.map_or(true, |id| attached.mode_id == id))
            .map(|attached| Arc::clone(&attached.overlay));
        let Some(overlay) = overlay else {
            tracing::debug!(?mode_id, "No attached overlay to update");
            return Ok(());
        };

        let deserializer = Arc::clone(&self.factory.deserializer);
        let json = overlay_json.to_string();
        run_on_view(self.dispatcher.as_ref(), move || {
            deserializer.update_overlay(overlay.as_ref(), &json)
        })
        .ok_or_else(|| BridgeError::Runtime("view dispatcher did not run the update".to_string()))??;
        Ok(())
    }

    pub fn create_aamva_barcode_verifier(&self) -> Result<()> {
        let context = self.context().ok_or(BridgeError::ContextUnavailable)?;
        let provider = self
            .verification
            .as_ref()
            .ok_or(BridgeError::VerificationUnavailable)?;
        let verifier = provider.aamva_barcode_verifier(&context)?;
        *lock(&self.verifier) = Some(verifier);
        tracing::debug!("AAMVA barcode verifier created");
        Ok(())
    }

    pub fn verify_captured_id_with_cloud(&self, captured_id_json: &str) -> Result<String> {
        let verifier = lock(&self.verifier)
            .clone()
            .ok_or(BridgeError::VerifierNotCreated)?;
        verifier
            .verify(captured_id_json)?
            .ok_or(BridgeError::UnknownVerificationResult)
    }

    pub fn verify_captured_id_aamva_viz(&self, captured_id_json: &str) -> Result<String> {
        let (context, provider) = self.verification_services()?;
        Ok(provider.compare_viz_with_barcode(&context, captured_id_json)?)
    }

    pub fn verify_captured_id_mrz_viz(&self, captured_id_json: &str) -> Result<String> {
        let (context, provider) = self.verification_services()?;
        Ok(provider.compare_viz_with_mrz(&context, captured_id_json)?)
    }

    fn verification_services(
        &self,
    ) -> Result<(Arc<dyn DataCaptureContext>, Arc<dyn VerificationProvider>)> {
        let context = self.context().ok_or(BridgeError::ContextUnavailable)?;
        let provider = self
            .verification
            .clone()
            .ok_or(BridgeError::VerificationUnavailable)?;
        Ok((context, provider))
    }

    // Lifecycle handling

    fn add_mode(&self, mode_json: &str) {
        let Some(data) = ModeCreationData::from_json(mode_json) else {
            return;
        };
        let Some(context) = self.context() else {
            tracing::error!(
                mode_id = data.mode_id,
                "Unable to add the ID capture mode, no DataCaptureContext"
            );
            return;
        };

        let mode = match self.factory.create(&data, &context) {
            Ok(mode) => Arc::new(mode),
            Err(e) => {
                tracing::error!(mode_id = data.mode_id, "Error adding mode to context: {}", e);
                return;
            }
        };

        let (replaced, actions) = self.registry.register(mode);
        if let Some(old) = replaced {
            tracing::warn!(mode_id = data.mode_id, "Mode id reused, disposing the previous mode");
            self.dispose_mode(&old);
        }

        tracing::debug!(
            mode_id = data.mode_id,
            pending = actions.len(),
            "Mode registered"
        );
        for action in actions {
            action(self);
        }
    }

    fn remove_mode(&self, mode_json: &str) {
        let Some(mode_id) = removed_mode_id(mode_json) else {
            return;
        };
        match self.registry.remove(mode_id) {
            Some(mode) => self.dispose_mode(&mode),
            None => tracing::warn!(mode_id, "Unable to remove the ID capture mode, it is not registered"),
        }
        self.registry.clear_pending_actions(Some(mode_id));
    }

    fn dispose_all_modes(&self) {
        for mode in self.registry.remove_all() {
            self.dispose_mode(&mode);
        }
        self.registry.clear_pending_actions(None);
    }

    fn dispose_mode(&self, mode: &IdCaptureMode) {
        let mode_id = mode.mode_id();
        self.detach_overlays(|attached| attached.mode_id == mode_id);
        mode.dispose();
    }

    fn add_overlay(&self, overlay_json: &str, view: Arc<dyn CaptureView>) {
        let Some(data) = OverlayCreationData::from_json(overlay_json) else {
            return;
        };
        let target = match (view.parent_id(), data.mode_id) {
            (Some(parent), _) => ModeTarget::Parent(parent),
            (None, Some(mode_id)) => ModeTarget::Id(mode_id),
            (None, None) => {
                tracing::warn!("ID capture overlay names no mode and its view has no parent");
                return;
            }
        };

        let deferred_json = overlay_json.to_string();
        let deferred_view = Arc::clone(&view);
        let resolved = self.registry.resolve_or_defer(target, move || {
            Box::new(move |module: &IdCaptureModule| {
                module.add_overlay(&deferred_json, deferred_view)
            }) as PendingAction
        });
        let Some(mode) = resolved else {
            tracing::debug!(?target, "Overlay attach deferred until the mode exists");
            return;
        };

        let deserializer = Arc::clone(&self.factory.deserializer);
        let native = Arc::clone(mode.native());
        let overlays = Arc::clone(&self.overlays);
        let mode_id = mode.mode_id();
        self.dispatcher.run(Box::new(move || {
            match deserializer.overlay(&data.overlay_json, &native) {
                Ok(overlay) => {
                    data.apply_text_hints(overlay.as_ref());
                    view.add_overlay(Arc::clone(&overlay));
                    lock(&overlays).push(AttachedOverlay {
                        mode_id,
                        overlay,
                        view,
                    });
                    tracing::debug!(mode_id, "ID capture overlay attached");
                }
                Err(e) => {
                    tracing::error!(mode_id, "Unable to add the ID capture overlay: {}", e);
                }
            }
        }));
    }

    fn remove_overlay(&self, overlay_json: &str) {
        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(overlay_json) else {
            return;
        };
        if map.get("type").and_then(Value::as_str) != Some(ID_CAPTURE_TYPE) {
            return;
        }
        match map.get("modeId").and_then(Value::as_i64).filter(|id| *id != -1) {
            Some(mode_id) => self.detach_overlays(|attached| attached.mode_id == mode_id),
            None => self.detach_overlays(|_| true),
        }
    }

    /// Detach matching overlays from their views on the view context.
    fn detach_overlays(&self, matches: impl Fn(&AttachedOverlay) -> bool) {
        let detached: Vec<AttachedOverlay> = {
            let mut overlays = lock(&self.overlays);
            let (detached, kept): (Vec<_>, Vec<_>) =
                overlays.drain(..).partition(|attached| matches(attached));
            *overlays = kept;
            detached
        };
        if detached.is_empty() {
            return;
        }

        self.dispatcher.run(Box::new(move || {
            for attached in detached {
                attached.view.remove_overlay(&attached.overlay);
                tracing::debug!(mode_id = attached.mode_id, "ID capture overlay detached");
            }
        }));
    }
}

impl LifecycleObserver for IdCaptureModule {
    fn context_deserialized(&self, context: Arc<dyn DataCaptureContext>) {
        self.set_context(Some(context));
    }

    fn context_disposed(&self) {
        self.set_context(None);
        *lock(&self.verifier) = None;
    }

    fn mode_added(&self, mode_json: &str) {
        self.add_mode(mode_json);
    }

    fn mode_removed(&self, mode_json: &str) {
        self.remove_mode(mode_json);
    }

    fn all_modes_removed(&self) {
        self.dispose_all_modes();
    }

    fn overlay_added(&self, overlay_json: &str, view: Arc<dyn CaptureView>) {
        self.add_overlay(overlay_json, view);
    }

    fn overlay_removed(&self, overlay_json: &str) {
        self.remove_overlay(overlay_json);
    }

    fn all_overlays_removed(&self) {
        self.detach_overlays(|_| true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::InlineDispatcher;
    use crate::testing::{FakeContext, FakeDeserializer, FakeVerification, FakeVerifier, FakeView};
    use crate::NativeError;
    use idbridge_events::NullEventBus;

    struct Harness {
        module: Arc<IdCaptureModule>,
        lifecycle: LifecycleDispatcher,
        deserializer: Arc<FakeDeserializer>,
        context: Arc<FakeContext>,
    }

    fn harness(verification: Option<Arc<dyn VerificationProvider>>) -> Harness {
        let deserializer = Arc::new(FakeDeserializer::new());
        let module = Arc::new(IdCaptureModule::new(
            Arc::new(Emitter::new(Arc::new(NullEventBus))),
            NativeBindings {
                deserializer: deserializer.clone(),
                dispatcher: Arc::new(InlineDispatcher),
                verification,
            },
            &BridgeConfig::default(),
        ));
        let lifecycle = LifecycleDispatcher::new();
        module.did_start(&lifecycle);

        let context = Arc::new(FakeContext::new());
        lifecycle.notify_context_deserialized(context.clone());
        Harness {
            module,
            lifecycle,
            deserializer,
            context,
        }
    }

    #[test]
    fn test_mode_added_and_removed() {
        let h = harness(None);
        h.lifecycle
            .notify_mode_added(r#"{"type":"idCapture","modeId":1,"enabled":true}"#);

        assert!(h.module.is_mode_enabled(1));
        assert_eq!(h.context.mode_count(), 1);

        h.lifecycle
            .notify_mode_removed(r#"{"type":"idCapture","modeId":1}"#);
        assert!(h.module.mode(1).is_none());
        assert_eq!(h.context.mode_count(), 0);
    }

    #[test]
    fn test_mode_without_context_is_absorbed() {
        let h = harness(None);
        h.lifecycle.notify_context_disposed();

        h.lifecycle
            .notify_mode_added(r#"{"type":"idCapture","modeId":1}"#);
        assert!(h.module.modes().is_empty());
    }

    #[test]
    fn test_failed_mode_creation_is_absorbed() {
        let h = harness(None);
        h.deserializer.fail_next("bad mode");

        h.lifecycle
            .notify_mode_added(r#"{"type":"idCapture","modeId":1}"#);
        assert!(h.module.mode(1).is_none());
    }

    #[test]
    fn test_reused_mode_id_disposes_previous() {
        let h = harness(None);
        h.lifecycle
            .notify_mode_added(r#"{"type":"idCapture","modeId":1}"#);
        h.lifecycle
            .notify_mode_added(r#"{"type":"idCapture","modeId":1}"#);

        assert_eq!(h.module.modes().len(), 1);
        assert_eq!(h.context.mode_count(), 1);
        assert_eq!(h.context.removed_count(), 1);
    }

    #[test]
    fn test_topmost_mode() {
        let h = harness(None);
        assert!(!h.module.is_topmost_mode_enabled());

        h.lifecycle
            .notify_mode_added(r#"{"type":"idCapture","modeId":1,"enabled":true}"#);
        h.lifecycle
            .notify_mode_added(r#"{"type":"idCapture","modeId":2}"#);
        assert!(!h.module.is_topmost_mode_enabled());

        h.module.set_topmost_mode_enabled(true);
        assert!(h.module.is_mode_enabled(2));
    }

    #[test]
    fn test_overlay_attached_with_text_hints() {
        let h = harness(None);
        h.lifecycle
            .notify_mode_added(r#"{"type":"idCapture","modeId":1}"#);

        let view = Arc::new(FakeView::new(None));
        h.lifecycle.notify_overlay_added(
            r#"{"type":"idCapture","modeId":1,"frontSideTextHint":"Scan front","showTextHints":false}"#,
            view.clone(),
        );

        assert_eq!(view.overlay_count(), 1);
        let state = h.deserializer.overlays()[0].state();
        assert_eq!(state.front_side_text_hint.as_deref(), Some("Scan front"));
        assert_eq!(state.back_side_text_hint, None);
        assert_eq!(state.show_text_hints, Some(false));
    }

    #[test]
    fn test_overlay_deferred_by_mode_id() {
        let h = harness(None);
        let view = Arc::new(FakeView::new(None));
        h.lifecycle
            .notify_overlay_added(r#"{"type":"idCapture","modeId":4}"#, view.clone());

        assert_eq!(view.overlay_count(), 0);
        assert_eq!(h.module.pending_actions(ModeTarget::Id(4)), 1);

        h.lifecycle
            .notify_mode_added(r#"{"type":"idCapture","modeId":4}"#);
        assert_eq!(view.overlay_count(), 1);
        assert_eq!(h.module.pending_actions(ModeTarget::Id(4)), 0);
    }

    #[test]
    fn test_removing_mode_detaches_its_overlay() {
        let h = harness(None);
        h.lifecycle
            .notify_mode_added(r#"{"type":"idCapture","modeId":1}"#);
        let view = Arc::new(FakeView::new(None));
        h.lifecycle
            .notify_overlay_added(r#"{"type":"idCapture","modeId":1}"#, view.clone());

        h.lifecycle
            .notify_mode_removed(r#"{"type":"idCapture","modeId":1}"#);
        assert_eq!(view.overlay_count(), 0);
        assert_eq!(h.module.overlay_count(), 0);
    }

    #[test]
    fn test_overlay_removed_notification() {
        let h = harness(None);
        h.lifecycle
            .notify_mode_added(r#"{"type":"idCapture","modeId":1}"#);
        let view = Arc::new(FakeView::new(None));
        h.lifecycle
            .notify_overlay_added(r#"{"type":"idCapture","modeId":1}"#, view.clone());

        h.lifecycle
            .notify_overlay_removed(r#"{"type":"barcodeCapture","modeId":1}"#);
        assert_eq!(view.overlay_count(), 1);

        h.lifecycle.notify_all_overlays_removed();
        assert_eq!(view.overlay_count(), 0);
    }

    #[test]
    fn test_update_overlay_without_target_uses_first() {
        let h = harness(None);
        h.lifecycle
            .notify_mode_added(r#"{"type":"idCapture","modeId":1}"#);
        let view = Arc::new(FakeView::new(None));
        h.lifecycle
            .notify_overlay_added(r#"{"type":"idCapture","modeId":1}"#, view);

        h.module
            .update_id_capture_overlay(r#"{"type":"idCapture","showTextHints":true}"#)
            .unwrap();
        assert_eq!(h.deserializer.overlay_updates().len(), 1);
    }

    #[test]
    fn test_update_overlay_with_nothing_attached() {
        let h = harness(None);
        h.module
            .update_id_capture_overlay(r#"{"type":"idCapture"}"#)
            .unwrap();
        assert!(h.deserializer.overlay_updates().is_empty());

        let err = h.module.update_id_capture_overlay("{oops").unwrap_err();
        assert_eq!(err.code(), "JSON_ERROR");
    }

    #[test]
    fn test_did_stop_disposes_everything() {
        let h = harness(None);
        h.lifecycle
            .notify_mode_added(r#"{"type":"idCapture","modeId":1}"#);
        h.lifecycle
            .notify_overlay_added(r#"{"type":"idCapture","modeId":9}"#, Arc::new(FakeView::new(None)));

        h.module.did_stop(&h.lifecycle);

        assert!(h.module.modes().is_empty());
        assert_eq!(h.module.pending_actions(ModeTarget::Id(9)), 0);
        assert_eq!(h.lifecycle.observer_count(), 0);
        assert_eq!(h.context.mode_count(), 0);
    }

    #[test]
    fn test_cloud_verification_flow() {
        let provider = Arc::new(FakeVerification::new(FakeVerifier::answering(Ok(Some(
            r#"{"allChecksPassed":true}"#.to_string(),
        )))));
        let h = harness(Some(provider.clone()));

        let err = h.module.verify_captured_id_with_cloud("{}").unwrap_err();
        assert_eq!(err.code(), "VERIFIER_NOT_CREATED");

        h.module.create_aamva_barcode_verifier().unwrap();
        let result = h.module.verify_captured_id_with_cloud("{}").unwrap();
        assert_eq!(result, r#"{"allChecksPassed":true}"#);
        assert_eq!(provider.verifier().calls(), 1);

        h.lifecycle.notify_context_disposed();
        let err = h.module.verify_captured_id_with_cloud("{}").unwrap_err();
        assert_eq!(err.code(), "VERIFIER_NOT_CREATED");
    }

    #[test]
    fn test_cloud_verification_without_answer() {
        let provider = Arc::new(FakeVerification::new(FakeVerifier::answering(Ok(None))));
        let h = harness(Some(provider));
        h.module.create_aamva_barcode_verifier().unwrap();

        let err = h.module.verify_captured_id_with_cloud("{}").unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_VERIFICATION_RESULT");
    }

    #[test]
    fn test_cloud_verification_error_is_forwarded() {
        let failure = NativeError::Verification("service down".to_string());
        let provider = Arc::new(FakeVerification::new(FakeVerifier::answering(Err(
            failure.clone(),
        ))));
        let h = harness(Some(provider));
        h.module.create_aamva_barcode_verifier().unwrap();

        let err = h.module.verify_captured_id_with_cloud("{}").unwrap_err();
        assert_eq!(err.to_string(), failure.to_string());
    }

    #[test]
    fn test_viz_verification_needs_provider_and_context() {
        let h = harness(None);
        let err = h.module.verify_captured_id_aamva_viz("{}").unwrap_err();
        assert_eq!(err.code(), "VERIFICATION_UNAVAILABLE");

        let provider = Arc::new(FakeVerification::new(FakeVerifier::answering(Ok(None))));
        let h = harness(Some(provider));
        assert!(h
            .module
            .verify_captured_id_mrz_viz("{}")
            .unwrap()
            .contains("vizMrz"));

        h.lifecycle.notify_context_disposed();
        let err = h.module.verify_captured_id_aamva_viz("{}").unwrap_err();
        assert_eq!(err.code(), "CONTEXT_UNAVAILABLE");
    }
}
