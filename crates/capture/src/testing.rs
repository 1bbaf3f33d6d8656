//! In-memory stand-ins for the native SDK.
//!
//! They record what the bridge asked of them and let a test fire recognition
//! callbacks the way the capture pipeline would.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use idbridge_events::RejectionReason;

use crate::error::NativeError;
use crate::native::{
    BarcodeVerifier, CaptureView, DataCaptureContext, IdCaptureDeserializer, IdCaptureObserver,
    NativeIdCapture, NativeOverlay, VerificationProvider,
};
use crate::settings::{IdCaptureFeedback, IdCaptureSettings};
use crate::types::{CapturedId, TextHintPosition};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn same_object<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

fn parse(json: &str) -> Result<serde_json::Value, NativeError> {
    serde_json::from_str(json).map_err(|e| NativeError::Deserialization(e.to_string()))
}

#[derive(Default)]
pub struct FakeIdCapture {
    json: String,
    enabled: AtomicBool,
    listeners: Mutex<Vec<Arc<dyn IdCaptureObserver>>>,
    settings: Mutex<Option<IdCaptureSettings>>,
    feedback: Mutex<Option<IdCaptureFeedback>>,
    resets: AtomicUsize,
}

impl FakeIdCapture {
    pub fn new(json: impl Into<String>) -> Self {
        Self {
            json: json.into(),
            ..Default::default()
        }
    }

    pub fn json(&self) -> &str {
        &self.json
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    pub fn settings(&self) -> Option<IdCaptureSettings> {
        lock(&self.settings).clone()
    }

    pub fn feedback(&self) -> Option<IdCaptureFeedback> {
        lock(&self.feedback).clone()
    }

    pub fn reset_count(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    fn observers(&self) -> Vec<Arc<dyn IdCaptureObserver>> {
        lock(&self.listeners).clone()
    }

    /// Report a captured document to every attached listener.
    pub fn trigger_captured(&self, captured: &CapturedId) -> Vec<bool> {
        self.observers()
            .iter()
            .map(|observer| observer.did_capture_id(captured))
            .collect()
    }

    /// Report a rejection to every attached listener.
    pub fn trigger_rejected(
        &self,
        captured: Option<&CapturedId>,
        reason: RejectionReason,
    ) -> Vec<bool> {
        self.observers()
            .iter()
            .map(|observer| observer.did_reject_id(captured, reason))
            .collect()
    }
}

impl NativeIdCapture for FakeIdCapture {
    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn add_listener(&self, listener: Arc<dyn IdCaptureObserver>) {
        lock(&self.listeners).push(listener);
    }

    fn remove_listener(&self, listener: &Arc<dyn IdCaptureObserver>) {
        lock(&self.listeners).retain(|existing| !same_object(existing, listener));
    }

    fn apply_settings(&self, settings: &IdCaptureSettings) {
        *lock(&self.settings) = Some(settings.clone());
    }

    fn set_feedback(&self, feedback: IdCaptureFeedback) {
        *lock(&self.feedback) = Some(feedback);
    }

    fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeContext {
    modes: Mutex<Vec<Arc<dyn NativeIdCapture>>>,
    removed: AtomicUsize,
}

impl FakeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode_count(&self) -> usize {
        lock(&self.modes).len()
    }

    pub fn removed_count(&self) -> usize {
        self.removed.load(Ordering::SeqCst)
    }
}

impl DataCaptureContext for FakeContext {
    fn add_mode(&self, mode: &Arc<dyn NativeIdCapture>) {
        lock(&self.modes).push(Arc::clone(mode));
    }

    fn remove_mode(&self, mode: &Arc<dyn NativeIdCapture>) {
        let mut modes = lock(&self.modes);
        let before = modes.len();
        modes.retain(|existing| !same_object(existing, mode));
        if modes.len() < before {
            self.removed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayState {
    pub front_side_text_hint: Option<String>,
    pub back_side_text_hint: Option<String>,
    pub text_hint_position: Option<TextHintPosition>,
    pub show_text_hints: Option<bool>,
}

pub struct FakeOverlay {
    json: String,
    state: Mutex<OverlayState>,
}

impl FakeOverlay {
    pub fn new(json: impl Into<String>) -> Self {
        Self {
            json: json.into(),
            state: Mutex::new(OverlayState::default()),
        }
    }

    pub fn json(&self) -> &str {
        &self.json
    }

    pub fn state(&self) -> OverlayState {
        lock(&self.state).clone()
    }
}

impl NativeOverlay for FakeOverlay {
    fn set_front_side_text_hint(&self, hint: &str) {
        lock(&self.state).front_side_text_hint = Some(hint.to_string());
    }

    fn set_back_side_text_hint(&self, hint: &str) {
        lock(&self.state).back_side_text_hint = Some(hint.to_string());
    }

    fn set_text_hint_position(&self, position: TextHintPosition) {
        lock(&self.state).text_hint_position = Some(position);
    }

    fn set_show_text_hints(&self, show: bool) {
        lock(&self.state).show_text_hints = Some(show);
    }
}

/// A capture view that records which thread touched it last.
pub struct FakeView {
    parent_id: Option<i64>,
    overlays: Mutex<Vec<Arc<dyn NativeOverlay>>>,
    last_thread: Mutex<Option<ThreadId>>,
}

impl FakeView {
    pub fn new(parent_id: Option<i64>) -> Self {
        Self {
            parent_id,
            overlays: Mutex::new(Vec::new()),
            last_thread: Mutex::new(None),
        }
    }

    pub fn overlay_count(&self) -> usize {
        lock(&self.overlays).len()
    }

    pub fn last_thread(&self) -> Option<ThreadId> {
        *lock(&self.last_thread)
    }

    fn touch(&self) {
        *lock(&self.last_thread) = Some(thread::current().id());
    }
}

impl CaptureView for FakeView {
    fn parent_id(&self) -> Option<i64> {
        self.parent_id
    }

    fn add_overlay(&self, overlay: Arc<dyn NativeOverlay>) {
        self.touch();
        lock(&self.overlays).push(overlay);
    }

    fn remove_overlay(&self, overlay: &Arc<dyn NativeOverlay>) {
        self.touch();
        lock(&self.overlays).retain(|existing| !same_object(existing, overlay));
    }
}

/// Deserializer building fakes; `enabled` is the only mode key it merges.
#[derive(Default)]
pub struct FakeDeserializer {
    modes: Mutex<Vec<Arc<FakeIdCapture>>>,
    overlays: Mutex<Vec<Arc<FakeOverlay>>>,
    overlay_updates: Mutex<Vec<String>>,
    fail_next: Mutex<Option<String>>,
}

impl FakeDeserializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next mode or overlay construction fail with `message`.
    pub fn fail_next(&self, message: &str) {
        *lock(&self.fail_next) = Some(message.to_string());
    }

    fn take_failure(&self) -> Result<(), NativeError> {
        match lock(&self.fail_next).take() {
            Some(message) => Err(NativeError::Deserialization(message)),
            None => Ok(()),
        }
    }

    pub fn modes(&self) -> Vec<Arc<FakeIdCapture>> {
        lock(&self.modes).clone()
    }

    pub fn last_mode(&self) -> Option<Arc<FakeIdCapture>> {
        lock(&self.modes).last().cloned()
    }

    pub fn overlays(&self) -> Vec<Arc<FakeOverlay>> {
        lock(&self.overlays).clone()
    }

    pub fn overlay_updates(&self) -> Vec<String> {
        lock(&self.overlay_updates).clone()
    }
}

impl IdCaptureDeserializer for FakeDeserializer {
    fn mode(
        &self,
        json: &str,
        _context: &Arc<dyn DataCaptureContext>,
    ) -> Result<Arc<dyn NativeIdCapture>, NativeError> {
        self.take_failure()?;
        parse(json)?;
        let mode = Arc::new(FakeIdCapture::new(json));
        lock(&self.modes).push(Arc::clone(&mode));
        Ok(mode)
    }

    fn update_mode(&self, mode: &dyn NativeIdCapture, json: &str) -> Result<(), NativeError> {
        let value = parse(json)?;
        if let Some(enabled) = value.get("enabled").and_then(serde_json::Value::as_bool) {
            mode.set_enabled(enabled);
        }
        Ok(())
    }

    fn overlay(
        &self,
        json: &str,
        _mode: &Arc<dyn NativeIdCapture>,
    ) -> Result<Arc<dyn NativeOverlay>, NativeError> {
        self.take_failure()?;
        parse(json)?;
        let overlay = Arc::new(FakeOverlay::new(json));
        lock(&self.overlays).push(Arc::clone(&overlay));
        Ok(overlay)
    }

    fn update_overlay(&self, _overlay: &dyn NativeOverlay, json: &str) -> Result<(), NativeError> {
        parse(json)?;
        lock(&self.overlay_updates).push(json.to_string());
        Ok(())
    }
}

pub struct FakeVerifier {
    response: Result<Option<String>, NativeError>,
    calls: AtomicUsize,
}

impl FakeVerifier {
    pub fn answering(response: Result<Option<String>, NativeError>) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BarcodeVerifier for FakeVerifier {
    fn verify(&self, captured_id_json: &str) -> Result<Option<String>, NativeError> {
        parse(captured_id_json)?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

/// Verification services answering with fixed JSON results.
pub struct FakeVerification {
    verifier: Arc<FakeVerifier>,
    created: AtomicUsize,
}

impl FakeVerification {
    pub fn new(verifier: FakeVerifier) -> Self {
        Self {
            verifier: Arc::new(verifier),
            created: AtomicUsize::new(0),
        }
    }

    pub fn verifier(&self) -> &Arc<FakeVerifier> {
        &self.verifier
    }

    pub fn verifiers_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl VerificationProvider for FakeVerification {
    fn aamva_barcode_verifier(
        &self,
        _context: &Arc<dyn DataCaptureContext>,
    ) -> Result<Arc<dyn BarcodeVerifier>, NativeError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(self.verifier.clone())
    }

    fn compare_viz_with_barcode(
        &self,
        _context: &Arc<dyn DataCaptureContext>,
        captured_id_json: &str,
    ) -> Result<String, NativeError> {
        parse(captured_id_json)?;
        Ok(r#"{"checksPassed":true,"comparison":"vizBarcode"}"#.to_string())
    }

    fn compare_viz_with_mrz(
        &self,
        _context: &Arc<dyn DataCaptureContext>,
        captured_id_json: &str,
    ) -> Result<String, NativeError> {
        parse(captured_id_json)?;
        Ok(r#"{"checksPassed":true,"comparison":"vizMrz"}"#.to_string())
    }
}
