//! Traits for the native SDK the bridge drives.
//!
//! The recognition engine, its JSON deserializer, the capture context and the
//! capture view are closed-source. The bridge only sees them through these
//! traits; platform glue implements them, tests use [`crate::testing`].

use std::sync::Arc;

use idbridge_events::RejectionReason;

use crate::error::NativeError;
use crate::settings::{IdCaptureFeedback, IdCaptureSettings};
use crate::types::{CapturedId, TextHintPosition};

/// Callback hooks the native mode invokes from its capture pipeline.
///
/// The returned bool tells the engine how to continue the session. Both calls
/// may block the pipeline thread until the host answers.
pub trait IdCaptureObserver: Send + Sync {
    fn did_capture_id(&self, captured: &CapturedId) -> bool;

    fn did_reject_id(&self, captured: Option<&CapturedId>, reason: RejectionReason) -> bool;
}

/// One native ID capture mode instance.
pub trait NativeIdCapture: Send + Sync {
    fn is_enabled(&self) -> bool;

    fn set_enabled(&self, enabled: bool);

    fn add_listener(&self, listener: Arc<dyn IdCaptureObserver>);

    fn remove_listener(&self, listener: &Arc<dyn IdCaptureObserver>);

    fn apply_settings(&self, settings: &IdCaptureSettings);

    fn set_feedback(&self, feedback: IdCaptureFeedback);

    /// Clear accumulated session state (e.g. front side already scanned).
    fn reset(&self);
}

/// The shared capture context modes attach to.
pub trait DataCaptureContext: Send + Sync {
    fn add_mode(&self, mode: &Arc<dyn NativeIdCapture>);

    fn remove_mode(&self, mode: &Arc<dyn NativeIdCapture>);
}

/// Overlay drawing capture feedback over the camera preview.
///
/// Only ever touched from the view execution context.
pub trait NativeOverlay: Send + Sync {
    fn set_front_side_text_hint(&self, hint: &str);

    fn set_back_side_text_hint(&self, hint: &str);

    fn set_text_hint_position(&self, position: TextHintPosition);

    fn set_show_text_hints(&self, show: bool);
}

/// A capture view overlays are attached to.
pub trait CaptureView: Send + Sync {
    /// Groups the view with the modes created for it.
    fn parent_id(&self) -> Option<i64>;

    fn add_overlay(&self, overlay: Arc<dyn NativeOverlay>);

    fn remove_overlay(&self, overlay: &Arc<dyn NativeOverlay>);
}

/// JSON (de)serializer of the native SDK.
pub trait IdCaptureDeserializer: Send + Sync {
    /// Build a native mode from its full JSON descriptor.
    fn mode(
        &self,
        json: &str,
        context: &Arc<dyn DataCaptureContext>,
    ) -> Result<Arc<dyn NativeIdCapture>, NativeError>;

    /// Merge a JSON fragment into an existing mode.
    fn update_mode(&self, mode: &dyn NativeIdCapture, json: &str) -> Result<(), NativeError>;

    fn settings(&self, json: &str) -> Result<IdCaptureSettings, NativeError> {
        IdCaptureSettings::from_json(json)
    }

    fn feedback(&self, json: &str) -> Result<IdCaptureFeedback, NativeError> {
        IdCaptureFeedback::from_json(json)
    }

    fn overlay(
        &self,
        json: &str,
        mode: &Arc<dyn NativeIdCapture>,
    ) -> Result<Arc<dyn NativeOverlay>, NativeError>;

    fn update_overlay(&self, overlay: &dyn NativeOverlay, json: &str) -> Result<(), NativeError>;
}

/// Cloud verification of a captured AAMVA barcode.
pub trait BarcodeVerifier: Send + Sync {
    /// Verify a captured id given as JSON.
    ///
    /// `Ok(None)` means the service answered with neither result nor error.
    fn verify(&self, captured_id_json: &str) -> Result<Option<String>, NativeError>;
}

/// Factory for the verification services the engine ships.
pub trait VerificationProvider: Send + Sync {
    fn aamva_barcode_verifier(
        &self,
        context: &Arc<dyn DataCaptureContext>,
    ) -> Result<Arc<dyn BarcodeVerifier>, NativeError>;

    /// Compare the printed (VIZ) data with the AAMVA barcode of a captured id.
    fn compare_viz_with_barcode(
        &self,
        context: &Arc<dyn DataCaptureContext>,
        captured_id_json: &str,
    ) -> Result<String, NativeError>;

    /// Compare the printed (VIZ) data with the MRZ of a captured id.
    fn compare_viz_with_mrz(
        &self,
        context: &Arc<dyn DataCaptureContext>,
        captured_id_json: &str,
    ) -> Result<String, NativeError>;
}
