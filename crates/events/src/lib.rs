//! Shared event contracts for the ID capture bridge.
//!
//! This crate defines the formal contracts (DTOs) for events that leave the
//! bridge, so the host side and the Rust side agree on field names.
//!
//! Also provides the `EventBus` trait for decoupled event emission and the
//! `Emitter`, which tracks which host listeners are registered.

mod bus;
mod emitter;

pub use bus::{EmittedEvent, EventBus, EventBusRef, InMemoryEventBus, NullEventBus};
pub use emitter::Emitter;

use serde::{Deserialize, Serialize};

/// Why the native engine rejected a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectionReason {
    Timeout,
    NotAcceptedDocumentType,
    InvalidFormat,
    DocumentVoided,
    SingleImageNotRecognized,
    DocumentExpired,
    DocumentExpiresSoon,
    NotRealIdCompliant,
    HolderUnderage,
    ForgedAamvaBarcode,
    InconsistentData,
}

impl RejectionReason {
    /// Wire name, as it appears in `rejectionReason`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::Timeout => "timeout",
            RejectionReason::NotAcceptedDocumentType => "notAcceptedDocumentType",
            RejectionReason::InvalidFormat => "invalidFormat",
            RejectionReason::DocumentVoided => "documentVoided",
            RejectionReason::SingleImageNotRecognized => "singleImageNotRecognized",
            RejectionReason::DocumentExpired => "documentExpired",
            RejectionReason::DocumentExpiresSoon => "documentExpiresSoon",
            RejectionReason::NotRealIdCompliant => "notRealIdCompliant",
            RejectionReason::HolderUnderage => "holderUnderage",
            RejectionReason::ForgedAamvaBarcode => "forgedAamvaBarcode",
            RejectionReason::InconsistentData => "inconsistentData",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File references for the images of one document side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontImages {
    pub face: Option<String>,
    pub frame: Option<String>,
    pub cropped_document: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackImages {
    pub cropped_document: Option<String>,
    pub frame: Option<String>,
}

/// Image file references sent instead of inlined image data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub front: FrontImages,
    pub back: BackImages,
}

/// Payload of [`event_names::DID_CAPTURE_ID`].
///
/// Producers: the ID capture listener of one mode
/// Consumers: host `didCaptureId` callback, which answers with
/// `finishDidCaptureCallback`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidCaptureIdEvent {
    pub mode_id: i64,
    /// Captured id as a JSON string; without images when `image_info` is set.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_info: Option<ImageInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_review_image: Option<String>,
}

/// Payload of [`event_names::DID_REJECT_ID`].
///
/// Producers: the ID capture listener of one mode
/// Consumers: host `didRejectId` callback, which answers with
/// `finishDidRejectCallback`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidRejectIdEvent {
    pub mode_id: i64,
    pub rejection_reason: RejectionReason,
    /// Rejected document, when the engine got far enough to read one.
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_info: Option<ImageInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_review_image: Option<String>,
}

/// Event names as constants to prevent typos.
pub mod event_names {
    /// A document was captured.
    pub const DID_CAPTURE_ID: &str = "IdCaptureListener.didCaptureId";
    /// A document was rejected.
    pub const DID_REJECT_ID: &str = "IdCaptureListener.didRejectId";

    /// Events a mode-specific `addIdCaptureListener` subscribes to.
    pub const ID_CAPTURE_LISTENER_EVENTS: &[&str] = &[DID_CAPTURE_ID, DID_REJECT_ID];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_reason_wire_names_match_serde() {
        let reasons = [
            RejectionReason::Timeout,
            RejectionReason::NotAcceptedDocumentType,
            RejectionReason::InvalidFormat,
            RejectionReason::DocumentVoided,
            RejectionReason::SingleImageNotRecognized,
            RejectionReason::DocumentExpired,
            RejectionReason::DocumentExpiresSoon,
            RejectionReason::NotRealIdCompliant,
            RejectionReason::HolderUnderage,
            RejectionReason::ForgedAamvaBarcode,
            RejectionReason::InconsistentData,
        ];
        for reason in reasons {
            let json = serde_json::to_value(reason).unwrap();
            assert_eq!(json, reason.as_str());
        }
    }

    #[test]
    fn test_capture_event_without_images_omits_image_info() {
        let event = DidCaptureIdEvent {
            mode_id: 3,
            id: "{}".to_string(),
            image_info: None,
            front_review_image: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["modeId"], 3);
        assert!(json.get("imageInfo").is_none());
    }

    #[test]
    fn test_reject_event_keeps_null_id() {
        let event = DidRejectIdEvent {
            mode_id: 1,
            rejection_reason: RejectionReason::DocumentExpired,
            id: None,
            image_info: None,
            front_review_image: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["rejectionReason"], "documentExpired");
        assert!(json["id"].is_null());
    }

    #[test]
    fn test_image_info_layout() {
        let info = ImageInfo {
            front: FrontImages {
                face: Some("/tmp/face.png".to_string()),
                ..Default::default()
            },
            back: BackImages::default(),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["front"]["face"], "/tmp/face.png");
        assert!(json["front"]["croppedDocument"].is_null());
        assert!(json["back"]["frame"].is_null());
    }
}
