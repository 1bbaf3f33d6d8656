//! Mode settings and feedback data model.
//!
//! These mirror the JSON the host sends in `applyIdCaptureModeSettings` and
//! `updateFeedback`. Unknown keys are rejected so a typo surfaces as a
//! deserialization error instead of a silently ignored setting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::NativeError;

/// How much of a captured document is anonymized before it leaves the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnonymizationMode {
    None,
    #[default]
    FieldsOnly,
    ImagesOnly,
    FieldsAndImages,
}

/// Documents expiring within this window are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpiryWindow {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct IdCaptureSettings {
    pub anonymization_mode: AnonymizationMode,
    pub reject_voided_ids: bool,
    pub reject_expired_ids: bool,
    pub reject_ids_expiring_in: Option<ExpiryWindow>,
    pub reject_not_real_id_compliant: bool,
    pub reject_forged_aamva_barcodes: bool,
    pub reject_inconsistent_data: bool,
    pub reject_holder_below_age: Option<u32>,
    pub decode_back_of_european_driving_license: bool,
    /// Document selectors; their shape belongs to the native engine.
    pub accepted_documents: Vec<serde_json::Value>,
    pub rejected_documents: Vec<serde_json::Value>,
    pub scanner: Option<serde_json::Value>,
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl Default for IdCaptureSettings {
    fn default() -> Self {
        Self {
            anonymization_mode: AnonymizationMode::default(),
            reject_voided_ids: false,
            reject_expired_ids: false,
            reject_ids_expiring_in: None,
            reject_not_real_id_compliant: false,
            reject_forged_aamva_barcodes: false,
            reject_inconsistent_data: false,
            reject_holder_below_age: None,
            decode_back_of_european_driving_license: false,
            accepted_documents: Vec::new(),
            rejected_documents: Vec::new(),
            scanner: None,
            properties: BTreeMap::new(),
        }
    }
}

impl IdCaptureSettings {
    pub fn from_json(json: &str) -> Result<Self, NativeError> {
        serde_json::from_str(json).map_err(|e| NativeError::Deserialization(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sound {
    /// Bundled resource name; `None` plays the engine's default beep.
    pub resource: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vibration {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Feedback {
    pub sound: Option<Sound>,
    pub vibration: Option<Vibration>,
}

impl Feedback {
    fn default_sound_and_vibration() -> Self {
        Self {
            sound: Some(Sound { resource: None }),
            vibration: Some(Vibration {
                kind: "default".to_string(),
            }),
        }
    }
}

/// Audio/haptic feedback of a mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct IdCaptureFeedback {
    pub id_captured: Feedback,
    pub id_rejected: Feedback,
}

impl Default for IdCaptureFeedback {
    fn default() -> Self {
        Self {
            id_captured: Feedback::default_sound_and_vibration(),
            id_rejected: Feedback::default_sound_and_vibration(),
        }
    }
}

impl IdCaptureFeedback {
    pub fn from_json(json: &str) -> Result<Self, NativeError> {
        serde_json::from_str(json).map_err(|e| NativeError::Deserialization(e.to_string()))
    }
}
