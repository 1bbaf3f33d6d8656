//! Descriptors announced by the capture context lifecycle.
//!
//! Both descriptors are matched on `"type": "idCapture"`; anything else
//! belongs to another capture module and parses to `None`.

use serde_json::Value;

use crate::native::NativeOverlay;
use crate::types::TextHintPosition;

pub const ID_CAPTURE_TYPE: &str = "idCapture";

/// Ids at or below this value mean "not set" on the wire.
const UNSET_ID: i64 = -1;

fn parse_object(json: &str) -> Option<serde_json::Map<String, Value>> {
    match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("Ignoring unparsable descriptor: {}", e);
            None
        }
    }
}

fn is_id_capture(map: &serde_json::Map<String, Value>) -> bool {
    map.get("type").and_then(Value::as_str) == Some(ID_CAPTURE_TYPE)
}

fn id_field(map: &serde_json::Map<String, Value>, key: &str) -> Option<i64> {
    map.get(key)
        .and_then(Value::as_i64)
        .filter(|id| *id != UNSET_ID)
}

fn bool_field(map: &serde_json::Map<String, Value>, key: &str, default: bool) -> bool {
    map.get(key).and_then(Value::as_bool).unwrap_or(default)
}

/// A mode descriptor from "mode added".
#[derive(Debug, Clone, PartialEq)]
pub struct ModeCreationData {
    /// Full descriptor, handed as-is to the native deserializer.
    pub mode_json: String,
    pub mode_id: i64,
    pub parent_id: Option<i64>,
    pub is_enabled: bool,
    pub has_listeners: bool,
}

impl ModeCreationData {
    /// Parse a mode descriptor; `None` if it is not an ID capture mode.
    ///
    /// # Panics
    ///
    /// If an `idCapture` descriptor carries no `modeId`. The host always
    /// assigns one, so a missing id is a broken caller, not bad input.
    pub fn from_json(mode_json: &str) -> Option<Self> {
        let map = parse_object(mode_json)?;
        if !is_id_capture(&map) {
            return None;
        }

        let mode_id = id_field(&map, "modeId");
        assert!(mode_id.is_some(), "idCapture mode descriptor without modeId");

        Some(Self {
            mode_json: mode_json.to_string(),
            mode_id: mode_id.unwrap_or(UNSET_ID),
            parent_id: id_field(&map, "parentId"),
            is_enabled: bool_field(&map, "enabled", false),
            has_listeners: bool_field(&map, "hasListeners", false),
        })
    }
}

/// Mode id of a "mode removed" descriptor, if it is an ID capture mode.
pub fn removed_mode_id(mode_json: &str) -> Option<i64> {
    let map = parse_object(mode_json)?;
    if !is_id_capture(&map) {
        return None;
    }
    id_field(&map, "modeId")
}

/// An overlay descriptor from "overlay added" or `updateIdCaptureOverlay`.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayCreationData {
    pub overlay_json: String,
    pub mode_id: Option<i64>,
    pub parent_id: Option<i64>,
    pub show_text_hints: bool,
    pub front_side_text_hint: Option<String>,
    pub back_side_text_hint: Option<String>,
    pub text_hint_position: Option<TextHintPosition>,
}

impl OverlayCreationData {
    pub fn from_json(overlay_json: &str) -> Option<Self> {
        let map = parse_object(overlay_json)?;
        if !is_id_capture(&map) {
            return None;
        }

        // A present but non-string hint clears the hint.
        let hint = |key: &str| {
            map.get(key)
                .map(|v| v.as_str().unwrap_or_default().to_string())
        };

        Some(Self {
            overlay_json: overlay_json.to_string(),
            mode_id: id_field(&map, "modeId"),
            parent_id: id_field(&map, "parentId"),
            show_text_hints: bool_field(&map, "showTextHints", true),
            front_side_text_hint: hint("frontSideTextHint"),
            back_side_text_hint: hint("backSideTextHint"),
            text_hint_position: map
                .get("textHintPosition")
                .map(|v| TextHintPosition::from_json_str(v.as_str().unwrap_or_default())),
        })
    }

    /// Apply the hint overrides carried next to the native overlay JSON.
    pub fn apply_text_hints(&self, overlay: &dyn NativeOverlay) {
        if let Some(hint) = &self.front_side_text_hint {
            overlay.set_front_side_text_hint(hint);
        }
        if let Some(hint) = &self.back_side_text_hint {
            overlay.set_back_side_text_hint(hint);
        }
        if let Some(position) = self.text_hint_position {
            overlay.set_text_hint_position(position);
        }
        overlay.set_show_text_hints(self.show_text_hints);
    }
}
