//! Defaults surface handed to the host at startup.
//!
//! The host builds its mode, overlay and camera objects from these values, so
//! key names are part of the protocol.

use serde::Serialize;

use crate::settings::{IdCaptureFeedback, IdCaptureSettings};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraSettingsDefaults {
    pub preferred_resolution: &'static str,
    pub zoom_factor: f32,
    pub focus_range: &'static str,
    pub zoom_gesture_zoom_factor: f32,
    pub focus_gesture_strategy: &'static str,
    pub should_prefer_smooth_auto_focus: bool,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrushDefaults {
    pub fill_color: &'static str,
    pub stroke_color: &'static str,
    pub stroke_width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayDefaults {
    #[serde(rename = "DefaultCapturedBrush")]
    pub captured_brush: BrushDefaults,
    #[serde(rename = "DefaultLocalizedBrush")]
    pub localized_brush: BrushDefaults,
    #[serde(rename = "DefaultRejectedBrush")]
    pub rejected_brush: BrushDefaults,
    #[serde(rename = "defaultIdLayoutStyle")]
    pub id_layout_style: &'static str,
    #[serde(rename = "defaultIdLayoutLineStyle")]
    pub id_layout_line_style: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdCaptureDefaults {
    #[serde(rename = "RecommendedCameraSettings")]
    pub recommended_camera_settings: CameraSettingsDefaults,
    #[serde(rename = "IdCaptureFeedback")]
    pub feedback: IdCaptureFeedback,
    #[serde(rename = "IdCaptureOverlay")]
    pub overlay: OverlayDefaults,
    #[serde(rename = "IdCaptureSettings")]
    pub settings: IdCaptureSettings,
}

impl Default for IdCaptureDefaults {
    fn default() -> Self {
        Self {
            recommended_camera_settings: CameraSettingsDefaults {
                preferred_resolution: "uhd4k",
                zoom_factor: 1.0,
                focus_range: "full",
                zoom_gesture_zoom_factor: 2.0,
                focus_gesture_strategy: "manualUntilCapture",
                should_prefer_smooth_auto_focus: false,
                properties: serde_json::Map::new(),
            },
            feedback: IdCaptureFeedback::default(),
            overlay: OverlayDefaults {
                captured_brush: BrushDefaults {
                    fill_color: "#28D38066",
                    stroke_color: "#28D380FF",
                    stroke_width: 3.0,
                },
                localized_brush: BrushDefaults {
                    fill_color: "#FFFFFF33",
                    stroke_color: "#FFFFFFFF",
                    stroke_width: 3.0,
                },
                rejected_brush: BrushDefaults {
                    fill_color: "#FA445666",
                    stroke_color: "#FA4456FF",
                    stroke_width: 3.0,
                },
                id_layout_style: "rounded",
                id_layout_line_style: "light",
            },
            settings: IdCaptureSettings::default(),
        }
    }
}

impl IdCaptureDefaults {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
