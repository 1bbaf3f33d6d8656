//! Value snapshots produced by the native engine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Encoded image bytes (PNG), shared without copying.
pub type ImageBytes = Arc<[u8]>;

/// Images the engine attached to a captured document.
#[derive(Debug, Clone, Default)]
pub struct IdImages {
    pub face: Option<ImageBytes>,
    pub front_frame: Option<ImageBytes>,
    pub front_cropped_document: Option<ImageBytes>,
    pub back_cropped_document: Option<ImageBytes>,
    pub back_frame: Option<ImageBytes>,
}

/// One captured (or rejected) document, as the engine reported it.
#[derive(Debug, Clone)]
pub struct CapturedId {
    /// Full JSON document, images inlined.
    pub json: String,
    /// Same document with image fields stripped.
    pub json_without_images: String,
    pub images: IdImages,
    /// Review image from the data consistency check, when one was produced.
    pub front_review_image: Option<ImageBytes>,
}

impl CapturedId {
    /// Snapshot without images, mostly useful for tests and fakes.
    pub fn from_json(json: impl Into<String>) -> Self {
        let json = json.into();
        Self {
            json_without_images: json.clone(),
            json,
            images: IdImages::default(),
            front_review_image: None,
        }
    }
}

/// Where the overlay places its text hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextHintPosition {
    #[default]
    AboveViewfinder,
    BelowViewfinder,
}

impl TextHintPosition {
    /// Parse a wire value; unknown values fall back to above the viewfinder.
    pub fn from_json_str(value: &str) -> Self {
        match value {
            "belowViewfinder" => TextHintPosition::BelowViewfinder,
            _ => TextHintPosition::AboveViewfinder,
        }
    }
}
