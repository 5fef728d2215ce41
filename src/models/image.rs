use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicI64, Ordering};
use uuid::Uuid;

use super::settings::GenerationSettings;
use crate::error::{Result, StudioError};

pub const PNG_MIME_TYPE: &str = "image/png";

static LAST_TIMESTAMP: AtomicI64 = AtomicI64::new(0);

/// Current unix time in milliseconds, never lower than a previously returned value.
pub fn next_timestamp() -> i64 {
    let now = Utc::now().timestamp_millis();
    let previous = LAST_TIMESTAMP.fetch_max(now, Ordering::SeqCst);
    previous.max(now)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub id: String,
    pub base64_data: String,
    pub settings: GenerationSettings,
    pub timestamp: i64,
    pub model: String,
}

impl GeneratedImage {
    /// Returns `None` when `base64_data` is empty.
    pub fn new(
        base64_data: impl Into<String>,
        settings: GenerationSettings,
        model: impl Into<String>,
    ) -> Option<Self> {
        let base64_data = base64_data.into();
        if base64_data.is_empty() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4().to_string(),
            base64_data,
            settings,
            timestamp: next_timestamp(),
            model: model.into(),
        })
    }

    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(self.base64_data.trim())
            .map_err(|e| StudioError::ResponseError(format!("Invalid base64 image data: {}", e)))
    }

    pub fn download_file_name(&self) -> String {
        let short: String = self.id.chars().take(8).collect();
        format!("text2image-{}.png", short)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    #[serde(flatten)]
    pub image: GeneratedImage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl HistoryItem {
    pub fn id(&self) -> &str {
        &self.image.id
    }

    pub fn is_favorite(&self) -> bool {
        self.is_favorite.unwrap_or(false)
    }
}

impl From<GeneratedImage> for HistoryItem {
    fn from(image: GeneratedImage) -> Self {
        Self {
            image,
            is_favorite: None,
        }
    }
}

/// Image-specialist call (Imagen `:predict`).
#[derive(Debug, Clone, PartialEq)]
pub struct ImagenRequest {
    pub model: String,
    pub prompt: String,
    pub number_of_images: u32,
    pub output_mime_type: String,
    pub aspect_ratio: String,
}

impl ImagenRequest {
    pub fn single_png(
        model: impl Into<String>,
        prompt: impl Into<String>,
        aspect_ratio: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            number_of_images: 1,
            output_mime_type: PNG_MIME_TYPE.to_string(),
            aspect_ratio: aspect_ratio.into(),
        }
    }

    pub fn to_body(&self) -> Value {
        json!({
            "instances": [
                { "prompt": self.prompt }
            ],
            "parameters": {
                "sampleCount": self.number_of_images,
                "aspectRatio": self.aspect_ratio,
                "outputOptions": {
                    "mimeType": self.output_mime_type
                }
            }
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagenResponse {
    #[serde(default)]
    pub predictions: Vec<ImagenPrediction>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagenPrediction {
    #[serde(default)]
    pub bytes_base64_encoded: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub rai_filtered_reason: Option<String>,
}

impl ImagenResponse {
    /// Payload of the first prediction, if there is one.
    pub fn first_image(&self) -> Option<&str> {
        self.predictions
            .first()
            .and_then(|p| p.bytes_base64_encoded.as_deref())
            .filter(|data| !data.is_empty())
    }
}
