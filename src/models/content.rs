use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Generic content call (Gemini `:generateContent`) carrying one text part.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRequest {
    pub model: String,
    pub text: String,
    pub aspect_ratio: String,
}

impl ContentRequest {
    pub fn new(
        model: impl Into<String>,
        text: impl Into<String>,
        aspect_ratio: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            text: text.into(),
            aspect_ratio: aspect_ratio.into(),
        }
    }

    pub fn to_body(&self) -> Value {
        json!({
            "contents": [{
                "parts": [
                    { "text": self.text }
                ]
            }],
            "generationConfig": {
                "imageConfig": {
                    "aspectRatio": self.aspect_ratio
                }
            }
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, alias = "inline_data")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default, alias = "mime_type")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub data: String,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn image(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: Some(mime_type.into()),
                data: data.into(),
            }),
        }
    }
}

impl ContentResponse {
    pub fn with_parts(parts: Vec<Part>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content { parts }),
                finish_reason: None,
            }],
        }
    }

    /// Scans the first candidate's parts in order and stops at the first
    /// non-empty inline payload. Later candidates are never consulted.
    pub fn first_inline_image(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|part| {
                part.inline_data
                    .as_ref()
                    .map(|inline| inline.data.as_str())
                    .filter(|data| !data.is_empty())
            })
    }

    /// Text parts of the first candidate, useful when a model refuses to draw.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|part| part.text.as_deref().filter(|t| !t.trim().is_empty()))
    }
}
