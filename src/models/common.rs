use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL_ID: &str = "gemini-2.5-flash-image";

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub family: ModelFamily,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ModelFamily {
    Flash,
    Pro,
    Imagen,
}

/// Which backend operation a model family is reached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallShape {
    /// Dedicated image endpoint returning a list of generated images.
    ImageSpecialist,
    /// Generic multimodal content endpoint returning candidates with parts.
    Content,
}

pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "gemini-2.5-flash-image",
        name: "Gemini 2.5 Flash",
        description: "Fastest generation, low latency. Good for iteration.",
        family: ModelFamily::Flash,
    },
    ModelInfo {
        id: "gemini-3-pro-image-preview",
        name: "Gemini 3 Pro",
        description: "High fidelity, better instruction following. Slower generation.",
        family: ModelFamily::Pro,
    },
    ModelInfo {
        id: "imagen-3.0-generate-001",
        name: "Imagen 3",
        description: "High photorealism and texture detail. Specialized for image generation.",
        family: ModelFamily::Imagen,
    },
    ModelInfo {
        id: "imagen-4.0-generate-001",
        name: "Imagen 4 (Preview)",
        description: "Next-gen image generation. Highest quality and coherence.",
        family: ModelFamily::Imagen,
    },
];

pub fn find_model(model_id: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.id == model_id)
}

impl ModelFamily {
    /// Catalog entries win; unlisted ids fall back to their naming scheme.
    pub fn resolve(model_id: &str) -> Self {
        if let Some(info) = find_model(model_id) {
            return info.family;
        }
        match model_id {
            id if id.starts_with("imagen-") => ModelFamily::Imagen,
            id if id.contains("flash") => ModelFamily::Flash,
            _ => ModelFamily::Pro,
        }
    }

    pub fn call_shape(&self) -> CallShape {
        match self {
            ModelFamily::Imagen => CallShape::ImageSpecialist,
            ModelFamily::Flash | ModelFamily::Pro => CallShape::Content,
        }
    }

    pub fn is_fast(&self) -> bool {
        matches!(self, ModelFamily::Flash)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFamily::Flash => "Flash",
            ModelFamily::Pro => "Pro",
            ModelFamily::Imagen => "Imagen",
        }
    }
}

impl std::fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
