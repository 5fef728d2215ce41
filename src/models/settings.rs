use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::common::DEFAULT_MODEL_ID;

pub const DEFAULT_STEPS: u32 = 30;
pub const MIN_STEPS: u32 = 10;
pub const MAX_STEPS: u32 = 50;
pub const DEFAULT_GUIDANCE_SCALE: f32 = 7.0;
pub const MIN_GUIDANCE_SCALE: f32 = 1.0;
pub const MAX_GUIDANCE_SCALE: f32 = 20.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "4:3")]
    ClassicLandscape,
    #[serde(rename = "3:4")]
    ClassicPortrait,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Landscape,
        AspectRatio::Portrait,
        AspectRatio::ClassicLandscape,
        AspectRatio::ClassicPortrait,
    ];

    /// The ratio token the backend expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::ClassicLandscape => "4:3",
            AspectRatio::ClassicPortrait => "3:4",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AspectRatio::ALL
            .iter()
            .copied()
            .find(|ratio| ratio.as_str() == s.trim())
            .ok_or_else(|| {
                format!(
                    "unknown aspect ratio '{}', expected one of: 1:1, 16:9, 9:16, 4:3, 3:4",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum StylePreset {
    #[default]
    None,
    Photorealistic,
    Anime,
    Cinematic,
    #[serde(rename = "Digital Art")]
    DigitalArt,
    #[serde(rename = "Pixel Art")]
    PixelArt,
    #[serde(rename = "Line Art")]
    LineArt,
    Fantasy,
}

impl StylePreset {
    pub const ALL: [StylePreset; 8] = [
        StylePreset::None,
        StylePreset::Photorealistic,
        StylePreset::Anime,
        StylePreset::Cinematic,
        StylePreset::DigitalArt,
        StylePreset::PixelArt,
        StylePreset::LineArt,
        StylePreset::Fantasy,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StylePreset::None => "None",
            StylePreset::Photorealistic => "Photorealistic",
            StylePreset::Anime => "Anime",
            StylePreset::Cinematic => "Cinematic",
            StylePreset::DigitalArt => "Digital Art",
            StylePreset::PixelArt => "Pixel Art",
            StylePreset::LineArt => "Line Art",
            StylePreset::Fantasy => "Fantasy",
        }
    }

    /// Static modifier phrase appended to the prompt. Empty for `None`.
    pub fn modifier(&self) -> &'static str {
        match self {
            StylePreset::None => "",
            StylePreset::Photorealistic => {
                "photorealistic, 8k, highly detailed, professional photography, 85mm lens, sharp focus"
            }
            StylePreset::Anime => {
                "anime style, studio ghibli, vibrant colors, clean lines, high quality illustration"
            }
            StylePreset::Cinematic => {
                "cinematic lighting, movie scene, dramatic atmosphere, color graded, wide angle, 4k"
            }
            StylePreset::DigitalArt => {
                "digital painting, trending on artstation, concept art, smooth, sharp details"
            }
            StylePreset::PixelArt => "pixel art, 16-bit, retro game style, dithering",
            StylePreset::LineArt => "black and white, ink drawing, line art, minimal, clean",
            StylePreset::Fantasy => {
                "fantasy art, oil painting style, magical atmosphere, detailed background"
            }
        }
    }
}

impl fmt::Display for StylePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StylePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        StylePreset::ALL
            .iter()
            .copied()
            .find(|preset| {
                preset
                    .label()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_ascii_lowercase()
                    == wanted
            })
            .ok_or_else(|| format!("unknown style preset '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    pub prompt: String,
    #[serde(default)]
    pub negative_prompt: String,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub style_preset: StylePreset,
    pub model_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance_scale: Option<f32>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        GenerationSettings {
            prompt: String::new(),
            negative_prompt: String::new(),
            aspect_ratio: AspectRatio::default(),
            style_preset: StylePreset::default(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            seed: None,
            steps: Some(DEFAULT_STEPS),
            guidance_scale: Some(DEFAULT_GUIDANCE_SCALE),
        }
    }
}

impl GenerationSettings {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = negative_prompt.into();
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_style(mut self, style_preset: StylePreset) -> Self {
        self.style_preset = style_preset;
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Clamped to `[10, 50]`.
    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = Some(steps.clamp(MIN_STEPS, MAX_STEPS));
        self
    }

    /// Clamped to `[1, 20]`.
    pub fn with_guidance_scale(mut self, guidance_scale: f32) -> Self {
        self.guidance_scale = Some(guidance_scale.clamp(MIN_GUIDANCE_SCALE, MAX_GUIDANCE_SCALE));
        self
    }

    pub fn effective_steps(&self) -> u32 {
        self.steps.unwrap_or(DEFAULT_STEPS)
    }

    pub fn effective_guidance_scale(&self) -> f32 {
        self.guidance_scale.unwrap_or(DEFAULT_GUIDANCE_SCALE)
    }
}
