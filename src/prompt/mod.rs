//! Prompt compilation.
//!
//! [`compile`] turns raw settings into the single text prompt sent to the
//! backend. It is pure and total: malformed annotations degrade to literal
//! text instead of failing. Steps run in a fixed order:
//!
//! 1. blend resolution (`a | b`)
//! 2. weight resolution (`(word:1.4)`), on the blended text
//! 3. style phrase
//! 4. quality phrase (`steps > 40`)
//! 5. guidance phrase (`guidance > 12` or `guidance < 5`, never both)
//! 6. negative clause
//!
//! Aspect ratio is never expressed in text.

pub mod syntax;

use crate::models::GenerationSettings;

pub use syntax::{resolve_blend, resolve_weights, weight_phrase};

pub const QUALITY_STEPS_THRESHOLD: u32 = 40;
pub const STRICT_GUIDANCE_THRESHOLD: f32 = 12.0;
pub const CREATIVE_GUIDANCE_THRESHOLD: f32 = 5.0;

pub const QUALITY_PHRASE: &str = "hyper-detailed, intricate details, maximum quality";
pub const STRICT_GUIDANCE_PHRASE: &str = "strictly follow prompt, no deviation";
pub const CREATIVE_GUIDANCE_PHRASE: &str = "creative interpretation, artistic freedom";

pub fn compile(settings: &GenerationSettings) -> String {
    let blended = resolve_blend(&settings.prompt);
    let mut compiled = resolve_weights(&blended);

    let style = settings.style_preset.modifier();
    if !style.is_empty() {
        compiled.push_str(", ");
        compiled.push_str(style);
    }

    if settings.effective_steps() > QUALITY_STEPS_THRESHOLD {
        compiled.push_str(", ");
        compiled.push_str(QUALITY_PHRASE);
    }

    if let Some(phrase) = guidance_phrase(settings.effective_guidance_scale()) {
        compiled.push_str(", ");
        compiled.push_str(phrase);
    }

    let negative = settings.negative_prompt.trim();
    if !negative.is_empty() {
        compiled.push_str(". Exclude: ");
        compiled.push_str(negative);
    }

    compiled
}

fn guidance_phrase(guidance_scale: f32) -> Option<&'static str> {
    if guidance_scale > STRICT_GUIDANCE_THRESHOLD {
        Some(STRICT_GUIDANCE_PHRASE)
    } else if guidance_scale < CREATIVE_GUIDANCE_THRESHOLD {
        Some(CREATIVE_GUIDANCE_PHRASE)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StylePreset;

    fn plain(prompt: &str) -> GenerationSettings {
        GenerationSettings::new(prompt).with_style(StylePreset::None)
    }

    #[test]
    fn defaults_leave_prompt_alone() {
        assert_eq!(compile(&plain("a quiet harbor")), "a quiet harbor");
    }

    #[test]
    fn single_segment_never_blends() {
        for prompt in ["fox", "(fox:1.2) in snow", "a, b, c"] {
            assert!(!compile(&plain(prompt)).contains(" mixed with "));
        }
    }

    #[test]
    fn blend_then_weight() {
        let compiled = compile(&plain("cat | dog"));
        assert_eq!(compiled, "cat mixed with dog");
        assert!(!compiled.contains('|'));

        let compiled = compile(&plain("(cat:1.6) | (dog:0.4)"));
        assert_eq!(compiled, "extremely emphasized cat mixed with faint traces of dog");
    }

    #[test]
    fn weight_boundaries_through_compile() {
        assert!(compile(&plain("(x:1.5)")).contains("strongly emphasized x"));
        assert!(compile(&plain("(x:1.6)")).contains("extremely emphasized x"));
        assert_eq!(compile(&plain("(x:1.0)")), "x");
        assert_eq!(compile(&plain("(x:0.9)")), "x");
        assert!(compile(&plain("(x:0.89)")).contains("subtle x"));
        assert!(compile(&plain("(x:0.4)")).contains("faint traces of x"));
    }

    #[test]
    fn malformed_weight_passes_through() {
        assert_eq!(compile(&plain("(x:abc)")), "(x:abc)");
    }

    #[test]
    fn suffix_order() {
        let settings = plain("castle")
            .with_style(StylePreset::PixelArt)
            .with_steps(45)
            .with_guidance_scale(15.0)
            .with_negative_prompt("people, text");
        let compiled = compile(&settings);
        assert_eq!(
            compiled,
            "castle, pixel art, 16-bit, retro game style, dithering, \
             hyper-detailed, intricate details, maximum quality, \
             strictly follow prompt, no deviation. Exclude: people, text"
        );

        let style = compiled.find("pixel art").unwrap();
        let quality = compiled.find(QUALITY_PHRASE).unwrap();
        let guidance = compiled.find(STRICT_GUIDANCE_PHRASE).unwrap();
        let negative = compiled.find(". Exclude: ").unwrap();
        assert!(style < quality && quality < guidance && guidance < negative);
    }

    #[test]
    fn guidance_phrases_are_exclusive() {
        let strict = compile(&plain("x").with_guidance_scale(15.0));
        assert!(strict.contains(STRICT_GUIDANCE_PHRASE));
        assert!(!strict.contains(CREATIVE_GUIDANCE_PHRASE));

        let creative = compile(&plain("x").with_guidance_scale(3.0));
        assert!(creative.contains(CREATIVE_GUIDANCE_PHRASE));
        assert!(!creative.contains(STRICT_GUIDANCE_PHRASE));

        for edge in [5.0, 7.0, 12.0] {
            assert_eq!(compile(&plain("x").with_guidance_scale(edge)), "x");
        }
    }

    #[test]
    fn quality_threshold_is_exclusive() {
        assert_eq!(compile(&plain("x").with_steps(40)), "x");
        assert!(compile(&plain("x").with_steps(41)).ends_with(QUALITY_PHRASE));
    }

    #[test]
    fn blank_negative_is_ignored() {
        assert_eq!(compile(&plain("x").with_negative_prompt("   ")), "x");
    }
}
