//! Annotation syntax understood inside a raw prompt.
//!
//! * Blending: `promptA | promptB` becomes `promptA mixed with promptB`.
//! * Weighting: `(keyword:1.5)` becomes a natural-language emphasis phrase.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use regex::{Captures, Regex};

pub const BLEND_SEPARATOR: char = '|';
pub const BLEND_CONNECTIVE: &str = " mixed with ";

pub const STRONG_WEIGHT: f64 = 1.5;
pub const WEAK_WEIGHT: f64 = 0.8;
const PLACEHOLDER_KEYWORD: &str = "keyword";

// `(text:number)` where text has no colon and number is digits and dots.
static WEIGHT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(([^:]+):([0-9.]+)\)").expect("weight pattern is a valid regex")
});

pub const SAMPLE_PROMPTS: &[&str] = &[
    "A futuristic city at sunset with neon lights and flying cars",
    "A cute robot gardening in a greenhouse, soft lighting",
    "Portrait of an astronaut reflecting the galaxy in their helmet visor",
    "Medieval castle on a floating island, waterfalls, eagles flying",
];

/// Joins `|`-separated segments with [`BLEND_CONNECTIVE`].
///
/// Segments are trimmed and empty ones dropped. Text without a separator is
/// returned untouched.
pub fn resolve_blend(prompt: &str) -> String {
    if !prompt.contains(BLEND_SEPARATOR) {
        return prompt.to_string();
    }

    prompt
        .split(BLEND_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(BLEND_CONNECTIVE)
}

/// Qualitative rendering of `text` at `weight`. Thresholds are exclusive and
/// checked from the highest down.
pub fn weight_phrase(text: &str, weight: f64) -> String {
    if weight > 1.5 {
        format!("extremely emphasized {}", text)
    } else if weight > 1.1 {
        format!("strongly emphasized {}", text)
    } else if weight > 1.0 {
        format!("emphasized {}", text)
    } else if weight < 0.5 {
        format!("faint traces of {}", text)
    } else if weight < 0.9 {
        format!("subtle {}", text)
    } else {
        text.to_string()
    }
}

/// Rewrites every `(text:number)` annotation, scanning left to right over
/// non-overlapping matches. Annotations whose number does not parse are kept
/// verbatim.
pub fn resolve_weights(text: &str) -> String {
    WEIGHT_PATTERN
        .replace_all(text, |caps: &Captures| {
            let whole = &caps[0];
            match caps[2].parse::<f64>() {
                Ok(weight) if weight.is_finite() => weight_phrase(&caps[1], weight),
                _ => whole.to_string(),
            }
        })
        .into_owned()
}

/// Inserts a blend separator at `cursor` (byte offset, clamped to a char
/// boundary). Returns the new text and the cursor placed after the insertion.
pub fn blend(text: &str, cursor: usize) -> (String, usize) {
    insert_at(text, cursor, cursor, " | ")
}

/// Wraps `text[start..end]` as a strongly weighted keyword.
pub fn emphasize(text: &str, start: usize, end: usize) -> (String, usize) {
    wrap_weighted(text, start, end, STRONG_WEIGHT)
}

/// Wraps `text[start..end]` as a weakly weighted keyword.
pub fn soften(text: &str, start: usize, end: usize) -> (String, usize) {
    wrap_weighted(text, start, end, WEAK_WEIGHT)
}

pub fn random_sample_prompt() -> &'static str {
    SAMPLE_PROMPTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(SAMPLE_PROMPTS[0])
}

fn wrap_weighted(text: &str, start: usize, end: usize, weight: f64) -> (String, usize) {
    let (start, end) = selection(text, start, end);
    let selected = &text[start..end];
    let content = if selected.is_empty() {
        PLACEHOLDER_KEYWORD
    } else {
        selected
    };
    let insertion = format!("({}:{})", content, weight);
    insert_at(text, start, end, &insertion)
}

fn insert_at(text: &str, start: usize, end: usize, insertion: &str) -> (String, usize) {
    let (start, end) = selection(text, start, end);
    let mut out = String::with_capacity(text.len() + insertion.len());
    out.push_str(&text[..start]);
    out.push_str(insertion);
    out.push_str(&text[end..]);
    (out, start + insertion.len())
}

fn selection(text: &str, start: usize, end: usize) -> (usize, usize) {
    let clamp = |mut idx: usize| {
        idx = idx.min(text.len());
        while !text.is_char_boundary(idx) {
            idx -= 1;
        }
        idx
    };
    let (a, b) = (clamp(start), clamp(end));
    (a.min(b), a.max(b))
}
