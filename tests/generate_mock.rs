//! End-to-end generation against a mocked Gemini endpoint.

use std::sync::{Arc, Mutex};

use serde_json::json;
use text2image::{
    AspectRatio, GeminiClient, GeminiConfig, GenerationSettings, ImageGenerator, ProgressCallback,
    StylePreset,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_B64: &str = "iVBORw0KGgo=";

fn generator_for(server: &MockServer) -> ImageGenerator {
    let config = GeminiConfig::new()
        .with_api_key("test-key")
        .with_base_url(server.uri());
    ImageGenerator::new(Arc::new(GeminiClient::new(config).unwrap()))
}

fn recorder() -> (ProgressCallback, Arc<Mutex<Vec<u8>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let callback: ProgressCallback = Arc::new(move |p| sink.lock().unwrap().push(p));
    (callback, seen)
}

#[tokio::test]
async fn imagen_model_uses_predict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/imagen-4.0-generate-001:predict"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "instances": [{ "prompt": "a red fox, photorealistic, 8k, highly detailed, professional photography, 85mm lens, sharp focus" }],
            "parameters": { "sampleCount": 1, "aspectRatio": "16:9" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [
                { "bytesBase64Encoded": PNG_B64, "mimeType": "image/png" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let settings = GenerationSettings::new("a red fox")
        .with_model("imagen-4.0-generate-001")
        .with_style(StylePreset::Photorealistic)
        .with_aspect_ratio(AspectRatio::Landscape);

    let (callback, seen) = recorder();
    let image = generator_for(&server)
        .generate(settings.clone(), Some(callback))
        .await
        .unwrap();

    assert_eq!(image.base64_data, PNG_B64);
    assert_eq!(image.model, "imagen-4.0-generate-001");
    assert_eq!(image.settings, settings);
    assert!(!image.decode_bytes().unwrap().is_empty());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.first(), Some(&0));
    assert_eq!(seen.last(), Some(&100));
}

#[tokio::test]
async fn flash_model_uses_generate_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash-image:generateContent"))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{ "text": "a cat mixed with a dog" }] }],
            "generationConfig": { "imageConfig": { "aspectRatio": "1:1" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here you go" },
                        { "inlineData": { "mimeType": "image/png", "data": PNG_B64 } }
                    ]
                },
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let image = generator_for(&server)
        .generate(GenerationSettings::new("a cat | a dog"), None)
        .await
        .unwrap();

    assert_eq!(image.base64_data, PNG_B64);
}

#[tokio::test]
async fn text_only_answer_is_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-3-pro-image-preview:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "I can't draw that." }] } }]
        })))
        .mount(&server)
        .await;

    let (callback, seen) = recorder();
    let err = generator_for(&server)
        .generate(
            GenerationSettings::new("x").with_model("gemini-3-pro-image-preview"),
            Some(callback),
        )
        .await
        .unwrap_err();

    assert!(err.is_empty_result());
    assert_eq!(err.to_string(), "No image data returned from the API.");
    assert!(!seen.lock().unwrap().contains(&100));
}

#[tokio::test]
async fn api_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash-image:generateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
        })))
        .mount(&server)
        .await;

    let err = generator_for(&server)
        .generate(GenerationSettings::new("x"), None)
        .await
        .unwrap_err();

    assert!(!err.is_empty_result());
    assert_eq!(err.to_string(), "API key not valid.");
}
