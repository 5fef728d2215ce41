pub mod progress;

use std::sync::Arc;

use crate::{
    config::{Config, ProgressConfig},
    error::{GenerationError, Result},
    gemini::{GeminiClient, ImageBackend},
    models::{
        CallShape, ContentRequest, ContentResponse, GeneratedImage, GenerationSettings,
        ImagenRequest, ImagenResponse, ModelFamily,
    },
    prompt,
};

pub use progress::{progress_channel, ProgressCallback, ProgressTicker};

/// A backend answer in whichever shape the model family produced.
#[derive(Debug, Clone)]
pub enum RawResponse {
    Images(ImagenResponse),
    Content(ContentResponse),
}

impl RawResponse {
    /// First image payload: the first prediction for the image-specialist
    /// shape, the first inline part of the first candidate otherwise.
    pub fn extract(&self) -> Option<&str> {
        match self {
            RawResponse::Images(response) => response.first_image(),
            RawResponse::Content(response) => response.first_inline_image(),
        }
    }
}

/// Drives one generation request end to end.
///
/// Cheap to clone; concurrent calls share nothing but the backend handle.
#[derive(Clone)]
pub struct ImageGenerator {
    backend: Arc<dyn ImageBackend>,
    progress: ProgressConfig,
}

impl ImageGenerator {
    pub fn new(backend: Arc<dyn ImageBackend>) -> Self {
        Self {
            backend,
            progress: ProgressConfig::default(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = GeminiClient::new(config.gemini.clone())?;
        Ok(Self::new(Arc::new(client)).with_progress_config(config.progress.clone()))
    }

    pub fn with_progress_config(mut self, progress: ProgressConfig) -> Self {
        self.progress = progress;
        self
    }

    /// Compiles the prompt, calls the backend once and returns the image.
    ///
    /// With an observer, `0` is reported first and `100` only on success. No
    /// report is made after this future resolves or is dropped.
    pub async fn generate(
        &self,
        settings: GenerationSettings,
        on_progress: Option<ProgressCallback>,
    ) -> std::result::Result<GeneratedImage, GenerationError> {
        let family = ModelFamily::resolve(&settings.model_id);
        let increment = if family.is_fast() {
            self.progress.fast_increment
        } else {
            self.progress.slow_increment
        };
        let ticker = on_progress.map(|callback| ProgressTicker::start(callback, increment, &self.progress));

        let _timer = crate::logger::timer(&format!("generate ({})", settings.model_id));
        log::info!("Generating with {} ({} family)", settings.model_id, family);

        let outcome = self
            .invoke(&settings, family)
            .await
            .and_then(|raw| {
                let data = raw.extract().ok_or_else(GenerationError::no_image_data)?;
                GeneratedImage::new(data, settings.clone(), settings.model_id.clone())
                    .ok_or_else(GenerationError::no_image_data)
            });

        match outcome {
            Ok(image) => {
                if let Some(ticker) = ticker {
                    ticker.complete();
                }
                log::info!("Image {} ready from {}", image.id, image.model);
                Ok(image)
            }
            Err(err) => {
                drop(ticker);
                log::error!("Image generation failed: {}", err);
                Err(err)
            }
        }
    }

    async fn invoke(
        &self,
        settings: &GenerationSettings,
        family: ModelFamily,
    ) -> std::result::Result<RawResponse, GenerationError> {
        let compiled = prompt::compile(settings);
        log::debug!("Compiled prompt: {}", compiled);

        let aspect_ratio = settings.aspect_ratio.as_str();
        let raw = match family.call_shape() {
            CallShape::ImageSpecialist => {
                let request = ImagenRequest::single_png(&settings.model_id, compiled, aspect_ratio);
                RawResponse::Images(self.backend.generate_images(request).await?)
            }
            CallShape::Content => {
                let request = ContentRequest::new(&settings.model_id, compiled, aspect_ratio);
                RawResponse::Content(self.backend.generate_content(request).await?)
            }
        };
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GenerationErrorKind, StudioError};
    use crate::models::{AspectRatio, Part, StylePreset};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Clone)]
    enum Reply {
        Images(Vec<&'static str>),
        Content(Vec<Part>),
        Fail(&'static str),
    }

    struct FakeBackend {
        reply: Reply,
        delay: Duration,
        imagen_calls: Mutex<Vec<ImagenRequest>>,
        content_calls: Mutex<Vec<ContentRequest>>,
    }

    impl FakeBackend {
        fn new(reply: Reply) -> Arc<Self> {
            Self::delayed(reply, Duration::ZERO)
        }

        fn delayed(reply: Reply, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply,
                delay,
                imagen_calls: Mutex::new(Vec::new()),
                content_calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ImageBackend for FakeBackend {
        async fn generate_images(&self, request: ImagenRequest) -> Result<ImagenResponse> {
            self.imagen_calls.lock().unwrap().push(request);
            tokio::time::sleep(self.delay).await;
            match &self.reply {
                Reply::Images(images) => Ok(serde_json::from_value(serde_json::json!({
                    "predictions": images
                        .iter()
                        .map(|b| serde_json::json!({ "bytesBase64Encoded": b }))
                        .collect::<Vec<_>>()
                }))
                .unwrap()),
                Reply::Content(_) => Ok(ImagenResponse::default()),
                Reply::Fail(msg) => Err(StudioError::ApiError {
                    status: 500,
                    message: msg.to_string(),
                }),
            }
        }

        async fn generate_content(&self, request: ContentRequest) -> Result<ContentResponse> {
            self.content_calls.lock().unwrap().push(request);
            tokio::time::sleep(self.delay).await;
            match &self.reply {
                Reply::Content(parts) => Ok(ContentResponse::with_parts(parts.clone())),
                Reply::Images(_) => Ok(ContentResponse::default()),
                Reply::Fail(msg) => Err(StudioError::RequestError(msg.to_string())),
            }
        }
    }

    fn recorder() -> (ProgressCallback, Arc<Mutex<Vec<u8>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressCallback = Arc::new(move |p| sink.lock().unwrap().push(p));
        (callback, seen)
    }

    #[tokio::test]
    async fn imagen_family_uses_image_specialist_call() {
        let backend = FakeBackend::new(Reply::Images(vec!["AQID", "BAUG"]));
        let generator = ImageGenerator::new(backend.clone());
        let settings = GenerationSettings::new("cat | dog")
            .with_model("imagen-4.0-generate-001")
            .with_aspect_ratio(AspectRatio::Landscape)
            .with_style(StylePreset::None);

        let image = generator.generate(settings.clone(), None).await.unwrap();

        assert_eq!(image.base64_data, "AQID");
        assert_eq!(image.model, "imagen-4.0-generate-001");
        assert_eq!(image.settings, settings);
        let calls = backend.imagen_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, "cat mixed with dog");
        assert_eq!(calls[0].aspect_ratio, "16:9");
        assert_eq!(calls[0].number_of_images, 1);
        assert_eq!(calls[0].output_mime_type, "image/png");
        assert!(backend.content_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn content_family_skips_text_parts() {
        let backend = FakeBackend::new(Reply::Content(vec![
            Part::text("Sure, here it is"),
            Part::image("image/png", "iVBORw0KGgo="),
        ]));
        let generator = ImageGenerator::new(backend.clone());
        let settings = GenerationSettings::new("a lighthouse").with_model("gemini-3-pro-image-preview");

        let image = generator.generate(settings, None).await.unwrap();

        assert_eq!(image.base64_data, "iVBORw0KGgo=");
        assert!(!image.id.is_empty());
        let calls = backend.content_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].aspect_ratio, "1:1");
        assert!(backend.imagen_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_result_is_a_failure() {
        for (reply, model) in [
            (Reply::Images(vec![]), "imagen-3.0-generate-001"),
            (Reply::Content(vec![]), "gemini-2.5-flash-image"),
            (Reply::Content(vec![Part::text("I can't draw that")]), "gemini-2.5-flash-image"),
        ] {
            let generator = ImageGenerator::new(FakeBackend::new(reply));
            let (callback, seen) = recorder();
            let err = generator
                .generate(GenerationSettings::new("x").with_model(model), Some(callback))
                .await
                .unwrap_err();
            assert_eq!(err.kind, GenerationErrorKind::EmptyResult);
            assert!(err.message.contains("No image data"));
            assert!(!seen.lock().unwrap().contains(&100));
        }
    }

    #[tokio::test]
    async fn backend_failure_is_normalized() {
        let generator = ImageGenerator::new(FakeBackend::new(Reply::Fail("quota exceeded")));
        let err = generator
            .generate(GenerationSettings::new("x"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::Backend);
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[tokio::test(start_paused = true)]
    async fn progress_ends_at_100_and_stops() {
        let backend = FakeBackend::delayed(
            Reply::Content(vec![Part::image("image/png", "AQID")]),
            Duration::from_millis(1300),
        );
        let generator = ImageGenerator::new(backend);
        let (callback, seen) = recorder();

        generator
            .generate(GenerationSettings::new("x"), Some(callback))
            .await
            .unwrap();
        let after = seen.lock().unwrap().clone();
        assert_eq!(after.first(), Some(&0));
        assert_eq!(after.last(), Some(&100));
        assert_eq!(after.iter().filter(|p| **p == 100).count(), 1);
        assert!(after[..after.len() - 1].iter().all(|p| *p < 100));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(*seen.lock().unwrap(), after);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_family_advances_slower() {
        let backend = FakeBackend::delayed(Reply::Fail("boom"), Duration::from_millis(1300));
        let generator = ImageGenerator::new(backend);
        let (callback, seen) = recorder();

        let result = generator
            .generate(
                GenerationSettings::new("x").with_model("imagen-3.0-generate-001"),
                Some(callback),
            )
            .await;
        assert!(result.is_err());
        let after = seen.lock().unwrap().clone();
        assert_eq!(after, vec![0, 5, 10, 15]);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(*seen.lock().unwrap(), after);
    }

    #[tokio::test]
    async fn concurrent_requests_are_independent() {
        let generator = ImageGenerator::new(FakeBackend::new(Reply::Images(vec!["AQID"])));
        let settings = GenerationSettings::new("x").with_model("imagen-3.0-generate-001");
        let (first, second) = tokio::join!(
            generator.generate(settings.clone(), None),
            generator.generate(settings, None)
        );
        let (first, second) = (first.unwrap(), second.unwrap());
        assert_ne!(first.id, second.id);
        assert!(second.timestamp >= first.timestamp);
    }

    #[test]
    fn raw_response_extract() {
        let raw = RawResponse::Content(ContentResponse::with_parts(vec![
            Part::text("caption"),
            Part::image("image/png", "AQID"),
        ]));
        assert_eq!(raw.extract(), Some("AQID"));
        assert_eq!(RawResponse::Images(ImagenResponse::default()).extract(), None);
    }
}
