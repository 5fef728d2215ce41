pub mod content_client;
pub mod image_client;

use crate::{
    config::GeminiConfig,
    error::{Result, StudioError},
    models::{ContentRequest, ContentResponse, ImagenRequest, ImagenResponse},
};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use content_client::ContentClient;
pub use image_client::ImageClient;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// The two call shapes an image backend exposes.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    async fn generate_images(&self, request: ImagenRequest) -> Result<ImagenResponse>;
    async fn generate_content(&self, request: ContentRequest) -> Result<ContentResponse>;
}

#[derive(Clone)]
pub struct GeminiClient {
    image_client: ImageClient,
    content_client: ContentClient,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| StudioError::ClientError(e.to_string()))?;
        let transport = Transport {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.unwrap_or_default(),
        };

        log::debug!("Gemini client ready for {}", transport.base_url);

        Ok(Self {
            image_client: ImageClient::new(transport.clone()),
            content_client: ContentClient::new(transport),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env())
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn content(&self) -> &ContentClient {
        &self.content_client
    }
}

#[async_trait]
impl ImageBackend for GeminiClient {
    async fn generate_images(&self, request: ImagenRequest) -> Result<ImagenResponse> {
        self.image_client.generate(request).await
    }

    async fn generate_content(&self, request: ContentRequest) -> Result<ContentResponse> {
        self.content_client.generate(request).await
    }
}

/// HTTP plumbing shared by both clients.
#[derive(Clone)]
pub(crate) struct Transport {
    http: Client,
    base_url: String,
    api_key: String,
}

impl Transport {
    pub(crate) async fn post_model<T: DeserializeOwned>(
        &self,
        model: &str,
        method: &str,
        body: &Value,
    ) -> Result<T> {
        let url = format!("{}/models/{}:{}", self.base_url, model, method);

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| StudioError::RequestError(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| StudioError::ResponseError(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(StudioError::ApiError {
                status: status.as_u16(),
                message: api_error_message(&text)
                    .unwrap_or_else(|| format!("HTTP {}", status)),
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            StudioError::ResponseError(format!("Failed to parse {} response: {}", method, e))
        })
    }
}

/// Pulls `error.message` out of a Google API error body.
fn api_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value["error"]["message"]
        .as_str()
        .map(str::trim)
        .filter(|msg| !msg.is_empty())
        .map(String::from)
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
}
