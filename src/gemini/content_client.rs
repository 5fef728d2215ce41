use super::Transport;
use crate::{
    error::Result,
    models::{ContentRequest, ContentResponse},
};

/// Generic multimodal content endpoint (Gemini image models).
#[derive(Clone)]
pub struct ContentClient {
    transport: Transport,
}

impl ContentClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub async fn generate(&self, request: ContentRequest) -> Result<ContentResponse> {
        log::info!("Invoking model: {}", request.model);

        let response: ContentResponse = self
            .transport
            .post_model(&request.model, "generateContent", &request.to_body())
            .await?;

        if response.first_inline_image().is_none() {
            if let Some(text) = response.first_text() {
                log::warn!("Model answered without an image: {}", text);
            }
        }

        Ok(response)
    }
}
