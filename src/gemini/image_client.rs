use super::Transport;
use crate::{
    error::Result,
    models::{ImagenRequest, ImagenResponse},
};

/// Image-specialist endpoint (Imagen models).
#[derive(Clone)]
pub struct ImageClient {
    transport: Transport,
}

impl ImageClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub async fn generate(&self, request: ImagenRequest) -> Result<ImagenResponse> {
        log::info!("Generating image with model: {}", request.model);
        log::debug!(
            "Imagen request: {} image(s), {}, aspect {}",
            request.number_of_images,
            request.output_mime_type,
            request.aspect_ratio
        );

        let response: ImagenResponse = self
            .transport
            .post_model(&request.model, "predict", &request.to_body())
            .await?;

        if let Some(reason) = response
            .predictions
            .iter()
            .find_map(|p| p.rai_filtered_reason.as_deref())
        {
            log::warn!("Imagen filtered a prediction: {}", reason);
        }
        log::debug!("Imagen returned {} prediction(s)", response.predictions.len());

        Ok(response)
    }
}
