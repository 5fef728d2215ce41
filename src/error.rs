use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Client error: {0}")]
    ClientError(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl StudioError {
    /// The underlying message without the category prefix.
    pub fn detail(&self) -> String {
        match self {
            StudioError::ConfigError(msg)
            | StudioError::ClientError(msg)
            | StudioError::RequestError(msg)
            | StudioError::ResponseError(msg)
            | StudioError::SerializationError(msg)
            | StudioError::StorageError(msg)
            | StudioError::InternalError(msg) => msg.clone(),
            StudioError::ApiError { message, .. } => message.clone(),
            StudioError::IoError(e) => e.to_string(),
        }
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(e: serde_json::Error) -> Self {
        StudioError::SerializationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;

pub const NO_IMAGE_DATA_MESSAGE: &str = "No image data returned from the API.";
pub const FALLBACK_GENERATION_MESSAGE: &str = "Failed to generate image";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    /// The backend call itself failed.
    Backend,
    /// The backend answered but no image payload could be extracted.
    EmptyResult,
}

/// The single error type surfaced by [`crate::generator::ImageGenerator::generate`].
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    pub message: String,
}

impl GenerationError {
    pub fn no_image_data() -> Self {
        Self {
            kind: GenerationErrorKind::EmptyResult,
            message: NO_IMAGE_DATA_MESSAGE.to_string(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            FALLBACK_GENERATION_MESSAGE.to_string()
        } else {
            message
        };
        Self {
            kind: GenerationErrorKind::Backend,
            message,
        }
    }

    pub fn is_empty_result(&self) -> bool {
        self.kind == GenerationErrorKind::EmptyResult
    }
}

impl From<StudioError> for GenerationError {
    fn from(e: StudioError) -> Self {
        GenerationError::backend(e.detail())
    }
}
