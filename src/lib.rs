pub mod config;
pub mod error;
pub mod gemini;
pub mod generator;
pub mod logger;
pub mod models;
pub mod prompt;
pub mod storage;

pub use config::{Config, GeminiConfig, HistoryConfig, ProgressConfig, UpstashConfig};
pub use error::{GenerationError, GenerationErrorKind, Result, StudioError};
pub use gemini::{GeminiClient, ImageBackend};
pub use generator::{progress_channel, ImageGenerator, ProgressCallback};
pub use models::*;
pub use prompt::compile;
pub use storage::{History, HistoryManager, HistoryStore};
