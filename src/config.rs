use crate::error::{Result, StudioError};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_HISTORY_PATH: &str = "text2image-history.json";
pub const DEFAULT_HISTORY_KEY: &str = "text2image-open-history-v1";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout_secs: 120,
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `GEMINI_API_KEY` (falling back to `API_KEY`), `GEMINI_BASE_URL`
    /// and `GEMINI_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());
        let base_url = env::var("GEMINI_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());
        let timeout_secs = env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(120);

        GeminiConfig {
            api_key,
            base_url,
            timeout_secs,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(StudioError::ConfigError(
                "Gemini API key is required (set GEMINI_API_KEY)".into(),
            )),
        }
    }
}

/// Tuning for the synthetic progress estimate.
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    pub tick: Duration,
    pub fast_increment: f64,
    pub slow_increment: f64,
    pub ceiling: f64,
    pub max_jitter: f64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        ProgressConfig {
            tick: Duration::from_millis(400),
            fast_increment: 15.0,
            slow_increment: 5.0,
            ceiling: 90.0,
            max_jitter: 2.0,
        }
    }
}

impl ProgressConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_increments(mut self, fast: f64, slow: f64) -> Self {
        self.fast_increment = fast;
        self.slow_increment = slow;
        self
    }

    pub fn with_ceiling(mut self, ceiling: f64, max_jitter: f64) -> Self {
        self.ceiling = ceiling;
        self.max_jitter = max_jitter;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryBackend {
    File,
    Upstash,
    Memory,
}

impl HistoryBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Some(HistoryBackend::File),
            "upstash" => Some(HistoryBackend::Upstash),
            "memory" => Some(HistoryBackend::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpstashConfig {
    pub url: Option<String>,
    pub token: Option<String>,
}

impl Default for UpstashConfig {
    fn default() -> Self {
        UpstashConfig {
            url: None,
            token: None,
        }
    }
}

impl UpstashConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        UpstashConfig {
            url: env::var("UPSTASH_REDIS_REST_URL").ok(),
            token: env::var("UPSTASH_REDIS_REST_TOKEN").ok(),
        }
    }

    pub fn with_credentials(mut self, url: impl Into<String>, token: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self.token = Some(token.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct HistoryConfig {
    pub backend: HistoryBackend,
    pub path: PathBuf,
    pub key: String,
    pub max_items: Option<usize>,
    pub upstash: Option<UpstashConfig>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            backend: HistoryBackend::File,
            path: PathBuf::from(DEFAULT_HISTORY_PATH),
            key: DEFAULT_HISTORY_KEY.to_string(),
            max_items: None,
            upstash: None,
        }
    }
}

impl HistoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let backend = env::var("HISTORY_BACKEND")
            .ok()
            .and_then(|s| HistoryBackend::parse(&s))
            .unwrap_or(HistoryBackend::File);
        let path = env::var("HISTORY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_HISTORY_PATH));
        let key = env::var("HISTORY_KEY").unwrap_or_else(|_| DEFAULT_HISTORY_KEY.to_string());
        let max_items = env::var("HISTORY_MAX_ITEMS")
            .ok()
            .and_then(|s| s.parse().ok());
        let upstash = if backend == HistoryBackend::Upstash {
            Some(UpstashConfig::from_env())
        } else {
            None
        };

        HistoryConfig {
            backend,
            path,
            key,
            max_items,
            upstash,
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.backend = HistoryBackend::File;
        self.path = path.into();
        self
    }

    pub fn with_upstash(mut self, config: UpstashConfig) -> Self {
        self.backend = HistoryBackend::Upstash;
        self.upstash = Some(config);
        self
    }

    pub fn in_memory(mut self) -> Self {
        self.backend = HistoryBackend::Memory;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub progress: ProgressConfig,
    pub history: HistoryConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Config {
            gemini: GeminiConfig::from_env(),
            progress: ProgressConfig::default(),
            history: HistoryConfig::from_env(),
        }
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_progress(mut self, config: ProgressConfig) -> Self {
        self.progress = config;
        self
    }

    pub fn with_history(mut self, config: HistoryConfig) -> Self {
        self.history = config;
        self
    }
}
