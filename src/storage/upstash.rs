use crate::{
    config::UpstashConfig,
    error::{Result, StudioError},
    models::HistoryItem,
    storage::traits::HistoryStore,
};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::{json, Value};

/// History kept under a single key in Upstash Redis, via its REST API.
pub struct UpstashHistoryStore {
    client: Client,
    base_url: String,
    token: String,
    key: String,
}

impl UpstashHistoryStore {
    pub fn new(config: UpstashConfig, key: impl Into<String>) -> Result<Self> {
        let base_url = config
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| StudioError::ConfigError("Upstash URL is required".into()))?;

        let token = config
            .token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| StudioError::ConfigError("Upstash token is required".into()))?;

        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            key: key.into(),
        })
    }

    async fn command(&self, args: Value) -> Result<Value> {
        let response = self
            .client
            .post(&self.base_url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&args)
            .send()
            .await
            .map_err(|e| StudioError::RequestError(format!("Upstash request failed: {}", e)))?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            StudioError::ResponseError(format!("Failed to parse Upstash response: {}", e))
        })?;

        if let Some(error) = body["error"].as_str() {
            return Err(StudioError::StorageError(format!("Upstash error: {}", error)));
        }
        if !status.is_success() {
            return Err(StudioError::StorageError(format!(
                "Upstash returned HTTP {}",
                status
            )));
        }

        Ok(body["result"].clone())
    }

    pub async fn health_check(&self) -> Result<bool> {
        let result = self.command(json!(["PING"])).await?;
        Ok(result.as_str() == Some("PONG"))
    }
}

#[async_trait]
impl HistoryStore for UpstashHistoryStore {
    async fn load(&self) -> Result<Vec<HistoryItem>> {
        let result = self.command(json!(["GET", self.key])).await?;
        let Some(raw) = result.as_str() else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                log::error!("Failed to load history from Upstash key {}: {}", self.key, e);
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, items: &[HistoryItem]) -> Result<()> {
        let payload = serde_json::to_string(items)?;
        self.command(json!(["SET", self.key, payload])).await?;
        log::debug!("Saved {} history item(s) to Upstash", items.len());
        Ok(())
    }
}
