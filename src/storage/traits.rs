use crate::{error::Result, models::HistoryItem};
use async_trait::async_trait;

/// Persistence for the result history. Items are ordered newest first.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn load(&self) -> Result<Vec<HistoryItem>>;
    async fn save(&self, items: &[HistoryItem]) -> Result<()>;
}
