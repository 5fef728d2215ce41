use crate::{error::Result, models::HistoryItem, storage::traits::HistoryStore};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryHistoryStore {
    items: RwLock<Vec<HistoryItem>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<HistoryItem>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn load(&self) -> Result<Vec<HistoryItem>> {
        Ok(self.items.read().await.clone())
    }

    async fn save(&self, items: &[HistoryItem]) -> Result<()> {
        *self.items.write().await = items.to_vec();
        Ok(())
    }
}
