pub mod file;
pub mod history;
pub mod memory;
pub mod traits;
#[cfg(feature = "upstash")]
pub mod upstash;

use crate::{
    config::{HistoryBackend, HistoryConfig},
    error::{Result, StudioError},
};
use std::sync::Arc;

pub use file::FileHistoryStore;
pub use history::{History, HistoryManager};
pub use memory::MemoryHistoryStore;
pub use traits::HistoryStore;
#[cfg(feature = "upstash")]
pub use upstash::UpstashHistoryStore;

/// Builds the store selected by `config.backend`.
pub fn open_store(config: &HistoryConfig) -> Result<Arc<dyn HistoryStore>> {
    let store: Arc<dyn HistoryStore> = match config.backend {
        HistoryBackend::File => Arc::new(FileHistoryStore::new(config.path.clone())),
        HistoryBackend::Memory => Arc::new(MemoryHistoryStore::new()),
        HistoryBackend::Upstash => {
            #[cfg(feature = "upstash")]
            {
                let upstash_config = config.upstash.clone().ok_or_else(|| {
                    StudioError::ConfigError("Upstash config required".into())
                })?;
                Arc::new(UpstashHistoryStore::new(upstash_config, config.key.clone())?)
            }
            #[cfg(not(feature = "upstash"))]
            {
                return Err(StudioError::ConfigError(
                    "Upstash feature not enabled".into(),
                ));
            }
        }
    };

    Ok(store)
}

/// Opens the configured store and loads its history.
pub async fn open_history(config: &HistoryConfig) -> Result<HistoryManager> {
    let store = open_store(config)?;
    HistoryManager::load(store, config.max_items).await
}
