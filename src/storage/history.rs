use std::sync::Arc;

use crate::{
    error::Result,
    models::{
        GeneratedImage, GenerationSettings, HistoryItem, DEFAULT_GUIDANCE_SCALE, DEFAULT_STEPS,
    },
    storage::traits::HistoryStore,
};

/// In-memory result history, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    items: Vec<HistoryItem>,
    max_items: Option<usize>,
}

impl History {
    pub fn new(items: Vec<HistoryItem>) -> Self {
        Self {
            items,
            max_items: None,
        }
    }

    /// Keeps at most `max_items`, dropping the oldest on insert.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self.trim();
        self
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item shown by default: the most recently added.
    pub fn current(&self) -> Option<&HistoryItem> {
        self.items.first()
    }

    pub fn get(&self, id: &str) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn record(&mut self, image: GeneratedImage) -> &HistoryItem {
        self.items.insert(0, HistoryItem::from(image));
        self.trim();
        &self.items[0]
    }

    /// Removes `id`. Returns whether anything was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        self.items.len() != before
    }

    /// Flips the favorite flag and returns the new value.
    pub fn toggle_favorite(&mut self, id: &str) -> Option<bool> {
        let item = self.items.iter_mut().find(|item| item.id() == id)?;
        let favorite = !item.is_favorite();
        item.is_favorite = Some(favorite);
        Some(favorite)
    }

    pub fn favorites(&self) -> impl Iterator<Item = &HistoryItem> {
        self.items.iter().filter(|item| item.is_favorite())
    }

    /// Settings of a past result, with the advanced knobs filled in so they
    /// can be fed straight back into a new request.
    pub fn remix_settings(&self, id: &str) -> Option<GenerationSettings> {
        let mut settings = self.get(id)?.image.settings.clone();
        settings.steps.get_or_insert(DEFAULT_STEPS);
        settings.guidance_scale.get_or_insert(DEFAULT_GUIDANCE_SCALE);
        Some(settings)
    }

    fn trim(&mut self) {
        if let Some(max) = self.max_items {
            self.items.truncate(max);
        }
    }
}

/// A [`History`] bound to a store; every mutation is persisted.
pub struct HistoryManager {
    store: Arc<dyn HistoryStore>,
    history: History,
}

impl HistoryManager {
    pub async fn load(store: Arc<dyn HistoryStore>, max_items: Option<usize>) -> Result<Self> {
        let mut history = History::new(store.load().await?);
        if let Some(max) = max_items {
            history = history.with_max_items(max);
        }
        log::debug!("Loaded {} history item(s)", history.len());
        Ok(Self { store, history })
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn current(&self) -> Option<&HistoryItem> {
        self.history.current()
    }

    pub async fn record(&mut self, image: GeneratedImage) -> Result<&HistoryItem> {
        self.history.record(image);
        self.persist().await?;
        Ok(&self.history.items()[0])
    }

    pub async fn delete(&mut self, id: &str) -> Result<bool> {
        let removed = self.history.delete(id);
        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }

    pub async fn toggle_favorite(&mut self, id: &str) -> Result<Option<bool>> {
        let favorite = self.history.toggle_favorite(id);
        if favorite.is_some() {
            self.persist().await?;
        }
        Ok(favorite)
    }

    async fn persist(&self) -> Result<()> {
        self.store.save(self.history.items()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryHistoryStore;

    fn image(prompt: &str) -> GeneratedImage {
        GeneratedImage::new("AQID", GenerationSettings::new(prompt), "gemini-2.5-flash-image")
            .unwrap()
    }

    #[test]
    fn newest_first_and_current() {
        let mut history = History::default();
        assert!(history.current().is_none());
        history.record(image("first"));
        history.record(image("second"));
        assert_eq!(history.current().unwrap().image.settings.prompt, "second");
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn delete_moves_current_to_next_newest() {
        let mut history = History::default();
        history.record(image("old"));
        let newest = history.record(image("new")).id().to_string();

        assert!(history.delete(&newest));
        assert!(!history.delete(&newest));
        assert_eq!(history.current().unwrap().image.settings.prompt, "old");
    }

    #[test]
    fn favorites_toggle() {
        let mut history = History::default();
        let id = history.record(image("x")).id().to_string();
        assert_eq!(history.toggle_favorite(&id), Some(true));
        assert_eq!(history.favorites().count(), 1);
        assert_eq!(history.toggle_favorite(&id), Some(false));
        assert_eq!(history.toggle_favorite("missing"), None);
    }

    #[test]
    fn cap_drops_oldest() {
        let mut history = History::default().with_max_items(2);
        history.record(image("a"));
        history.record(image("b"));
        history.record(image("c"));
        let prompts: Vec<_> = history
            .items()
            .iter()
            .map(|i| i.image.settings.prompt.as_str())
            .collect();
        assert_eq!(prompts, vec!["c", "b"]);
    }

    #[test]
    fn remix_fills_defaults() {
        let mut settings = GenerationSettings::new("x");
        settings.steps = None;
        settings.guidance_scale = None;
        let mut history = History::default();
        let id = history
            .record(GeneratedImage::new("AQID", settings, "m").unwrap())
            .id()
            .to_string();

        let remix = history.remix_settings(&id).unwrap();
        assert_eq!(remix.steps, Some(DEFAULT_STEPS));
        assert_eq!(remix.guidance_scale, Some(DEFAULT_GUIDANCE_SCALE));
    }

    #[tokio::test]
    async fn manager_persists_mutations() {
        let store = Arc::new(MemoryHistoryStore::new());
        let mut manager = HistoryManager::load(store.clone(), None).await.unwrap();

        let id = manager.record(image("saved")).await.unwrap().id().to_string();
        assert_eq!(store.load().await.unwrap().len(), 1);

        manager.toggle_favorite(&id).await.unwrap();
        assert!(store.load().await.unwrap()[0].is_favorite());

        assert!(manager.delete(&id).await.unwrap());
        assert!(store.load().await.unwrap().is_empty());
        assert!(manager.current().is_none());
    }
}
