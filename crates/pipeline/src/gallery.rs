//! In-memory gallery of finished clips, newest first.

use tokio::sync::RwLock;
use uuid::Uuid;

use nexora_core::types::VideoRecord;

/// Records produced by successful runs.
#[derive(Default)]
pub struct Gallery {
    records: RwLock<Vec<VideoRecord>>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record at the front of the gallery.
    pub async fn insert(&self, record: VideoRecord) {
        self.records.write().await.insert(0, record);
    }

    pub async fn get(&self, id: Uuid) -> Option<VideoRecord> {
        self.records.read().await.iter().find(|r| r.id == id).cloned()
    }

    /// All records, newest first.
    pub async fn list(&self) -> Vec<VideoRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use nexora_core::types::GenerationConfig;

    use super::*;

    fn record(prompt: &str) -> VideoRecord {
        VideoRecord::from_final_segment(prompt, &GenerationConfig::default(), b"clip", None)
    }

    #[tokio::test]
    async fn newest_record_comes_first() {
        let gallery = Gallery::new();
        gallery.insert(record("first")).await;
        gallery.insert(record("second")).await;

        let list = gallery.list().await;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].description, "second");
        assert_eq!(list[1].description, "first");
    }

    #[tokio::test]
    async fn get_by_id() {
        let gallery = Gallery::new();
        let r = record("lake");
        let id = r.id;
        gallery.insert(r).await;

        assert_eq!(gallery.get(id).await.unwrap().description, "lake");
        assert!(gallery.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn starts_empty() {
        let gallery = Gallery::new();
        assert!(gallery.is_empty().await);
        assert_eq!(gallery.len().await, 0);
    }
}
