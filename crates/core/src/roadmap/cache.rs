use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::CachedRoadmap;
use crate::types::Timestamp;

/// Per-user roadmap cache.
#[async_trait]
pub trait RoadmapCache: Send + Sync {
    /// A live entry for `user_id`. Entries expired at `now` are evicted and
    /// reported as missing.
    async fn get(&self, user_id: &str, now: Timestamp) -> Option<CachedRoadmap>;

    async fn put(&self, user_id: &str, entry: CachedRoadmap);

    /// Returns whether an entry was removed.
    async fn remove(&self, user_id: &str) -> bool;

    async fn clear(&self);

    async fn entry_count(&self) -> usize;
}

#[derive(Default)]
pub struct InMemoryRoadmapCache {
    entries: RwLock<HashMap<String, CachedRoadmap>>,
}

impl InMemoryRoadmapCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoadmapCache for InMemoryRoadmapCache {
    async fn get(&self, user_id: &str, now: Timestamp) -> Option<CachedRoadmap> {
        {
            let entries = self.entries.read().await;
            match entries.get(user_id) {
                None => return None,
                Some(entry) if !entry.is_expired_at(now) => return Some(entry.clone()),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        // Re-check under the write lock; a fresh entry may have landed.
        match entries.get(user_id) {
            Some(entry) if entry.is_expired_at(now) => {
                entries.remove(user_id);
                tracing::debug!(user_id, "Evicted expired roadmap");
                None
            }
            other => other.cloned(),
        }
    }

    async fn put(&self, user_id: &str, entry: CachedRoadmap) {
        self.entries.write().await.insert(user_id.to_string(), entry);
    }

    async fn remove(&self, user_id: &str) -> bool {
        self.entries.write().await.remove(user_id).is_some()
    }

    async fn clear(&self) {
        self.entries.write().await.clear();
    }

    async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }
}
