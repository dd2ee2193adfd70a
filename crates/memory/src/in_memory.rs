//! In-memory backend: useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use switchyard_core::error::MemoryError;
use switchyard_core::memory::{MemoryBackend, MemoryEntry, MemoryQuery, ScoredMemory};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::scoring;

/// An in-memory backend that stores episodes in a Vec.
/// Everything is lost when the process exits.
pub struct InMemoryBackend {
    entries: Arc<RwLock<Vec<MemoryEntry>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryBackend for InMemoryBackend {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn store(&self, mut entry: MemoryEntry) -> Result<String, MemoryError> {
        if entry.id.is_empty() {
            entry.id = format!("mem_{}", Uuid::new_v4());
        }
        let id = entry.id.clone();
        self.entries.write().await.push(entry);
        Ok(id)
    }

    async fn search(&self, query: &MemoryQuery) -> Result<Vec<ScoredMemory>, MemoryError> {
        let entries = self.entries.read().await;
        Ok(scoring::rank(entries.iter(), query, Utc::now()))
    }

    async fn recent(&self, count: usize) -> Result<Vec<MemoryEntry>, MemoryError> {
        let entries = self.entries.read().await;
        Ok(scoring::most_recent(entries.iter(), count))
    }

    async fn delete(&self, id: &str) -> Result<bool, MemoryError> {
        let mut entries = self.entries.write().await;
        let len_before = entries.len();
        entries.retain(|e| e.id != id);
        Ok(entries.len() < len_before)
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        Ok(self.entries.read().await.len())
    }

    async fn clear(&self) -> Result<(), MemoryError> {
        self.entries.write().await.clear();
        Ok(())
    }
}
