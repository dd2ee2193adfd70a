//! File-based memory backend: persistent JSON-lines storage.
//!
//! Each namespace gets its own file, `<dir>/<namespace>.jsonl`, one
//! JSON-encoded [`MemoryEntry`] per line. The whole file is loaded on
//! creation and rewritten on every mutation; reads never touch disk.

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use switchyard_core::error::MemoryError;
use switchyard_core::memory::{MemoryBackend, MemoryEntry, MemoryQuery, ScoredMemory};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::scoring;

/// A file-backed memory store using JSONL (one JSON object per line).
pub struct FileBackend {
    path: PathBuf,
    entries: Arc<RwLock<Vec<MemoryEntry>>>,
}

impl FileBackend {
    /// Open (or lazily create) the JSONL file at `path`.
    pub fn new(path: PathBuf) -> Self {
        let entries = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = entries.len(), "File memory backend loaded");
        Self {
            path,
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// `<dir>/<namespace>.jsonl`
    pub fn for_namespace(dir: &Path, namespace: &str) -> Self {
        Self::new(dir.join(format!("{namespace}.jsonl")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> Vec<MemoryEntry> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(), // Not written yet
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<MemoryEntry>(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted memory entry");
                    None
                }
            })
            .collect()
    }

    async fn flush(&self) -> Result<(), MemoryError> {
        let entries = self.entries.read().await;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MemoryError::Storage(format!("Failed to create memory directory: {e}"))
            })?;
        }

        let mut content = String::new();
        for entry in entries.iter() {
            let line = serde_json::to_string(entry).map_err(|e| {
                MemoryError::Serialization(format!("Failed to serialize memory entry: {e}"))
            })?;
            content.push_str(&line);
            content.push('\n');
        }

        std::fs::write(&self.path, &content)
            .map_err(|e| MemoryError::Storage(format!("Failed to write memory file: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl MemoryBackend for FileBackend {
    fn name(&self) -> &str {
        "file"
    }

    async fn store(&self, mut entry: MemoryEntry) -> Result<String, MemoryError> {
        if entry.id.is_empty() {
            entry.id = format!("mem_{}", Uuid::new_v4());
        }
        let id = entry.id.clone();
        self.entries.write().await.push(entry);
        self.flush().await?;
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
        let deleted = entries.len() < len_before;
        drop(entries);
        if deleted {
            self.flush().await?;
        }
        Ok(deleted)
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        Ok(self.entries.read().await.len())
    }

    async fn clear(&self) -> Result<(), MemoryError> {
        self.entries.write().await.clear();
        self.flush().await?;
        Ok(())
    }
}
