//! Memory trait: long-term storage of past exchanges.
//!
//! Each completed pipeline run becomes one [`MemoryEntry`] (an "episode").
//! Backends decide where episodes live; the relevance contract is the same
//! for all of them: keyword-overlap scoring over the entry text.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MemoryError;

/// One persisted user/assistant exchange. Append-only, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Unique ID for this episode
    pub id: String,

    /// When the exchange was stored
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// What the user said
    pub user_message: String,

    /// What the assistant answered
    pub assistant_response: String,

    /// Topic tags, deduplicated
    #[serde(default)]
    pub topics: Vec<String>,

    /// Short extractive summary
    pub summary: String,
}

impl MemoryEntry {
    /// The text searched by relevance scoring.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.user_message,
            self.assistant_response,
            self.topics.join(" "),
            self.summary
        )
    }
}

/// A relevance search over long-term memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryQuery {
    /// The search text
    pub text: String,

    /// Maximum number of results
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Only consider entries from the last N days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe_days: Option<u32>,
}

fn default_limit() -> usize {
    5
}

impl MemoryQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: default_limit(),
            timeframe_days: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn within_days(mut self, days: u32) -> Self {
        self.timeframe_days = Some(days);
        self
    }
}

/// A search hit with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMemory {
    pub entry: MemoryEntry,
    pub relevance: f64,
}

/// The core MemoryBackend trait.
///
/// Implementations: in-memory, JSONL file, none (no-op). An external
/// knowledge-graph service fits behind the same contract.
#[async_trait]
pub trait MemoryBackend: Send + Sync {
    /// The backend name (e.g., "in_memory", "file", "none").
    fn name(&self) -> &str;

    /// Append a new episode. Returns its ID.
    async fn store(&self, entry: MemoryEntry) -> Result<String, MemoryError>;

    /// Relevance-ranked search.
    async fn search(&self, query: &MemoryQuery) -> Result<Vec<ScoredMemory>, MemoryError>;

    /// The `count` most recent episodes, newest first.
    async fn recent(&self, count: usize) -> Result<Vec<MemoryEntry>, MemoryError>;

    /// Forget one episode by ID.
    async fn delete(&self, id: &str) -> Result<bool, MemoryError>;

    /// Total episode count.
    async fn count(&self) -> Result<usize, MemoryError>;

    /// Forget everything in this backend's namespace.
    async fn clear(&self) -> Result<(), MemoryError>;
}
