//! Memory store: session window plus long-term episodes.
//!
//! The session history is the short-lived conversation window: appended on
//! every turn, never capped, explicitly clearable. Long-term episodes are
//! handed to a [`MemoryBackend`] and live until forgotten.

use std::sync::Arc;

use chrono::Utc;
use switchyard_config::MemoryConfig;
use switchyard_core::error::MemoryError;
use switchyard_core::memory::{MemoryBackend, MemoryEntry, MemoryQuery, ScoredMemory};
use switchyard_core::message::Message;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::in_memory::InMemoryBackend;
use crate::scoring;

const DEFAULT_SUMMARY_WORDS: usize = 10;
const DEFAULT_SEARCH_LIMIT: usize = 5;

pub struct MemoryStore {
    session: RwLock<Vec<Message>>,
    backend: Arc<dyn MemoryBackend>,
    summary_words: usize,
    default_limit: usize,
}

impl MemoryStore {
    pub fn new(backend: Arc<dyn MemoryBackend>) -> Self {
        Self {
            session: RwLock::new(Vec::new()),
            backend,
            summary_words: DEFAULT_SUMMARY_WORDS,
            default_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// An ephemeral store backed by [`InMemoryBackend`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryBackend::new()))
    }

    pub fn from_config(config: &MemoryConfig) -> Self {
        Self {
            summary_words: config.summary_words,
            default_limit: config.default_search_limit,
            ..Self::new(crate::backend_from_config(config))
        }
    }

    pub fn with_summary_words(mut self, words: usize) -> Self {
        self.summary_words = words;
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    // ── Session history ──────────────────────────────────────────────

    pub async fn add_to_session(&self, message: Message) {
        self.session.write().await.push(message);
    }

    /// The most recent `limit` messages in insertion order, or all of them.
    pub async fn session_history(&self, limit: Option<usize>) -> Vec<Message> {
        let session = self.session.read().await;
        let start = limit.map_or(0, |n| session.len().saturating_sub(n));
        session[start..].to_vec()
    }

    pub async fn clear_session(&self) {
        self.session.write().await.clear();
    }

    // ── Long-term memory ─────────────────────────────────────────────

    /// Persist one exchange as a new episode and return it.
    pub async fn store_interaction(
        &self,
        user_message: &str,
        assistant_response: &str,
        topics: Vec<String>,
    ) -> Result<MemoryEntry, MemoryError> {
        let mut unique: Vec<String> = Vec::with_capacity(topics.len());
        for topic in topics {
            if !unique.contains(&topic) {
                unique.push(topic);
            }
        }

        let entry = MemoryEntry {
            id: format!("mem_{}", Uuid::new_v4()),
            timestamp: Utc::now(),
            user_message: user_message.to_string(),
            assistant_response: assistant_response.to_string(),
            summary: scoring::summarize(user_message, assistant_response, self.summary_words),
            topics: unique,
        };
        self.backend.store(entry.clone()).await?;
        debug!(id = %entry.id, topics = ?entry.topics, "Stored interaction");
        Ok(entry)
    }

    /// Relevance search. `limit` falls back to the configured default.
    pub async fn search_memory(
        &self,
        query: &str,
        limit: Option<usize>,
        timeframe_days: Option<u32>,
    ) -> Result<Vec<ScoredMemory>, MemoryError> {
        let query = MemoryQuery {
            text: query.to_string(),
            limit: limit.unwrap_or(self.default_limit),
            timeframe_days,
        };
        self.backend.search(&query).await
    }

    pub async fn recent_memories(&self, count: usize) -> Result<Vec<MemoryEntry>, MemoryError> {
        self.backend.recent(count).await
    }

    /// Forget a single episode. Returns whether it existed.
    pub async fn forget(&self, id: &str) -> Result<bool, MemoryError> {
        self.backend.delete(id).await
    }

    /// Forget every episode in this store's namespace.
    pub async fn forget_all(&self) -> Result<(), MemoryError> {
        self.backend.clear().await
    }

    pub async fn memory_count(&self) -> Result<usize, MemoryError> {
        self.backend.count().await
    }

    /// Render search hits for inclusion in a prompt.
    pub fn format_results(results: &[ScoredMemory]) -> String {
        if results.is_empty() {
            return "No relevant memories found.".to_string();
        }
        results
            .iter()
            .map(|r| {
                format!(
                    "[{}] {}\nUser: {}\nAssistant: {}",
                    r.entry.timestamp.format("%Y-%m-%d"),
                    r.entry.summary,
                    r.entry.user_message,
                    r.entry.assistant_response
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noop::NoopMemory;
    use chrono::TimeZone;

    #[tokio::test]
    async fn session_history_slices_most_recent() {
        let store = MemoryStore::in_memory();
        for i in 0..4 {
            store.add_to_session(Message::user(format!("m{i}"))).await;
        }

        let all = store.session_history(None).await;
        assert_eq!(all.len(), 4);

        let last_two = store.session_history(Some(2)).await;
        let contents: Vec<&str> = last_two.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m2", "m3"]);

        assert_eq!(store.session_history(Some(10)).await.len(), 4);
    }

    #[tokio::test]
    async fn clear_session_empties_history() {
        let store = MemoryStore::in_memory();
        store.add_to_session(Message::user("hi")).await;
        store.clear_session().await;
        assert!(store.session_history(None).await.is_empty());
    }

    #[tokio::test]
    async fn store_interaction_builds_summary_and_dedups_topics() {
        let store = MemoryStore::in_memory().with_summary_words(4);
        let entry = store
            .store_interaction(
                "How do we deploy the app?",
                "Use blue-green.",
                vec!["deployment".into(), "memory".into(), "deployment".into()],
            )
            .await
            .unwrap();

        assert!(entry.id.starts_with("mem_"));
        assert_eq!(entry.summary, "How do we deploy...");
        assert_eq!(entry.topics, vec!["deployment", "memory"]);
        assert_eq!(store.memory_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn search_uses_default_limit() {
        let store = MemoryStore::in_memory();
        for i in 0..7 {
            store
                .store_interaction(&format!("database question {i}"), "answer", vec![])
                .await
                .unwrap();
        }
        let hits = store.search_memory("database", None, None).await.unwrap();
        assert_eq!(hits.len(), 5);
        let hits = store.search_memory("database", Some(2), None).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn forget_removes_episodes() {
        let store = MemoryStore::in_memory();
        let a = store.store_interaction("a", "b", vec![]).await.unwrap();
        store.store_interaction("c", "d", vec![]).await.unwrap();

        assert!(store.forget(&a.id).await.unwrap());
        assert_eq!(store.memory_count().await.unwrap(), 1);

        store.forget_all().await.unwrap();
        assert_eq!(store.memory_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn noop_backend_remembers_nothing() {
        let store = MemoryStore::new(Arc::new(NoopMemory));
        store.store_interaction("a", "b", vec![]).await.unwrap();
        assert!(store.recent_memories(5).await.unwrap().is_empty());
        assert_eq!(store.backend_name(), "none");
    }

    #[test]
    fn format_results_renders_blocks() {
        let entry = MemoryEntry {
            id: "mem_1".into(),
            timestamp: Utc.with_ymd_and_hms(2025, 11, 10, 9, 0, 0).unwrap(),
            user_message: "How do we deploy?".into(),
            assistant_response: "Blue-green.".into(),
            topics: vec![],
            summary: "How do we deploy? Blue-green....".into(),
        };
        let hits = vec![
            ScoredMemory { entry: entry.clone(), relevance: 1.0 },
            ScoredMemory { entry, relevance: 0.5 },
        ];
        let text = MemoryStore::format_results(&hits);
        assert!(text.starts_with("[2025-11-10] How do we deploy? Blue-green....\nUser: How do we deploy?\nAssistant: Blue-green."));
        assert_eq!(text.matches("\n\n---\n\n").count(), 1);

        assert_eq!(MemoryStore::format_results(&[]), "No relevant memories found.");
    }
}
