//! Memory search tool: relevance search over past conversations.
//!
//! Bridges the tool registry with the [`MemoryStore`]: the router hands it
//! the user's message (plus an optional timeframe parsed from phrases like
//! "last week"), and the tool returns the best-matching episodes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use switchyard_core::error::ToolError;
use switchyard_core::tool::Tool;
use switchyard_memory::MemoryStore;
use tracing::debug;

const NAME: &str = "memory_search";
const DEFAULT_LIMIT: u64 = 5;

pub struct MemorySearchTool {
    memory: Arc<MemoryStore>,
}

impl MemorySearchTool {
    pub fn new(memory: Arc<MemoryStore>) -> Self {
        Self { memory }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySearchOutput {
    pub found: bool,
    pub count: usize,
    pub results: Vec<MemoryHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryHit {
    pub id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub summary: String,
    pub user_message: String,
    pub assistant_response: String,
    /// Rounded to two decimals
    pub relevance: f64,
}

#[async_trait]
impl Tool for MemorySearchTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Search through past conversations and interactions to find relevant context. \
         Use this when the user references previous discussions or needs historical context."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to find relevant memories"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default 5)",
                    "default": 5
                },
                "timeframeDays": {
                    "type": "integer",
                    "description": "Only search memories from the last N days (searches all if omitted)"
                }
            },
            "required": ["query"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let query = input["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        // Zero behaves like "not given", for both fields.
        let limit = input["limit"]
            .as_u64()
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_LIMIT) as usize;
        let timeframe_days = input["timeframeDays"]
            .as_u64()
            .map(|d| u32::try_from(d).unwrap_or(u32::MAX));

        let hits = self
            .memory
            .search_memory(query, Some(limit), timeframe_days)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: NAME.into(),
                reason: e.to_string(),
            })?;

        debug!(query, limit, ?timeframe_days, hits = hits.len(), "Memory searched");

        let results: Vec<MemoryHit> = hits
            .into_iter()
            .map(|hit| MemoryHit {
                id: hit.entry.id,
                date: hit.entry.timestamp.format("%Y-%m-%d").to_string(),
                summary: hit.entry.summary,
                user_message: hit.entry.user_message,
                assistant_response: hit.entry.assistant_response,
                relevance: (hit.relevance * 100.0).round() / 100.0,
            })
            .collect();

        crate::to_raw(
            NAME,
            &MemorySearchOutput {
                found: !results.is_empty(),
                count: results.len(),
                results,
            },
        )
    }

    fn format_output(&self, raw: &serde_json::Value) -> Result<String, ToolError> {
        let output: MemorySearchOutput = crate::from_raw(NAME, raw)?;
        if !output.found {
            return Ok("No relevant past conversations found.".into());
        }

        let formatted = output
            .results
            .iter()
            .map(|r| {
                format!(
                    "**Previous conversation ({}):**\nSummary: {}\nUser asked: \"{}\"\nResponse: \"{}\"",
                    r.date, r.summary, r.user_message, r.assistant_response
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(format!(
            "Found {} relevant conversation(s):\n\n{formatted}",
            output.count
        ))
    }
}
