//! Routing decision types.
//!
//! Serialized field names match the JSON shape requested from a delegated
//! (LLM-backed) router, so its reply parses straight into [`RoutingDecision`].

use serde::{Deserialize, Serialize};

/// The router's categorical judgment of what a message needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    KnowledgeRetrieval,
    MemoryAccess,
    ClarificationNeeded,
    Conversation,
    MultiTool,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::KnowledgeRetrieval => "knowledge_retrieval",
            Intent::MemoryAccess => "memory_access",
            Intent::ClarificationNeeded => "clarification_needed",
            Intent::Conversation => "conversation",
            Intent::MultiTool => "multi_tool",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a message should go. Recomputed for every message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingDecision {
    pub intent: Intent,

    /// Tool names to dispatch, in order, without duplicates
    #[serde(default)]
    pub tools: Vec<String>,

    #[serde(default)]
    pub requires_clarification: bool,

    /// In [0, 1]
    pub confidence: f64,

    #[serde(default)]
    pub reasoning: String,
}
