//! Context frame and agent response: the synthesizer's input and output.

use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::tool::ToolResult;

/// Everything the synthesizer sees for one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextFrame {
    /// The current user message
    pub user_message: String,

    /// Bounded window of recent session history
    #[serde(default)]
    pub conversation_history: Vec<Message>,

    /// Outputs of every dispatched tool, in dispatch order
    #[serde(default)]
    pub tool_results: Vec<ToolResult>,

    /// Optional pre-rendered memory context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_context: Option<String>,
}

impl ContextFrame {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            ..Self::default()
        }
    }
}

/// How a response was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMethod {
    Template,
    Delegated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub generation_method: GenerationMethod,
    pub tool_results_count: usize,
}

/// The terminal artifact of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub content: String,

    /// Every dispatched tool, successful or not
    pub tools_used: Vec<String>,

    /// In [0, 1]
    pub confidence: f64,

    pub metadata: ResponseMetadata,
}
