//! Built-in tool implementations for Switchyard.
//!
//! - `memory_search`: relevance search over past conversations
//! - `knowledge_base`: keyword search over the internal documentation set
//! - `clarification_check`: vagueness heuristics with follow-up questions

pub mod clarification;
pub mod knowledge_base;
pub mod memory_search;

use std::sync::Arc;

use switchyard_core::tool::Tool;
use switchyard_memory::MemoryStore;

pub use clarification::ClarificationTool;
pub use knowledge_base::KnowledgeBaseTool;
pub use memory_search::MemorySearchTool;

/// The built-in tools, in registration order.
pub fn builtin_tools(memory: Arc<MemoryStore>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(MemorySearchTool::new(memory)),
        Box::new(KnowledgeBaseTool::new()),
        Box::new(ClarificationTool),
    ]
}

/// Render an output struct as a raw JSON value.
pub(crate) fn to_raw<T: serde::Serialize>(
    tool_name: &str,
    output: &T,
) -> Result<serde_json::Value, switchyard_core::error::ToolError> {
    serde_json::to_value(output).map_err(|e| switchyard_core::error::ToolError::ExecutionFailed {
        tool_name: tool_name.to_string(),
        reason: format!("Failed to serialize output: {e}"),
    })
}

/// Parse a raw JSON value back into an output struct for formatting.
pub(crate) fn from_raw<T: serde::de::DeserializeOwned>(
    tool_name: &str,
    raw: &serde_json::Value,
) -> Result<T, switchyard_core::error::ToolError> {
    serde_json::from_value(raw.clone()).map_err(|e| {
        switchyard_core::error::ToolError::ExecutionFailed {
            tool_name: tool_name.to_string(),
            reason: format!("Unexpected output shape: {e}"),
        }
    })
}
