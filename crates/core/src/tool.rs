//! Tool trait: the abstraction over pipeline capabilities.
//!
//! A tool is a named, independently invokable capability with a declared
//! input schema. The router picks tools by name, the registry executes them,
//! and the synthesizer reads their raw and formatted output.
//!
//! Execution never fails from the caller's point of view: an unknown tool,
//! an error from `invoke`/`format_output`, or even a panic inside the tool is
//! converted into a failed [`ToolResult`].

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ToolError;

/// Name and schema of a tool, as exposed to callers and to an LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// A request to run one tool with one input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    pub input: serde_json::Value,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, input: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            input,
        }
    }
}

/// The outcome of a single tool invocation. Never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Name of the tool that was dispatched
    pub tool: String,

    /// Whether both invoke and format succeeded
    pub success: bool,

    /// Raw structured output (or `{"error": ...}` on failure)
    pub raw_data: serde_json::Value,

    /// Human-readable rendering of the output
    pub formatted: String,

    /// Wall-clock duration of invoke + format
    pub execution_time_ms: u64,
}

impl ToolResult {
    fn failure(tool: &str, message: String, execution_time_ms: u64) -> Self {
        Self {
            tool: tool.to_string(),
            success: false,
            raw_data: serde_json::json!({ "error": message }),
            formatted: message,
            execution_time_ms,
        }
    }

    /// True when the result succeeded and reports found / non-empty data.
    pub fn has_data(&self) -> bool {
        if !self.success {
            return false;
        }
        let found = self.raw_data["found"].as_bool().unwrap_or(false);
        let count = self.raw_data["count"].as_u64().unwrap_or(0);
        found || count > 0
    }
}

/// The core Tool trait.
///
/// `invoke` produces an opaque raw result; `format_output` renders that raw
/// result for display. Both may fail; the registry contains the failure.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "memory_search").
    fn name(&self) -> &str;

    /// A description of what this tool does.
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Run the tool against the given input.
    async fn invoke(&self, input: serde_json::Value) -> Result<serde_json::Value, ToolError>;

    /// Render a raw result as display text.
    fn format_output(&self, raw: &serde_json::Value) -> Result<String, ToolError>;

    /// Convert this tool into a ToolDefinition.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Shared tools register like owned ones, so one instance can be handed to
/// several registries.
#[async_trait]
impl<T: Tool + ?Sized> Tool for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn description(&self) -> &str {
        (**self).description()
    }

    fn parameters_schema(&self) -> serde_json::Value {
        (**self).parameters_schema()
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        (**self).invoke(input).await
    }

    fn format_output(&self, raw: &serde_json::Value) -> Result<String, ToolError> {
        (**self).format_output(raw)
    }
}

/// A registry of named tools, kept in registration order.
///
/// Names are unique: registering a second tool under an existing name is a
/// configuration error.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool. Fails if the name is already taken.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ToolError::Duplicate(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Whether a tool with this name is registered.
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.index.get(name).map(|&i| self.tools[i].as_ref())
    }

    /// List all registered tool names.
    pub fn list(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Name and description of every tool.
    pub fn descriptions(&self) -> Vec<(String, String)> {
        self.tools
            .iter()
            .map(|t| (t.name().to_string(), t.description().to_string()))
            .collect()
    }

    /// Full definitions (including schemas) of every tool.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute one tool. Always returns a result; failures are data.
    pub async fn execute(&self, name: &str, input: serde_json::Value) -> ToolResult {
        let Some(tool) = self.get(name) else {
            warn!(tool = %name, "Tool not found");
            return ToolResult::failure(name, format!("Error: Tool \"{name}\" not found"), 0);
        };

        let started = Instant::now();
        let outcome = AssertUnwindSafe(async {
            let raw = tool.invoke(input).await?;
            let formatted = tool.format_output(&raw)?;
            Ok::<_, ToolError>((raw, formatted))
        })
        .catch_unwind()
        .await;
        let execution_time_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok((raw_data, formatted))) => {
                debug!(tool = %name, elapsed_ms = execution_time_ms, "Tool succeeded");
                ToolResult {
                    tool: name.to_string(),
                    success: true,
                    raw_data,
                    formatted,
                    execution_time_ms,
                }
            }
            Ok(Err(e)) => {
                warn!(tool = %name, error = %e, "Tool execution failed");
                ToolResult::failure(
                    name,
                    format!("Error executing {name}: {e}"),
                    execution_time_ms,
                )
            }
            Err(payload) => {
                let err = ToolError::Panicked {
                    tool_name: name.to_string(),
                    reason: panic_message(payload.as_ref()),
                };
                warn!(tool = %name, error = %err, "Tool panicked");
                ToolResult::failure(
                    name,
                    format!("Error executing {name}: {err}"),
                    execution_time_ms,
                )
            }
        }
    }

    /// Execute several tools concurrently.
    ///
    /// Every invocation settles; result `i` answers request `i`.
    pub async fn execute_multiple(&self, invocations: &[ToolInvocation]) -> Vec<ToolResult> {
        let pending = invocations
            .iter()
            .map(|inv| self.execute(&inv.name, inv.input.clone()));
        futures::future::join_all(pending).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
