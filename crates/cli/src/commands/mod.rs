pub mod chat;
pub mod config_cmd;
pub mod demo;
pub mod memory;
pub mod tools;

use std::sync::Arc;

use switchyard_agent::{Orchestrator, PipelineResult};
use switchyard_config::AppConfig;
use switchyard_memory::MemoryStore;

/// Build a pipeline backed by the configured memory backend.
pub fn orchestrator(config: &AppConfig) -> Orchestrator {
    let memory = Arc::new(MemoryStore::from_config(&config.memory));
    Orchestrator::new(config.clone(), memory)
}

/// Human-readable rendering of one pipeline run.
pub fn render(result: &PipelineResult) -> String {
    let mut out = String::new();
    let routing = &result.routing;
    out.push_str(&format!(
        "  Intent:     {} ({:.2})\n",
        routing.intent, routing.confidence
    ));
    if !routing.tools.is_empty() {
        out.push_str(&format!("  Tools:      {}\n", routing.tools.join(", ")));
    }
    for tool in &result.tool_results {
        let status = if tool.success { "ok" } else { "failed" };
        out.push_str(&format!(
            "    - {} [{status}, {}ms]\n",
            tool.tool, tool.execution_time_ms
        ));
    }
    out.push_str(&format!(
        "  Confidence: {:.2}   Time: {}ms\n\n",
        result.response.confidence, result.processing_time_ms
    ));
    for line in result.response.content.lines() {
        out.push_str(&format!("  Assistant > {line}\n"));
    }
    out
}
