//! Shared test helpers for pipeline-stage tests.

use std::sync::Mutex;

use async_trait::async_trait;
use switchyard_core::error::{ProviderError, ToolError};
use switchyard_core::message::Message;
use switchyard_core::provider::{Provider, ProviderRequest, ProviderResponse};
use switchyard_core::tool::{Tool, ToolRegistry};

/// A provider that returns one scripted reply (or error) and records prompts.
pub struct ScriptedProvider {
    reply: Result<String, ProviderError>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn text(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: Err(ProviderError::RequestFailed("connection refused".into())),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let prompt = request
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt);

        self.reply.clone().map(|text| ProviderResponse {
            message: Message::assistant(text),
            model: "scripted-1".into(),
        })
    }
}

/// A tool that echoes its input and always succeeds.
pub struct StubTool {
    pub name: &'static str,
}

#[async_trait]
impl Tool for StubTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Stub tool for tests"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object" })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        Ok(serde_json::json!({ "found": true, "count": 1, "input": input }))
    }

    fn format_output(&self, _raw: &serde_json::Value) -> Result<String, ToolError> {
        Ok(format!("{} output", self.name))
    }
}

/// A registry holding stub tools under the given names.
pub fn registry_with(names: &[&'static str]) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for &name in names {
        registry.register(Box::new(StubTool { name })).unwrap();
    }
    registry
}
