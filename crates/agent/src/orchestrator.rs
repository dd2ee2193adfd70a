//! Pipeline coordinator.
//!
//! One [`Orchestrator::process_message`] call runs the whole pipeline:
//!
//! 1. **Record** the user message in session history
//! 2. **Route** it to zero or more tools
//! 3. **Dispatch** the selected tools concurrently
//! 4. **Frame** message + recent history + tool results
//! 5. **Synthesize** the reply
//! 6. **Remember** the exchange (when `store_interactions` is on)
//!
//! The orchestrator owns its registry and receives its memory store at
//! construction, so independent pipelines never share state. Lifecycle is
//! `new → initialize (lazy, idempotent) → use → dispose`.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use switchyard_config::AppConfig;
use switchyard_core::error::{Error, Result};
use switchyard_core::frame::{AgentResponse, ContextFrame};
use switchyard_core::memory::{MemoryEntry, ScoredMemory};
use switchyard_core::message::Message;
use switchyard_core::provider::Provider;
use switchyard_core::routing::RoutingDecision;
use switchyard_core::tool::{Tool, ToolRegistry, ToolResult};
use switchyard_memory::MemoryStore;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::context::{BuilderOptions, ContextBuilder};
use crate::router::{KNOWLEDGE_BASE, MEMORY_SEARCH, Router};
use crate::synthesizer::ResponseSynthesizer;

const TOPIC_KEYWORDS: &[(&str, &str)] = &[
    ("deploy", "deployment"),
    ("database", "database"),
    ("api", "api"),
    ("auth", "authentication"),
    ("test", "testing"),
    ("security", "security"),
    ("monitor", "monitoring"),
];

/// Everything one pipeline run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub response: AgentResponse,
    pub routing: RoutingDecision,
    pub tool_results: Vec<ToolResult>,
    pub processing_time_ms: u64,
}

/// Name and description of a registered tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
}

pub struct Orchestrator {
    config: AppConfig,
    memory: Arc<MemoryStore>,
    router: Router,
    synthesizer: ResponseSynthesizer,
    extra_tools: Vec<Arc<dyn Tool>>,
    /// `None` until initialized, and again after `dispose`.
    registry: RwLock<Option<ToolRegistry>>,
}

impl Orchestrator {
    pub fn new(config: AppConfig, memory: Arc<MemoryStore>) -> Self {
        let router = Router::new(config.router.strategy, None);
        let synthesizer = ResponseSynthesizer::new(
            &config.synthesizer,
            ContextBuilder::new(BuilderOptions::from(&config.context)),
            None,
        );
        Self {
            config,
            memory,
            router,
            synthesizer,
            extra_tools: Vec::new(),
            registry: RwLock::new(None),
        }
    }

    /// Wire in an external text generator for the delegated strategies.
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.router = Router::new(self.config.router.strategy, Some(provider.clone()));
        self.synthesizer = ResponseSynthesizer::new(
            &self.config.synthesizer,
            ContextBuilder::new(BuilderOptions::from(&self.config.context)),
            Some(provider),
        );
        self
    }

    /// Register an additional tool alongside the built-ins at initialization.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.extra_tools.push(tool);
        self
    }

    pub fn memory(&self) -> &Arc<MemoryStore> {
        &self.memory
    }

    /// Register the built-in and extra tools. A second call is a no-op.
    ///
    /// The registry is swapped in only when every registration succeeded,
    /// so a duplicate name leaves the orchestrator uninitialized.
    pub async fn initialize(&self) -> Result<()> {
        if self.registry.read().await.is_some() {
            return Ok(());
        }
        let mut slot = self.registry.write().await;
        if slot.is_some() {
            return Ok(());
        }

        let mut registry = ToolRegistry::new();
        for tool in switchyard_tools::builtin_tools(self.memory.clone()) {
            registry.register(tool)?;
        }
        for tool in &self.extra_tools {
            registry.register(Box::new(Arc::clone(tool)))?;
        }

        info!(tools = ?registry.list(), "Orchestrator initialized");
        *slot = Some(registry);
        Ok(())
    }

    pub async fn is_initialized(&self) -> bool {
        self.registry.read().await.is_some()
    }

    /// Drop the registry and session history.
    pub async fn dispose(&self) {
        *self.registry.write().await = None;
        self.memory.clear_session().await;
        debug!("Orchestrator disposed");
    }

    /// Run the full pipeline for one user message.
    pub async fn process_message(&self, user_message: &str) -> Result<PipelineResult> {
        if user_message.trim().is_empty() {
            return Err(Error::InvalidInput("message must not be empty".into()));
        }
        self.initialize().await?;

        let started = Instant::now();
        self.memory.add_to_session(Message::user(user_message)).await;

        let (routing, tool_results) = {
            let guard = self.registry.read().await;
            let registry = guard
                .as_ref()
                .ok_or_else(|| Error::Internal("orchestrator disposed mid-run".into()))?;

            let routing = self.router.classify(user_message, registry).await;
            debug!(intent = %routing.intent, tools = ?routing.tools, confidence = routing.confidence, "Routing decision");

            let tool_results = if routing.tools.is_empty() {
                Vec::new()
            } else {
                let invocations = self.router.extract_tool_inputs(user_message, &routing.tools);
                registry.execute_multiple(&invocations).await
            };
            (routing, tool_results)
        };

        for result in &tool_results {
            debug!(tool = %result.tool, success = result.success, elapsed_ms = result.execution_time_ms, "Tool result");
        }

        let frame = ContextFrame {
            user_message: user_message.to_string(),
            conversation_history: self
                .memory
                .session_history(Some(self.config.pipeline.max_history_length))
                .await,
            tool_results: tool_results.clone(),
            memory_context: None,
        };
        let response = self.synthesizer.generate(&frame).await;

        if self.config.pipeline.store_interactions {
            let topics = extract_topics(user_message, &routing.tools);
            if let Err(e) = self
                .memory
                .store_interaction(user_message, &response.content, topics)
                .await
            {
                warn!(error = %e, "Failed to store interaction");
            }
            self.memory
                .add_to_session(Message::assistant(response.content.clone()))
                .await;
        }

        let processing_time_ms = started.elapsed().as_millis() as u64;
        info!(
            intent = %routing.intent,
            tools = tool_results.len(),
            confidence = response.confidence,
            elapsed_ms = processing_time_ms,
            "Message processed"
        );

        Ok(PipelineResult {
            response,
            routing,
            tool_results,
            processing_time_ms,
        })
    }

    pub async fn session_history(&self) -> Vec<Message> {
        self.memory.session_history(None).await
    }

    pub async fn clear_session(&self) {
        self.memory.clear_session().await;
    }

    /// Registered tools, initializing on first use.
    pub async fn available_tools(&self) -> Result<Vec<ToolSummary>> {
        self.initialize().await?;
        let guard = self.registry.read().await;
        Ok(guard
            .as_ref()
            .map(|registry| {
                registry
                    .descriptions()
                    .into_iter()
                    .map(|(name, description)| ToolSummary { name, description })
                    .collect()
            })
            .unwrap_or_default())
    }

    pub async fn recent_memories(&self, count: usize) -> Result<Vec<MemoryEntry>> {
        Ok(self.memory.recent_memories(count).await?)
    }

    pub async fn search_memory(
        &self,
        query: &str,
        limit: Option<usize>,
        timeframe_days: Option<u32>,
    ) -> Result<Vec<ScoredMemory>> {
        Ok(self.memory.search_memory(query, limit, timeframe_days).await?)
    }
}

/// Topic tags for a stored exchange: tool-implied topics first, then
/// keyword topics, deduplicated in first-seen order.
pub fn extract_topics(message: &str, tools: &[String]) -> Vec<String> {
    let mut topics: Vec<&str> = Vec::new();
    if tools.iter().any(|t| t == MEMORY_SEARCH) {
        topics.extend(["memory", "history"]);
    }
    if tools.iter().any(|t| t == KNOWLEDGE_BASE) {
        topics.extend(["documentation", "knowledge"]);
    }

    let lower = message.to_lowercase();
    topics.extend(
        TOPIC_KEYWORDS
            .iter()
            .filter(|(keyword, _)| lower.contains(keyword))
            .map(|(_, topic)| *topic),
    );

    let mut unique: Vec<String> = Vec::with_capacity(topics.len());
    for topic in topics {
        if !unique.iter().any(|t| t == topic) {
            unique.push(topic.to_string());
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ScriptedProvider, StubTool};
    use switchyard_config::{RouterStrategy, SynthesizerStrategy};
    use switchyard_core::error::ToolError;
    use switchyard_core::message::Role;
    use switchyard_core::routing::Intent;

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(AppConfig::default(), Arc::new(MemoryStore::in_memory()))
    }

    #[test]
    fn topics_from_tools_and_keywords() {
        let topics = extract_topics(
            "How do we deploy the API with auth tests?",
            &[MEMORY_SEARCH.to_string(), KNOWLEDGE_BASE.to_string()],
        );
        assert_eq!(
            topics,
            vec![
                "memory",
                "history",
                "documentation",
                "knowledge",
                "deployment",
                "api",
                "authentication",
                "testing"
            ]
        );
        assert!(extract_topics("hello there", &[]).is_empty());
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let orch = orchestrator();
        assert!(!orch.is_initialized().await);
        orch.initialize().await.unwrap();
        orch.initialize().await.unwrap();

        let first = orch.available_tools().await.unwrap();
        let second = orch.available_tools().await.unwrap();
        assert_eq!(first, second);
        let names: Vec<&str> = first.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["memory_search", "knowledge_base", "clarification_check"]);
    }

    #[tokio::test]
    async fn duplicate_tool_aborts_initialization() {
        let orch = orchestrator().with_tool(Arc::new(StubTool { name: "knowledge_base" }));
        let err = orch.initialize().await.unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::Duplicate(ref name)) if name == "knowledge_base"));
        assert!(!orch.is_initialized().await);
        assert!(orch.process_message("Hello, how are you?").await.is_err());
    }

    #[tokio::test]
    async fn extra_tools_survive_dispose() {
        let orch = orchestrator().with_tool(Arc::new(StubTool { name: "weather" }));
        assert_eq!(orch.available_tools().await.unwrap().len(), 4);

        orch.process_message("Hello, how are you?").await.unwrap();
        orch.dispose().await;
        assert!(!orch.is_initialized().await);
        assert!(orch.session_history().await.is_empty());

        assert_eq!(orch.available_tools().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let orch = orchestrator();
        assert!(matches!(
            orch.process_message("   ").await,
            Err(Error::InvalidInput(_))
        ));
        assert!(orch.session_history().await.is_empty());
    }

    #[tokio::test]
    async fn conversation_turn_updates_history_and_memory() {
        let orch = orchestrator();
        let result = orch.process_message("Hello, how are you?").await.unwrap();

        assert_eq!(result.routing.intent, Intent::Conversation);
        assert!(result.tool_results.is_empty());

        let history = orch.session_history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].content, result.response.content);

        let recent = orch.recent_memories(5).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].user_message, "Hello, how are you?");
    }

    #[tokio::test]
    async fn store_interactions_off_skips_memory_and_reply() {
        let mut config = AppConfig::default();
        config.pipeline.store_interactions = false;
        let orch = Orchestrator::new(config, Arc::new(MemoryStore::in_memory()));

        orch.process_message("Explain the deployment process").await.unwrap();
        assert_eq!(orch.session_history().await.len(), 1);
        assert!(orch.recent_memories(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stored_topics_follow_routing() {
        let orch = orchestrator();
        orch.process_message("Explain the deployment process").await.unwrap();

        let hits = orch.search_memory("documentation", None, None).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].entry.topics.contains(&"deployment".to_string()));
        assert!(hits[0].entry.topics.contains(&"knowledge".to_string()));
    }

    #[tokio::test]
    async fn provider_drives_both_delegated_stages() {
        let mut config = AppConfig::default();
        config.router.strategy = RouterStrategy::Delegated;
        config.synthesizer.strategy = SynthesizerStrategy::Delegated;
        let provider = Arc::new(ScriptedProvider::text(
            r#"{"intent": "conversation", "tools": [], "confidence": 0.5, "reasoning": "chat"}"#,
        ));
        let orch = Orchestrator::new(config, Arc::new(MemoryStore::in_memory()))
            .with_provider(provider.clone());

        let result = orch.process_message("Explain the database schema").await.unwrap();
        assert_eq!(result.routing.intent, Intent::Conversation);
        assert_eq!(result.routing.confidence, 0.5);
        assert!(result.response.content.starts_with("{\"intent\""));
        assert_eq!(provider.prompts().len(), 2);
    }
}
