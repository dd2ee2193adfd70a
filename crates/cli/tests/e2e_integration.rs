//! End-to-end integration tests for the Switchyard pipeline.
//!
//! These tests drive whole pipeline runs across crates: routing, concurrent
//! tool dispatch, synthesis and memory, with both the built-in tools and
//! small test doubles.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use switchyard_agent::{ContextBuilder, Orchestrator, ResponseSynthesizer, Router};
use switchyard_config::{AppConfig, MemoryBackendKind, RouterStrategy, SynthesizerStrategy};
use switchyard_core::error::{Error, ProviderError, ToolError};
use switchyard_core::frame::{ContextFrame, GenerationMethod};
use switchyard_core::memory::{MemoryBackend, MemoryEntry};
use switchyard_core::message::Role;
use switchyard_core::provider::{Provider, ProviderRequest, ProviderResponse};
use switchyard_core::routing::Intent;
use switchyard_core::tool::{Tool, ToolInvocation, ToolRegistry};
use switchyard_memory::{InMemoryBackend, MemoryStore};
use switchyard_tools::MemorySearchTool;

// ── Test doubles ─────────────────────────────────────────────────────────

/// A provider that is always down.
struct OfflineProvider;

#[async_trait]
impl Provider for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::RequestFailed("connection refused".into()))
    }
}

/// A tool that sleeps, then either answers or fails.
struct SlowTool {
    name: &'static str,
    delay_ms: u64,
    fail: bool,
}

#[async_trait]
impl Tool for SlowTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Sleeps before answering"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object" })
    }

    async fn invoke(&self, _input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        if self.fail {
            return Err(ToolError::ExecutionFailed {
                tool_name: self.name.into(),
                reason: "backend unavailable".into(),
            });
        }
        Ok(serde_json::json!({ "found": true, "count": 1 }))
    }

    fn format_output(&self, raw: &serde_json::Value) -> Result<String, ToolError> {
        Ok(format!("{} answered {raw}", self.name))
    }
}

fn orchestrator() -> Orchestrator {
    Orchestrator::new(AppConfig::default(), Arc::new(MemoryStore::in_memory()))
}

fn episode(user: &str, assistant: &str, days_ago: i64) -> MemoryEntry {
    MemoryEntry {
        id: String::new(),
        timestamp: Utc::now() - chrono::Duration::days(days_ago),
        user_message: user.into(),
        assistant_response: assistant.into(),
        topics: vec!["deployment".into()],
        summary: format!("{user} {assistant}"),
    }
}

// ── E2E: Canonical scenarios ─────────────────────────────────────────────

#[tokio::test]
async fn e2e_greeting_is_a_plain_conversation() {
    let orch = orchestrator();
    let result = orch.process_message("Hello, how are you?").await.unwrap();

    assert_eq!(result.routing.intent, Intent::Conversation);
    assert!(result.routing.tools.is_empty());
    assert!(result.tool_results.is_empty());
    assert!(result.response.content.starts_with("Hello! How can I assist you today?"));
    assert_eq!(result.response.confidence, 0.8);
    assert_eq!(result.response.metadata.generation_method, GenerationMethod::Template);
}

#[tokio::test]
async fn e2e_memory_access_with_timeframe() {
    let backend = Arc::new(InMemoryBackend::new());
    backend
        .store(episode(
            "How should we handle deployment rollbacks?",
            "Keep the previous release warm for 30 minutes.",
            5,
        ))
        .await
        .unwrap();
    backend
        .store(episode(
            "Old deployment notes",
            "From a quarter ago.",
            90,
        ))
        .await
        .unwrap();
    let store = Arc::new(MemoryStore::new(backend));

    let mut registry = ToolRegistry::new();
    registry
        .register(Box::new(MemorySearchTool::new(store.clone())))
        .unwrap();

    let message = "What did we discuss about deployment last week?";
    let router = Router::rules();
    let routing = router.classify(message, &registry).await;
    assert_eq!(routing.intent, Intent::MemoryAccess);
    assert_eq!(routing.tools, vec!["memory_search"]);

    let invocations = router.extract_tool_inputs(message, &routing.tools);
    assert_eq!(invocations[0].input["timeframeDays"], 7);

    let tool_results = registry.execute_multiple(&invocations).await;
    assert!(tool_results[0].success);
    assert_eq!(tool_results[0].raw_data["count"], 1);
    assert!(
        tool_results[0].raw_data["results"][0]["userMessage"]
            .as_str()
            .unwrap()
            .contains("rollbacks")
    );

    let mut frame = ContextFrame::new(message);
    frame.tool_results = tool_results;
    let response = ResponseSynthesizer::template().generate(&frame).await;
    assert!(response.content.contains("Based on our previous conversations"));
    assert!(response.content.contains("Keep the previous release warm"));
    assert_eq!(response.tools_used, vec!["memory_search"]);
}

#[tokio::test]
async fn e2e_vague_message_asks_for_clarification() {
    let orch = orchestrator();
    let result = orch.process_message("fix").await.unwrap();

    assert_eq!(result.routing.intent, Intent::ClarificationNeeded);
    assert!(result.routing.requires_clarification);
    assert_eq!(result.routing.tools, vec!["clarification_check"]);
    assert_eq!(result.routing.confidence, 0.9);
    assert!(result.tool_results[0].success);
    assert!(result.response.content.starts_with("I want to make sure I help you effectively."));
    assert!(result.response.content.ends_with('?'));
}

#[tokio::test]
async fn e2e_duplicate_registration_aborts_initialization() {
    let orch = orchestrator().with_tool(Arc::new(SlowTool {
        name: "memory_search",
        delay_ms: 0,
        fail: false,
    }));

    let err = orch.initialize().await.unwrap_err();
    assert!(matches!(err, Error::Tool(ToolError::Duplicate(_))));
    assert!(!orch.is_initialized().await);
    assert!(orch.available_tools().await.is_err());

    let mut registry = ToolRegistry::new();
    let tool = Arc::new(SlowTool {
        name: "twin",
        delay_ms: 0,
        fail: false,
    });
    registry.register(Box::new(tool.clone())).unwrap();
    assert!(matches!(
        registry.register(Box::new(tool)),
        Err(ToolError::Duplicate(name)) if name == "twin"
    ));
}

// ── E2E: Routing through the full pipeline ───────────────────────────────

#[tokio::test]
async fn e2e_knowledge_retrieval_quotes_documentation() {
    let orch = orchestrator();
    let result = orch
        .process_message("How does the token refresh flow work?")
        .await
        .unwrap();

    assert_eq!(result.routing.intent, Intent::KnowledgeRetrieval);
    let raw = &result.tool_results[0].raw_data;
    assert_eq!(raw["documents"][0]["title"], "API Authentication");
    assert!(result.response.content.starts_with("Here's what I found in the documentation:"));
    assert!(result.response.content.contains("**API Authentication**"));
}

#[tokio::test]
async fn e2e_multi_tool_uses_both_sources() {
    let orch = orchestrator();
    orch.process_message("Explain the deployment process").await.unwrap();

    let result = orch
        .process_message("Remember the deployment documentation we looked at before?")
        .await
        .unwrap();
    assert_eq!(result.routing.intent, Intent::MultiTool);
    assert_eq!(result.routing.tools, vec!["memory_search", "knowledge_base"]);
    assert_eq!(result.tool_results.len(), 2);
    assert!(result.tool_results.iter().all(|r| r.success));
    assert!(result.response.content.starts_with(
        "I've searched both our previous conversations and the knowledge base to help you."
    ));
    assert!(result.response.content.contains("**From our past conversations:**"));
    assert!(result.response.content.contains("**From the documentation:**"));
    assert_eq!(result.response.confidence, 0.95);
}

// ── E2E: Testable properties ─────────────────────────────────────────────

#[tokio::test]
async fn e2e_vague_inputs_all_route_to_clarification() {
    let orch = orchestrator();
    for message in ["fix it", "?", "what", "help", "update"] {
        let result = orch.process_message(message).await.unwrap();
        assert_eq!(result.routing.intent, Intent::ClarificationNeeded, "{message}");
        assert_eq!(result.routing.tools, vec!["clarification_check"], "{message}");
        assert_eq!(result.routing.confidence, 0.9, "{message}");
    }
}

#[tokio::test]
async fn e2e_memory_search_is_ranked_and_positive() {
    let orch = orchestrator();
    orch.process_message("Explain the database migration steps").await.unwrap();
    orch.process_message("How does deployment to the database cluster work?")
        .await
        .unwrap();
    orch.process_message("Hello there").await.unwrap();

    let hits = orch.search_memory("database deployment", None, None).await.unwrap();
    assert!(!hits.is_empty());
    assert!(hits.iter().all(|h| h.relevance > 0.0));
    assert!(hits.windows(2).all(|w| w[0].relevance >= w[1].relevance));
    assert!(orch.search_memory("", None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn e2e_execute_multiple_preserves_order_and_isolates_failures() {
    let mut registry = ToolRegistry::new();
    for (name, delay_ms, fail) in [("slow", 60, false), ("broken", 5, true), ("fast", 1, false)] {
        registry
            .register(Box::new(SlowTool { name, delay_ms, fail }))
            .unwrap();
    }

    let invocations = vec![
        ToolInvocation::new("slow", serde_json::json!({})),
        ToolInvocation::new("broken", serde_json::json!({})),
        ToolInvocation::new("missing", serde_json::json!({})),
        ToolInvocation::new("fast", serde_json::json!({})),
    ];
    let results = registry.execute_multiple(&invocations).await;

    let names: Vec<&str> = results.iter().map(|r| r.tool.as_str()).collect();
    assert_eq!(names, vec!["slow", "broken", "missing", "fast"]);
    let outcomes: Vec<bool> = results.iter().map(|r| r.success).collect();
    assert_eq!(outcomes, vec![true, false, false, true]);
    assert!(results[1].formatted.starts_with("Error executing broken:"));
    assert_eq!(results[2].formatted, "Error: Tool \"missing\" not found");
}

#[tokio::test]
async fn e2e_failed_tool_is_named_in_the_reply() {
    let mut registry = ToolRegistry::new();
    registry
        .register(Box::new(SlowTool {
            name: "knowledge_base",
            delay_ms: 0,
            fail: true,
        }))
        .unwrap();

    let message = "Explain the testing strategy";
    let router = Router::rules();
    let routing = router.classify(message, &registry).await;
    let results = registry
        .execute_multiple(&router.extract_tool_inputs(message, &routing.tools))
        .await;

    let mut frame = ContextFrame::new(message);
    frame.tool_results = results;
    let response = ResponseSynthesizer::template().generate(&frame).await;
    assert!(response.content.contains("*Note: Some tools encountered issues: knowledge_base*"));
    assert_eq!(response.confidence, 0.0);
}

#[tokio::test]
async fn e2e_session_lifecycle() {
    let orch = orchestrator();
    let first = orch.available_tools().await.unwrap();
    let second = orch.available_tools().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);

    orch.process_message("Hello, how are you?").await.unwrap();
    orch.process_message("Thanks a lot").await.unwrap();
    let history = orch.session_history().await;
    let roles: Vec<Role> = history.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);

    orch.clear_session().await;
    assert!(orch.session_history().await.is_empty());
    assert_eq!(orch.recent_memories(10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn e2e_independent_pipelines_do_not_share_state() {
    let a = orchestrator();
    let b = orchestrator();
    a.process_message("Explain the deployment process").await.unwrap();

    assert_eq!(a.session_history().await.len(), 2);
    assert!(b.session_history().await.is_empty());
    assert!(b.recent_memories(5).await.unwrap().is_empty());
}

#[tokio::test]
async fn e2e_huge_timeframe_searches_all_memory() {
    let orch = orchestrator();
    orch.process_message("Explain the deployment process").await.unwrap();

    let result = orch
        .process_message("What did we discuss about deployment 99999999 months ago?")
        .await
        .unwrap();
    let memory = &result.tool_results[0];
    assert_eq!(memory.tool, "memory_search");
    assert!(memory.success);
    assert_eq!(memory.raw_data["found"], true);
    assert!(!result.response.content.contains("Some tools encountered issues"));

    let hits = orch
        .search_memory("deployment", None, Some(u32::MAX))
        .await
        .unwrap();
    assert!(!hits.is_empty());
}

#[tokio::test]
async fn e2e_empty_input_is_rejected() {
    let orch = orchestrator();
    for message in ["", "  \n\t"] {
        assert!(matches!(
            orch.process_message(message).await,
            Err(Error::InvalidInput(_))
        ));
    }
}

#[tokio::test]
async fn e2e_offline_provider_falls_back_to_rules_and_templates() {
    let mut config = AppConfig::default();
    config.router.strategy = RouterStrategy::Delegated;
    config.synthesizer.strategy = SynthesizerStrategy::Delegated;
    let orch = Orchestrator::new(config, Arc::new(MemoryStore::in_memory()))
        .with_provider(Arc::new(OfflineProvider));

    let result = orch.process_message("Hello, how are you?").await.unwrap();
    assert_eq!(result.routing.intent, Intent::Conversation);
    assert_eq!(result.routing.confidence, 0.9);
    assert_eq!(result.response.metadata.generation_method, GenerationMethod::Template);
    assert!(result.response.content.starts_with("Hello!"));
}

// ── E2E: Durable memory ──────────────────────────────────────────────────

#[tokio::test]
async fn e2e_file_memory_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.memory.backend = MemoryBackendKind::File;
    config.memory.path = Some(dir.path().to_path_buf());

    let first = Orchestrator::new(
        config.clone(),
        Arc::new(MemoryStore::from_config(&config.memory)),
    );
    first
        .process_message("Explain the API authentication flow")
        .await
        .unwrap();
    first.dispose().await;
    assert!(dir.path().join("switchyard-conversations.jsonl").exists());

    let second = Orchestrator::new(
        config.clone(),
        Arc::new(MemoryStore::from_config(&config.memory)),
    );
    let result = second
        .process_message("What did we discuss about authentication before?")
        .await
        .unwrap();
    assert_eq!(result.routing.intent, Intent::MultiTool);
    assert_eq!(result.tool_results[0].raw_data["found"], true);
    assert_eq!(second.session_history().await.len(), 2);
    assert_eq!(second.recent_memories(10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn e2e_routing_prompt_lists_registered_tools() {
    let orch = orchestrator();
    let tools: Vec<(String, String)> = orch
        .available_tools()
        .await
        .unwrap()
        .into_iter()
        .map(|t| (t.name, t.description))
        .collect();

    let prompt = ContextBuilder::routing_prompt("what did we discuss?", &tools);
    for (name, _) in &tools {
        assert!(prompt.contains(&format!("- **{name}**:")));
    }
}
