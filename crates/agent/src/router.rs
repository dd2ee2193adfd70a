//! Router: decides which tools a message needs.
//!
//! The rule-based strategy is an ordered decision table: each [`Rule`] pairs
//! a predicate over precomputed message [`Signals`] with a builder for the
//! resulting [`RoutingDecision`]. Rules are evaluated top to bottom and the
//! first match wins; the last rule always matches.
//!
//! The delegated strategy asks a [`Provider`] for the decision as JSON and
//! falls back to the rules on any failure.

use std::sync::{Arc, LazyLock};

use regex_lite::Regex;
use switchyard_config::RouterStrategy;
use switchyard_core::error::ProviderError;
use switchyard_core::provider::{Provider, ProviderRequest};
use switchyard_core::routing::{Intent, RoutingDecision};
use switchyard_core::tool::{ToolInvocation, ToolRegistry};
use tracing::{debug, warn};

use crate::context::ContextBuilder;

pub const MEMORY_SEARCH: &str = "memory_search";
pub const KNOWLEDGE_BASE: &str = "knowledge_base";
pub const CLARIFICATION_CHECK: &str = "clarification_check";

const KNOWLEDGE_CATEGORIES: &[&str] = &["infrastructure", "security", "api", "database", "testing"];

static MEMORY_CUES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(remember|recall|last time|previously|before|earlier|past|history)\b",
        r"\b(we (discussed|talked|mentioned))\b",
        r"\b(you (said|told|mentioned))\b",
        r"\b(what did (we|i|you))\b",
        r"\b(ago|last week|yesterday|last month)\b",
    ])
});

static KNOWLEDGE_CUES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(documentation|docs|guide|how to|tutorial)\b",
        r"\b(what is|explain|describe|define)\b",
        r"\b(how does|how do|how can)\b",
        r"\b(best practice|recommended|standard)\b",
        r"\b(api|endpoint|schema|database|deployment)\b",
        r"\b(process|procedure|workflow|steps|flow)\b",
        r"\b(authentication|authorization|security)\b",
        r"\b(testing|migration|configuration)\b",
    ])
});

static TOO_VAGUE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"^(help|fix|change|update)\s*$",
        r"^\s*\?\s*$",
        r"^what\s*$",
        r"^how\s*$",
    ])
});

static TIMEFRAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(day|week|month)s?\s*ago").ok());

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
}

/// Everything the decision table looks at, computed once per message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    pub memory: bool,
    pub knowledge: bool,
    pub too_vague: bool,
    pub very_short: bool,
    pub has_question_mark: bool,
}

impl Signals {
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        Self {
            memory: MEMORY_CUES.iter().any(|re| re.is_match(&lower)),
            knowledge: KNOWLEDGE_CUES.iter().any(|re| re.is_match(&lower)),
            too_vague: TOO_VAGUE.iter().any(|re| re.is_match(&lower)),
            very_short: message.split_whitespace().count() < 3,
            has_question_mark: message.contains('?'),
        }
    }
}

/// One row of the decision table.
pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&Signals) -> bool,
    pub decide: fn(&ToolRegistry) -> RoutingDecision,
}

/// The rule-based routing table, highest precedence first.
pub static RULES: &[Rule] = &[
    Rule {
        name: "clarification",
        matches: |s| s.too_vague || (s.very_short && !s.has_question_mark),
        decide: |_| RoutingDecision {
            intent: Intent::ClarificationNeeded,
            tools: vec![CLARIFICATION_CHECK.to_string()],
            requires_clarification: true,
            confidence: 0.9,
            reasoning: "Message is too vague or short to determine intent".into(),
        },
    },
    Rule {
        name: "multi_tool",
        matches: |s| s.memory && s.knowledge,
        decide: multi_tool,
    },
    Rule {
        name: "memory",
        matches: |s| s.memory,
        decide: memory_access,
    },
    Rule {
        name: "knowledge",
        matches: |s| s.knowledge,
        decide: knowledge_retrieval,
    },
    Rule {
        name: "conversation",
        matches: |_| true,
        decide: |_| conversation(),
    },
];

/// Both cues, narrowed to a single-tool intent when only one of the two
/// tools is registered.
fn multi_tool(registry: &ToolRegistry) -> RoutingDecision {
    match (registry.has(MEMORY_SEARCH), registry.has(KNOWLEDGE_BASE)) {
        (true, false) => memory_access(registry),
        (false, true) => knowledge_retrieval(registry),
        _ => RoutingDecision {
            intent: Intent::MultiTool,
            tools: registered(registry, &[MEMORY_SEARCH, KNOWLEDGE_BASE]),
            requires_clarification: false,
            confidence: 0.8,
            reasoning: "Message requires both memory context and knowledge base lookup".into(),
        },
    }
}

fn memory_access(registry: &ToolRegistry) -> RoutingDecision {
    RoutingDecision {
        intent: Intent::MemoryAccess,
        tools: registered(registry, &[MEMORY_SEARCH]),
        requires_clarification: false,
        confidence: 0.85,
        reasoning: "Message references past conversations or needs historical context".into(),
    }
}

fn knowledge_retrieval(registry: &ToolRegistry) -> RoutingDecision {
    RoutingDecision {
        intent: Intent::KnowledgeRetrieval,
        tools: registered(registry, &[KNOWLEDGE_BASE]),
        requires_clarification: false,
        confidence: 0.85,
        reasoning: "Message requires documentation or knowledge base information".into(),
    }
}

fn registered(registry: &ToolRegistry, names: &[&str]) -> Vec<String> {
    names
        .iter()
        .filter(|name| registry.has(name))
        .map(|name| name.to_string())
        .collect()
}

fn conversation() -> RoutingDecision {
    RoutingDecision {
        intent: Intent::Conversation,
        tools: Vec::new(),
        requires_clarification: false,
        confidence: 0.9,
        reasoning: "Standard conversational message, no special tools needed".into(),
    }
}

pub struct Router {
    strategy: RouterStrategy,
    provider: Option<Arc<dyn Provider>>,
}

impl Router {
    pub fn new(strategy: RouterStrategy, provider: Option<Arc<dyn Provider>>) -> Self {
        Self { strategy, provider }
    }

    /// A purely rule-based router.
    pub fn rules() -> Self {
        Self::new(RouterStrategy::Rules, None)
    }

    pub async fn classify(&self, message: &str, registry: &ToolRegistry) -> RoutingDecision {
        if self.strategy == RouterStrategy::Delegated {
            match &self.provider {
                Some(provider) => {
                    match classify_with_provider(provider.as_ref(), message, registry).await {
                        Ok(decision) => return decision,
                        Err(e) => {
                            warn!(provider = provider.name(), error = %e, "Delegated routing failed, using rules");
                        }
                    }
                }
                None => debug!("No provider configured for delegated routing, using rules"),
            }
        }
        classify_with_rules(message, registry)
    }

    /// Per-tool inputs for the selected tools, in the same order.
    pub fn extract_tool_inputs(&self, message: &str, tools: &[String]) -> Vec<ToolInvocation> {
        extract_tool_inputs(message, tools)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::rules()
    }
}

/// Evaluate the decision table.
pub fn classify_with_rules(message: &str, registry: &ToolRegistry) -> RoutingDecision {
    let signals = Signals::from_message(message);
    let Some(rule) = RULES.iter().find(|rule| (rule.matches)(&signals)) else {
        return conversation();
    };
    let decision = (rule.decide)(registry);
    debug!(rule = rule.name, intent = %decision.intent, tools = ?decision.tools, "Message routed");
    decision
}

async fn classify_with_provider(
    provider: &dyn Provider,
    message: &str,
    registry: &ToolRegistry,
) -> Result<RoutingDecision, ProviderError> {
    let prompt = ContextBuilder::routing_prompt(message, &registry.descriptions());
    let response = provider
        .complete(ProviderRequest::from_prompt(prompt).with_temperature(0.0))
        .await?;
    parse_decision(&response.message.content, registry)
}

/// Parse a generator's JSON reply, tolerating prose or code fences around it.
///
/// Unknown or repeated tool names are dropped and confidence is clamped.
pub fn parse_decision(reply: &str, registry: &ToolRegistry) -> Result<RoutingDecision, ProviderError> {
    let json = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => return Err(ProviderError::InvalidResponse("no JSON object in reply".into())),
    };
    let mut decision: RoutingDecision = serde_json::from_str(json)
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

    let mut tools: Vec<String> = Vec::with_capacity(decision.tools.len());
    for tool in decision.tools {
        if registry.has(&tool) && !tools.contains(&tool) {
            tools.push(tool);
        }
    }
    decision.tools = tools;
    decision.confidence = decision.confidence.clamp(0.0, 1.0);
    if decision.intent == Intent::ClarificationNeeded {
        decision.requires_clarification = true;
    }
    Ok(decision)
}

/// Derive tool-specific inputs from the raw message.
pub fn extract_tool_inputs(message: &str, tools: &[String]) -> Vec<ToolInvocation> {
    tools
        .iter()
        .map(|name| {
            let input = match name.as_str() {
                MEMORY_SEARCH => {
                    let mut input = serde_json::json!({ "query": message, "limit": 5 });
                    if let Some(days) = timeframe_days(message) {
                        input["timeframeDays"] = days.into();
                    }
                    input
                }
                KNOWLEDGE_BASE => {
                    let mut input = serde_json::json!({ "query": message, "limit": 3 });
                    if let Some(category) = category(message) {
                        input["category"] = category.into();
                    }
                    input
                }
                CLARIFICATION_CHECK => serde_json::json!({
                    "userMessage": message,
                    "conversationHistory": [],
                }),
                _ => serde_json::json!({ "query": message }),
            };
            ToolInvocation::new(name.clone(), input)
        })
        .collect()
}

/// "N days/weeks/months ago", else "last week" (7) or "yesterday" (1).
pub fn timeframe_days(message: &str) -> Option<u32> {
    if let Some(caps) = TIMEFRAME.as_ref().and_then(|re| re.captures(message)) {
        let n: u32 = caps[1].parse().unwrap_or(u32::MAX);
        let per_unit = match caps[2].to_lowercase().as_str() {
            "week" => 7,
            "month" => 30,
            _ => 1,
        };
        return Some(n.saturating_mul(per_unit));
    }

    let lower = message.to_lowercase();
    if lower.contains("last week") {
        Some(7)
    } else if lower.contains("yesterday") {
        Some(1)
    } else {
        None
    }
}

fn category(message: &str) -> Option<&'static str> {
    let lower = message.to_lowercase();
    KNOWLEDGE_CATEGORIES
        .iter()
        .copied()
        .find(|c| lower.contains(c))
}
