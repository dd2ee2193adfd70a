//! Response synthesizer: turns a context frame into the final reply.
//!
//! The template strategy is total: it never fails for any frame, which makes
//! it the fallback for the delegated strategy.

use std::sync::Arc;

use serde_json::Value;
use switchyard_config::{SynthesizerConfig, SynthesizerStrategy};
use switchyard_core::error::ProviderError;
use switchyard_core::frame::{AgentResponse, ContextFrame, GenerationMethod, ResponseMetadata};
use switchyard_core::provider::{Provider, ProviderRequest};
use switchyard_core::tool::ToolResult;
use tracing::{debug, warn};

use crate::context::ContextBuilder;
use crate::router::{CLARIFICATION_CHECK, KNOWLEDGE_BASE, MEMORY_SEARCH};

const EXCERPT_CHARS: usize = 500;

const GREETING: &str = "Hello! How can I assist you today? I have access to our conversation history and knowledge base if you need to reference previous discussions or documentation.";
const THANKS: &str = "You're welcome! Let me know if you need anything else.";
const FAREWELL: &str = "Goodbye! Feel free to return whenever you need assistance.";
const GENERIC: &str = "I'm here to help. You can ask me about documentation, reference our past conversations, or discuss any topic you'd like. What would you like to explore?";

pub struct ResponseSynthesizer {
    strategy: SynthesizerStrategy,
    provider: Option<Arc<dyn Provider>>,
    builder: ContextBuilder,
    max_response_length: usize,
}

impl ResponseSynthesizer {
    pub fn new(
        config: &SynthesizerConfig,
        builder: ContextBuilder,
        provider: Option<Arc<dyn Provider>>,
    ) -> Self {
        Self {
            strategy: config.strategy,
            provider,
            builder,
            max_response_length: config.max_response_length,
        }
    }

    /// A template-only synthesizer with default settings.
    pub fn template() -> Self {
        Self::new(&SynthesizerConfig::default(), ContextBuilder::default(), None)
    }

    pub async fn generate(&self, frame: &ContextFrame) -> AgentResponse {
        if self.strategy == SynthesizerStrategy::Delegated {
            match &self.provider {
                Some(provider) => match self.generate_with_provider(provider.as_ref(), frame).await
                {
                    Ok(response) => return response,
                    Err(e) => {
                        warn!(provider = provider.name(), error = %e, "Delegated synthesis failed, using templates");
                    }
                },
                None => debug!("No provider configured for delegated synthesis, using templates"),
            }
        }
        generate_with_templates(frame)
    }

    async fn generate_with_provider(
        &self,
        provider: &dyn Provider,
        frame: &ContextFrame,
    ) -> Result<AgentResponse, ProviderError> {
        let prompt = self.builder.build(frame);
        let reply = provider.complete(ProviderRequest::from_prompt(prompt)).await?;

        let content: String = reply
            .message
            .content
            .trim()
            .chars()
            .take(self.max_response_length)
            .collect();
        if content.is_empty() {
            return Err(ProviderError::InvalidResponse("empty completion".into()));
        }

        Ok(AgentResponse {
            content,
            tools_used: tools_used(frame),
            confidence: if frame.tool_results.is_empty() {
                0.8
            } else {
                confidence(&frame.tool_results)
            },
            metadata: ResponseMetadata {
                generation_method: GenerationMethod::Delegated,
                tool_results_count: frame.tool_results.len(),
            },
        })
    }
}

impl Default for ResponseSynthesizer {
    fn default() -> Self {
        Self::template()
    }
}

/// Template strategy. Never fails.
pub fn generate_with_templates(frame: &ContextFrame) -> AgentResponse {
    let (content, confidence) = if frame.tool_results.is_empty() {
        (conversational_reply(&frame.user_message).to_string(), 0.8)
    } else {
        (
            synthesize_from_tools(frame),
            confidence(&frame.tool_results),
        )
    };

    AgentResponse {
        content,
        tools_used: tools_used(frame),
        confidence,
        metadata: ResponseMetadata {
            generation_method: GenerationMethod::Template,
            tool_results_count: frame.tool_results.len(),
        },
    }
}

fn tools_used(frame: &ContextFrame) -> Vec<String> {
    frame.tool_results.iter().map(|r| r.tool.clone()).collect()
}

/// Canned reply keyed on plain substring checks.
pub fn conversational_reply(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    if lower.contains("hello") || lower.contains("hi") {
        GREETING
    } else if lower.contains("thank") {
        THANKS
    } else if lower.contains("bye") || lower.contains("goodbye") {
        FAREWELL
    } else {
        GENERIC
    }
}

/// `0.8 * success_rate`, plus 0.15 if any success carries data, capped at 0.95.
pub fn confidence(results: &[ToolResult]) -> f64 {
    if results.is_empty() {
        return 0.7;
    }
    let succeeded = results.iter().filter(|r| r.success).count();
    let mut confidence = succeeded as f64 / results.len() as f64 * 0.8;
    if results.iter().any(ToolResult::has_data) {
        confidence += 0.15;
    }
    confidence.min(0.95)
}

fn synthesize_from_tools(frame: &ContextFrame) -> String {
    let successful = |name: &str| {
        frame
            .tool_results
            .iter()
            .find(|r| r.success && r.tool == name)
    };

    if let Some(clarification) = successful(CLARIFICATION_CHECK) {
        return clarification_reply(&frame.user_message, &clarification.raw_data);
    }

    let memory = successful(MEMORY_SEARCH);
    let knowledge = successful(KNOWLEDGE_BASE);
    let mut parts: Vec<String> = Vec::new();

    match (memory.is_some(), knowledge.is_some()) {
        (true, true) => parts.push(
            "I've searched both our previous conversations and the knowledge base to help you."
                .into(),
        ),
        (true, false) => {
            parts.push("Based on our previous conversations, here's what I found:".into())
        }
        (false, true) => parts.push("Here's what I found in the documentation:".into()),
        (false, false) => {}
    }

    if let Some(result) = memory {
        let top = &result.raw_data["results"][0];
        if result.raw_data["found"].as_bool().unwrap_or(false) && top.is_object() {
            parts.push("\n**From our past conversations:**".into());
            parts.push(format!(
                "On {}, we discussed: {}",
                text(&top["date"]),
                text(&top["summary"])
            ));
            parts.push(format!("\nKey points: {}", text(&top["assistantResponse"])));
        } else {
            parts.push(
                "\nI couldn't find relevant information from our previous conversations.".into(),
            );
        }
    }

    if let Some(result) = knowledge {
        let top = &result.raw_data["documents"][0];
        if result.raw_data["found"].as_bool().unwrap_or(false) && top.is_object() {
            parts.push("\n**From the documentation:**".into());
            parts.push(format!("**{}**", text(&top["title"])));
            parts.push(text(&top["content"]).chars().take(EXCERPT_CHARS).collect());
        } else {
            parts.push("\nI couldn't find relevant documentation in the knowledge base.".into());
        }
    }

    let failed: Vec<&str> = frame
        .tool_results
        .iter()
        .filter(|r| !r.success)
        .map(|r| r.tool.as_str())
        .collect();
    if !failed.is_empty() {
        parts.push(format!(
            "\n*Note: Some tools encountered issues: {}*",
            failed.join(", ")
        ));
    }

    if frame.tool_results.iter().any(|r| r.success) {
        parts.push(
            "\nIs there anything specific from this information you would like me to elaborate on?"
                .into(),
        );
    }

    parts.join("\n")
}

fn clarification_reply(user_message: &str, raw: &Value) -> String {
    if !raw["needsClarification"].as_bool().unwrap_or(false) {
        return format!("I understand your request: \"{user_message}\". Let me help you with that.");
    }
    let question = raw["suggestedQuestions"][0]
        .as_str()
        .filter(|q| !q.is_empty())
        .unwrap_or("Could you provide more details?");
    format!("I want to make sure I help you effectively. {question}")
}

fn text(value: &Value) -> &str {
    value.as_str().unwrap_or_default()
}
