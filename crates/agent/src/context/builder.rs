//! Context builder: frame in, prompt text out.
//!
//! Deterministic apart from the optional history timestamps, which render
//! the stored message time rather than the current time.

use switchyard_config::ContextConfig;
use switchyard_core::frame::ContextFrame;
use switchyard_core::message::Message;
use switchyard_core::tool::ToolResult;

const PREAMBLE: &str = "You are an intelligent assistant with access to various tools and information sources. \
Your goal is to provide helpful, accurate, and contextually relevant responses based on the information provided below.";

const INSTRUCTIONS: &str = "## INSTRUCTIONS

Using the context provided above (tool results, memory, and conversation history), generate a helpful and accurate response to the user's current message.

Guidelines:
- Reference specific information from tool results when relevant
- Maintain consistency with previous conversations
- Be concise but thorough
- If information is incomplete or uncertain, acknowledge it
- Do not make up information not provided in the context";

/// Rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderOptions {
    /// Most recent history messages kept
    pub max_history_length: usize,
    /// Prefix history lines with `[HH:MM:SS]`
    pub include_timestamps: bool,
    /// Annotate tool results with status and latency
    pub include_tool_metadata: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            max_history_length: 10,
            include_timestamps: true,
            include_tool_metadata: false,
        }
    }
}

impl From<&ContextConfig> for BuilderOptions {
    fn from(config: &ContextConfig) -> Self {
        Self {
            max_history_length: config.max_history_length,
            include_timestamps: config.include_timestamps,
            include_tool_metadata: config.include_tool_metadata,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContextBuilder {
    options: BuilderOptions,
}

impl ContextBuilder {
    pub fn new(options: BuilderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> BuilderOptions {
        self.options
    }

    /// Render a full prompt using this builder's options.
    pub fn build(&self, frame: &ContextFrame) -> String {
        self.build_with(frame, self.options)
    }

    /// Render a full prompt with one-off options.
    pub fn build_with(&self, frame: &ContextFrame, options: BuilderOptions) -> String {
        let mut sections = vec![PREAMBLE.to_string()];

        if !frame.tool_results.is_empty() {
            sections.push(tool_results_section(&frame.tool_results, options));
        }
        if let Some(memory) = frame.memory_context.as_deref().filter(|m| !m.is_empty()) {
            sections.push(format!("## MEMORY CONTEXT\n\n{memory}"));
        }
        if !frame.conversation_history.is_empty() {
            sections.push(history_section(&frame.conversation_history, options));
        }
        sections.push(format!("## CURRENT USER MESSAGE\n\n{}", frame.user_message));
        sections.push(INSTRUCTIONS.to_string());

        sections.join("\n\n")
    }

    /// Prompt asking a generator to pose one clarifying question.
    pub fn clarification_prompt(user_message: &str, suggested_questions: &[String]) -> String {
        format!(
            "The user's message requires clarification before I can provide a complete response.

User message: \"{user_message}\"

I need to ask one of these clarifying questions:
{}

Generate a polite response that:
1. Acknowledges what I understood from their message
2. Asks the most relevant clarifying question
3. Explains why this information would help me assist them better",
            numbered(suggested_questions)
        )
    }

    /// Prompt asking a generator for a routing decision as strict JSON.
    pub fn routing_prompt(user_message: &str, tools: &[(String, String)]) -> String {
        let tool_list = tools
            .iter()
            .map(|(name, description)| format!("- **{name}**: {description}"))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"Analyze the following user message and determine which tools should be used to best respond.

User message: "{user_message}"

Available tools:
{tool_list}

Respond with a JSON object containing:
{{
  "intent": "knowledge_retrieval" | "memory_access" | "clarification_needed" | "conversation" | "multi_tool",
  "tools": ["tool_name1", "tool_name2"],
  "requiresClarification": boolean,
  "confidence": number between 0 and 1,
  "reasoning": "brief explanation of your decision"
}}

If no tools are needed for a simple conversational response, return an empty tools array with intent "conversation"."#
        )
    }
}

fn tool_results_section(results: &[ToolResult], options: BuilderOptions) -> String {
    let body = results
        .iter()
        .map(|result| {
            let mut section = format!("### {}\n", result.tool);
            if options.include_tool_metadata {
                let status = if result.success { "Success" } else { "Failed" };
                section.push_str(&format!(
                    "Status: {status}\nExecution time: {}ms\n\n",
                    result.execution_time_ms
                ));
            }
            section.push_str(&result.formatted);
            section
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("## TOOL RESULTS\n\n{body}")
}

fn history_section(history: &[Message], options: BuilderOptions) -> String {
    let start = history.len().saturating_sub(options.max_history_length);
    let body = history[start..]
        .iter()
        .map(|msg| {
            let line = format!("**{}**: {}", msg.role.as_str().to_uppercase(), msg.content);
            if options.include_timestamps {
                format!("[{}] {line}", msg.timestamp.format("%H:%M:%S"))
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("## CONVERSATION HISTORY\n\n{body}")
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {item}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}
