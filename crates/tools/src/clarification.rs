//! Clarification check: decides whether a message is too vague to act on.
//!
//! Three heuristics, first match wins: incomplete request, vague reference,
//! ambiguous verb in a short message. Each produces suggested follow-up
//! questions the synthesizer can put to the user.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use switchyard_core::error::ToolError;
use switchyard_core::tool::Tool;

const NAME: &str = "clarification_check";

const INCOMPLETE_PATTERNS: &[&str] = &[
    r"^(how|what|why|when|where)\s*\?*$",
    r"\bhelp\s*(me)?\s*$",
    r"\bfix\s*(it)?\s*$",
    r"\bchange\s*(it)?\s*$",
];

const VAGUE_PATTERNS: &[&str] = &[r"\bthe thing\b", r"\bstuff\b", r"\bwhatever\b"];

const AMBIGUOUS_TERMS: &[&str] = &["better", "improve", "optimize", "fix", "update", "change"];

static INCOMPLETE: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(INCOMPLETE_PATTERNS));
static VAGUE: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(VAGUE_PATTERNS));

// A demonstrative counts as vague unless it introduces a definition
// ("this is a ..."). regex-lite has no lookahead, so the follow-up is
// checked against the text after each match.
static DEMONSTRATIVE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b(it|this|that|these|those)\b").ok());
static DEFINITION_FOLLOWS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s+is\s+(a|an|the)").ok());

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityType {
    Vague,
    Incomplete,
    MultipleInterpretations,
    MissingContext,
}

impl AmbiguityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmbiguityType::Vague => "vague",
            AmbiguityType::Incomplete => "incomplete",
            AmbiguityType::MultipleInterpretations => "multiple_interpretations",
            AmbiguityType::MissingContext => "missing_context",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClarificationOutput {
    pub needs_clarification: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambiguity_type: Option<AmbiguityType>,
    #[serde(default)]
    pub suggested_questions: Vec<String>,
    pub confidence: f64,
}

fn has_vague_reference(message: &str) -> bool {
    if VAGUE.iter().any(|re| re.is_match(message)) {
        return true;
    }
    let (Some(demonstrative), Some(definition)) = (&*DEMONSTRATIVE, &*DEFINITION_FOLLOWS) else {
        return false;
    };
    demonstrative
        .find_iter(message)
        .any(|m| !definition.is_match(&message[m.end()..]))
}

/// Run the heuristics over one message.
pub fn analyze(user_message: &str) -> ClarificationOutput {
    let lower = user_message.to_lowercase();

    let is_very_short = user_message.split_whitespace().count() < 4;
    let has_question_mark = lower.contains('?');
    let incomplete = INCOMPLETE.iter().any(|re| re.is_match(&lower));
    let ambiguous = AMBIGUOUS_TERMS.iter().any(|t| lower.contains(t));

    let (ambiguity_type, mut questions, confidence) =
        if incomplete || (is_very_short && !has_question_mark) {
            (
                Some(AmbiguityType::Incomplete),
                vec![
                    "Could you provide more details about what you need help with?".to_string(),
                    "What specific aspect would you like me to focus on?".to_string(),
                ],
                0.85,
            )
        } else if has_vague_reference(&lower) {
            (
                Some(AmbiguityType::Vague),
                vec![
                    "Could you clarify what you are referring to?".to_string(),
                    "Can you be more specific about which component or feature?".to_string(),
                ],
                0.8,
            )
        } else if ambiguous && is_very_short {
            let mut questions = Vec::new();
            if lower.contains("improve") || lower.contains("optimize") {
                questions.push(
                    "Are you looking to improve performance, readability, or functionality?"
                        .to_string(),
                );
            }
            if lower.contains("fix") {
                questions.push("What specific issue or error are you experiencing?".to_string());
            }
            if lower.contains("update") || lower.contains("change") {
                questions.push("What changes would you like to make?".to_string());
            }
            (Some(AmbiguityType::MultipleInterpretations), questions, 0.75)
        } else {
            (None, Vec::new(), 0.9)
        };

    let needs_clarification = ambiguity_type.is_some();
    if needs_clarification && questions.is_empty() {
        questions.push("Could you provide more context about your request?".to_string());
    }

    ClarificationOutput {
        needs_clarification,
        ambiguity_type,
        suggested_questions: questions,
        confidence,
    }
}

pub struct ClarificationTool;

#[async_trait]
impl Tool for ClarificationTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Analyze the user message to determine if clarification is needed before proceeding. \
         Use this when the user request is ambiguous, incomplete, or could have multiple interpretations."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "userMessage": {
                    "type": "string",
                    "description": "The user message to analyze"
                },
                "conversationHistory": {
                    "type": "array",
                    "description": "Recent conversation history for context"
                }
            },
            "required": ["userMessage", "conversationHistory"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let message = input["userMessage"].as_str().ok_or_else(|| {
            ToolError::InvalidArguments("Missing 'userMessage' argument".into())
        })?;
        crate::to_raw(NAME, &analyze(message))
    }

    fn format_output(&self, raw: &serde_json::Value) -> Result<String, ToolError> {
        let output: ClarificationOutput = crate::from_raw(NAME, raw)?;
        if !output.needs_clarification {
            return Ok("The request is clear and can be processed.".into());
        }

        let questions = output
            .suggested_questions
            .iter()
            .enumerate()
            .map(|(i, q)| format!("{}. {q}", i + 1))
            .collect::<Vec<_>>()
            .join("\n");
        let kind = output.ambiguity_type.map_or("unknown", |t| t.as_str());

        Ok(format!(
            "**Clarification Needed** ({kind})\n\nSuggested questions to ask:\n{questions}"
        ))
    }
}
