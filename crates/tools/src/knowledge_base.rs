//! Knowledge base tool: keyword search over the internal documentation set.
//!
//! The corpus is a fixed set of markdown documents compiled into the binary.
//! Scoring per document, summed over the lower-cased query words and divided
//! by the word count:
//!
//! - +1.0 if the word appears in title, content or tags
//! - +0.5 if it appears in the title
//! - +0.3 if it appears in any tag

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use switchyard_core::error::ToolError;
use switchyard_core::tool::Tool;
use tracing::debug;

const NAME: &str = "knowledge_base";
const DEFAULT_LIMIT: u64 = 3;

/// A single document in the knowledge base.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeDocument {
    pub id: &'static str,
    pub title: &'static str,
    pub content: &'static str,
    pub category: &'static str,
    pub tags: &'static [&'static str],
    pub last_updated: &'static str,
}

impl KnowledgeDocument {
    fn relevance(&self, words: &[String]) -> f64 {
        if words.is_empty() {
            return 0.0;
        }
        let search_text =
            format!("{} {} {}", self.title, self.content, self.tags.join(" ")).to_lowercase();
        let title = self.title.to_lowercase();
        let tags: Vec<String> = self.tags.iter().map(|t| t.to_lowercase()).collect();

        let mut score = 0.0;
        for word in words {
            if search_text.contains(word.as_str()) {
                score += 1.0;
            }
            if title.contains(word.as_str()) {
                score += 0.5;
            }
            if tags.iter().any(|t| t.contains(word.as_str())) {
                score += 0.3;
            }
        }
        score / words.len() as f64
    }
}

pub const DOCUMENTS: &[KnowledgeDocument] = &[
    KnowledgeDocument {
        id: "doc_001",
        title: "Deployment Guide",
        content: r"# Deployment Guide

## Overview
Our deployment process uses blue-green deployment strategy for zero-downtime releases.

## Steps
1. Build the application
2. Run tests in CI
3. Deploy to staging environment
4. Run integration tests
5. Deploy to production (blue-green swap)

## Rollback Procedure
- Rollback window: 30 minutes
- Command: `kubectl rollout undo deployment/app`
- Automatic rollback on health check failures",
        category: "infrastructure",
        tags: &["deployment", "kubernetes", "devops"],
        last_updated: "2025-11-10",
    },
    KnowledgeDocument {
        id: "doc_002",
        title: "API Authentication",
        content: r"# API Authentication

## Token Types
- Access Token: JWT, 15-minute expiry
- Refresh Token: Opaque, 7-day expiry

## Flow
1. User logs in with credentials
2. Server validates and issues tokens
3. Access token used for API calls
4. Refresh token used to get new access token

## Security Measures
- Tokens stored in httpOnly cookies
- CSRF protection enabled
- Rate limiting on auth endpoints",
        category: "security",
        tags: &["authentication", "jwt", "security", "api"],
        last_updated: "2025-11-12",
    },
    KnowledgeDocument {
        id: "doc_003",
        title: "Database Schema",
        content: r"# Database Schema

## Users Table
- id: UUID
- email: VARCHAR(255)
- created_at: TIMESTAMP
- updated_at: TIMESTAMP

## Sessions Table
- id: UUID
- user_id: UUID (FK)
- token: VARCHAR(512)
- expires_at: TIMESTAMP

## Migrations
Run migrations with: `npm run db:migrate`
Rollback with: `npm run db:rollback`",
        category: "database",
        tags: &["database", "schema", "postgresql", "migrations"],
        last_updated: "2025-11-08",
    },
    KnowledgeDocument {
        id: "doc_004",
        title: "Error Handling Best Practices",
        content: r#"# Error Handling

## Client Errors (4xx)
- 400: Bad Request - Invalid input
- 401: Unauthorized - Missing/invalid auth
- 403: Forbidden - Insufficient permissions
- 404: Not Found - Resource doesn't exist

## Server Errors (5xx)
- 500: Internal Server Error
- 503: Service Unavailable

## Error Response Format
```json
{
  "error": {
    "code": "ERROR_CODE",
    "message": "Human readable message",
    "details": {}
  }
}
```"#,
        category: "api",
        tags: &["errors", "api", "best-practices"],
        last_updated: "2025-11-14",
    },
    KnowledgeDocument {
        id: "doc_005",
        title: "Testing Strategy",
        content: r"# Testing Strategy

## Unit Tests
- Framework: Jest
- Coverage target: 80%
- Run: `npm test`

## Integration Tests
- Framework: Jest + Supertest
- Database: Test container
- Run: `npm run test:integration`

## E2E Tests
- Framework: Playwright
- Run: `npm run test:e2e`

## CI Pipeline
All tests run on PR creation and merge to main.",
        category: "testing",
        tags: &["testing", "jest", "playwright", "ci"],
        last_updated: "2025-11-11",
    },
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeSearchOutput {
    pub found: bool,
    pub count: usize,
    pub documents: Vec<DocumentHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHit {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub relevance: f64,
    pub last_updated: String,
}

pub struct KnowledgeBaseTool {
    documents: &'static [KnowledgeDocument],
}

impl KnowledgeBaseTool {
    pub fn new() -> Self {
        Self {
            documents: DOCUMENTS,
        }
    }

    pub fn search(&self, query: &str, category: Option<&str>, limit: usize) -> Vec<DocumentHit> {
        let words: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let mut scored: Vec<(&KnowledgeDocument, f64)> = self
            .documents
            .iter()
            .filter(|doc| category.is_none_or(|c| doc.category.eq_ignore_ascii_case(c)))
            .map(|doc| (doc, doc.relevance(&words)))
            .filter(|(_, relevance)| *relevance > 0.0)
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(doc, relevance)| DocumentHit {
                id: doc.id.to_string(),
                title: doc.title.to_string(),
                content: doc.content.to_string(),
                category: doc.category.to_string(),
                relevance: (relevance * 100.0).round() / 100.0,
                last_updated: doc.last_updated.to_string(),
            })
            .collect()
    }
}

impl Default for KnowledgeBaseTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for KnowledgeBaseTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Search the internal knowledge base for documentation, guides, and technical information. \
         Use this to find official documentation about processes, APIs, architecture, and best practices."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to find relevant documentation"
                },
                "category": {
                    "type": "string",
                    "description": "Optional category filter (infrastructure, security, api, database, testing)"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of documents to return (default 3)",
                    "default": 3
                }
            },
            "required": ["query"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let query = input["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;
        let category = input["category"].as_str().filter(|c| !c.is_empty());
        let limit = input["limit"]
            .as_u64()
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_LIMIT) as usize;

        let documents = self.search(query, category, limit);
        debug!(query, ?category, hits = documents.len(), "Knowledge base searched");
        crate::to_raw(
            NAME,
            &KnowledgeSearchOutput {
                found: !documents.is_empty(),
                count: documents.len(),
                documents,
            },
        )
    }

    fn format_output(&self, raw: &serde_json::Value) -> Result<String, ToolError> {
        let output: KnowledgeSearchOutput = crate::from_raw(NAME, raw)?;
        if !output.found {
            return Ok("No relevant documentation found in the knowledge base.".into());
        }

        let formatted = output
            .documents
            .iter()
            .map(|doc| {
                format!(
                    "**{}** ({})\nLast updated: {}\n\n{}",
                    doc.title, doc.category, doc.last_updated, doc.content
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n---\n\n");

        Ok(format!(
            "Found {} relevant document(s):\n\n{formatted}",
            output.count
        ))
    }
}
