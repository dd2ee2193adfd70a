//! # Switchyard Core
//!
//! Domain types, traits, and error definitions for the Switchyard assistant
//! pipeline. This crate has **zero framework dependencies**: it defines the
//! model that the memory, tools, and agent crates implement against.
//!
//! ## Design Philosophy
//!
//! Every pluggable seam is a trait here:
//! - [`Tool`] for capabilities the router can dispatch to
//! - [`MemoryBackend`] for long-term episode storage
//! - [`Provider`] for an optional external text generator
//!
//! Implementations live in their respective crates, so tests can swap in
//! stubs and every crate depends inward on core.

pub mod error;
pub mod frame;
pub mod memory;
pub mod message;
pub mod provider;
pub mod routing;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, MemoryError, ProviderError, Result, ToolError};
pub use frame::{AgentResponse, ContextFrame, GenerationMethod, ResponseMetadata};
pub use memory::{MemoryBackend, MemoryEntry, MemoryQuery, ScoredMemory};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use routing::{Intent, RoutingDecision};
pub use tool::{Tool, ToolDefinition, ToolInvocation, ToolRegistry, ToolResult};
