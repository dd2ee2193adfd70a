//! The message pipeline.
//!
//! Every user message flows through the same stages:
//!
//! 1. **Route**: the [`Router`] picks zero or more tools
//! 2. **Dispatch**: the selected tools run concurrently
//! 3. **Frame**: message, recent history and tool results are collected
//! 4. **Synthesize**: the [`ResponseSynthesizer`] writes the reply
//! 5. **Remember**: the exchange is stored in long-term memory
//!
//! The [`Orchestrator`] owns one instance of each stage and runs them in order.

pub mod context;
pub mod orchestrator;
pub mod router;
pub mod synthesizer;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::{BuilderOptions, ContextBuilder};
pub use orchestrator::{Orchestrator, PipelineResult, ToolSummary, extract_topics};
pub use router::Router;
pub use synthesizer::ResponseSynthesizer;
