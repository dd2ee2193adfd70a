//! Prompt assembly.
//!
//! Renders a [`ContextFrame`](switchyard_core::ContextFrame) into a single
//! grounded prompt for a delegated text generator, in fixed section order:
//!
//! | Section | Source | Skipped when |
//! |---------|--------|--------------|
//! | Preamble | fixed | never |
//! | `## TOOL RESULTS` | dispatched tools | no results |
//! | `## MEMORY CONTEXT` | pre-rendered memories | absent |
//! | `## CONVERSATION HISTORY` | session window | empty |
//! | `## CURRENT USER MESSAGE` | the message | never |
//! | `## INSTRUCTIONS` | fixed | never |

pub mod builder;

pub use builder::{BuilderOptions, ContextBuilder};
