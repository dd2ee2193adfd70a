//! Memory system for Switchyard.
//!
//! - [`MemoryStore`] owns the ephemeral session history and fronts a
//!   long-term [`MemoryBackend`](switchyard_core::MemoryBackend).
//! - [`scoring`] holds the keyword-overlap relevance formula every backend
//!   ranks with.
//! - Backends: [`InMemoryBackend`], [`FileBackend`] (JSONL per namespace),
//!   [`NoopMemory`].

pub mod file_backend;
pub mod in_memory;
pub mod noop;
pub mod scoring;
pub mod store;

pub use file_backend::FileBackend;
pub use in_memory::InMemoryBackend;
pub use noop::NoopMemory;
pub use store::MemoryStore;

use std::sync::Arc;
use switchyard_config::{MemoryBackendKind, MemoryConfig};
use switchyard_core::memory::MemoryBackend;

/// Build the long-term backend selected by configuration.
pub fn backend_from_config(config: &MemoryConfig) -> Arc<dyn MemoryBackend> {
    match config.backend {
        MemoryBackendKind::InMemory => Arc::new(InMemoryBackend::new()),
        MemoryBackendKind::File => Arc::new(FileBackend::for_namespace(
            &config.memory_dir(),
            &config.namespace,
        )),
        MemoryBackendKind::None => Arc::new(NoopMemory),
    }
}
