//! Chat backend adapters.
//!
//! Each provider implements [`Backend`](crate::model::Backend) for its
//! specific API and owns its wire format.

mod ollama;

pub use ollama::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, OllamaBackend, OllamaBackendBuilder};
