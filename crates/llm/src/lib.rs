//! Archetype LLM
//!
//! Provides the inference provider abstraction and its Gemini implementation:
//! - `InferenceProvider` trait (one network call per invocation)
//! - HTTP status / transport error classification
//! - HTTP client factory
//! - `GeminiProvider` (text with response schema, inline image output)

pub mod gemini;
pub mod http_client;
pub mod provider;
pub mod types;

// Re-export main types
pub use gemini::GeminiProvider;
pub use http_client::build_http_client;
pub use provider::{parse_http_error, InferenceProvider};
pub use types::ProviderConfig;
