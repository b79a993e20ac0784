//! HTTP Client Factory
//!
//! Builds the `reqwest::Client` shared by inference providers.

use std::time::Duration;

use archetype_core::{GenerationError, GenerationResult};

const USER_AGENT: &str = concat!("archetype-studio/", env!("CARGO_PKG_VERSION"));

/// Build a `reqwest::Client` with a per-request timeout.
pub fn build_http_client(timeout: Duration) -> GenerationResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(30)))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| GenerationError::network(format!("failed to build HTTP client: {}", e)))
}
