//! Inference Provider Trait
//!
//! Defines the interface the generation client drives, plus the mapping from
//! HTTP failures onto the generation error taxonomy.

use async_trait::async_trait;

use archetype_core::{GenerationError, GenerationRequest, GenerationResult, RawResponse};

/// Trait that all inference backends implement.
///
/// A provider issues exactly one network call per `generate` invocation and
/// returns the unvalidated response. Retrying and validation belong to the
/// caller.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Issue the request once.
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult<RawResponse>;

    /// Check that the provider is reachable and the credential is accepted.
    async fn health_check(&self) -> GenerationResult<()> {
        Ok(())
    }
}

/// Helper function to create an error for a missing API key
pub fn missing_api_key_error(provider: &str) -> GenerationError {
    GenerationError::auth_invalid(format!("API key not configured for {}", provider))
}

/// Map an HTTP status and body onto the error taxonomy.
pub fn parse_http_error(status: u16, body: &str, provider: &str) -> GenerationError {
    let lower = body.to_lowercase();
    match status {
        401 => GenerationError::auth_invalid(format!("{}: Invalid API key", provider)),
        403 => GenerationError::auth_invalid(format!("{}: Access denied: {}", provider, body)),
        429 => GenerationError::rate_limited(format!("{}: HTTP 429: {}", provider, body)),
        400 if lower.contains("api key not valid")
            || lower.contains("api_key_invalid")
            || lower.contains("requested entity was not found") =>
        {
            GenerationError::auth_invalid(format!("{}: {}", provider, body))
        }
        500..=599
            if matches!(status, 502..=504)
                || lower.contains("unavailable")
                || lower.contains("overloaded") =>
        {
            GenerationError::network(format!("{}: HTTP {}: {}", provider, status, body))
        }
        _ => GenerationError::unknown(format!("{}: HTTP {}: {}", provider, status, body)),
    }
}

/// Map a transport failure onto the error taxonomy.
pub fn parse_transport_error(err: &reqwest::Error, provider: &str) -> GenerationError {
    if err.is_decode() {
        GenerationError::malformed(format!("{}: {}", provider, err))
    } else {
        GenerationError::network(format!("{}: {}", provider, err))
    }
}
