//! Generation Error Taxonomy
//!
//! Every terminal outcome of a generation request that is not a validated
//! record is one of the five variants below. Provider-specific failures are
//! mapped into this taxonomy at the HTTP boundary (see `archetype-llm`), and
//! the validator reports rejected payloads as `Malformed`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backoff::is_throttling_message;

/// Errors surfaced by the generation pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationError {
    /// Throttling or quota exhaustion reported by the service.
    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    /// Credential missing or rejected. Never retried.
    #[error("Authentication failed: {message}")]
    AuthInvalid { message: String },

    /// The response did not match the promised shape. Never retried.
    #[error("Malformed response: {message}")]
    Malformed { message: String },

    /// Transport-level failure (connect, timeout, unavailable upstream).
    #[error("Network error: {message}")]
    Network { message: String },

    /// Anything the classifier could not place.
    #[error("Error: {message}")]
    Unknown { message: String },
}

/// Result type for generation operations
pub type GenerationResult<T> = Result<T, GenerationError>;

impl GenerationError {
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::AuthInvalid {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// The originating message, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::RateLimited { message }
            | Self::AuthInvalid { message }
            | Self::Malformed { message }
            | Self::Network { message }
            | Self::Unknown { message } => message,
        }
    }

    /// Short variant name used in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "rate_limited",
            Self::AuthInvalid { .. } => "auth_invalid",
            Self::Malformed { .. } => "malformed",
            Self::Network { .. } => "network",
            Self::Unknown { .. } => "unknown",
        }
    }

    /// Whether waiting and repeating the identical request could succeed.
    ///
    /// Only quota-related failures qualify. `Network` and `Unknown` errors are
    /// retryable when their message positively indicates throttling.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Network { message } | Self::Unknown { message } => {
                is_throttling_message(message)
            }
            Self::AuthInvalid { .. } | Self::Malformed { .. } => false,
        }
    }

    /// Collapse a throttling `Network`/`Unknown` error into `RateLimited`.
    pub fn normalized(self) -> Self {
        match self {
            Self::Network { message } | Self::Unknown { message }
                if is_throttling_message(&message) =>
            {
                Self::RateLimited { message }
            }
            other => other,
        }
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err.to_string())
    }
}
