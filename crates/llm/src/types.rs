//! Provider Types
//!
//! Configuration shared by inference providers.

use serde::{Deserialize, Serialize};

use archetype_core::GenerationKind;

/// Default Gemini REST endpoint (without the `/models/...` suffix)
pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used for persona synthesis
pub const DEFAULT_PERSONA_MODEL: &str = "gemini-3-pro-preview";

/// Model used for tutor feedback
pub const DEFAULT_FEEDBACK_MODEL: &str = "gemini-3-flash-preview";

/// Model used for portraits
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Configuration for an inference provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key. Never written to disk.
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,
    /// Base URL override (optional)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub base_url: Option<String>,
    /// Model for persona synthesis
    #[serde(default = "default_persona_model")]
    pub persona_model: String,
    /// Model for feedback synthesis
    #[serde(default = "default_feedback_model")]
    pub feedback_model: String,
    /// Model for portrait synthesis
    #[serde(default = "default_image_model")]
    pub image_model: String,
    /// Temperature for text requests (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub temperature: Option<f32>,
    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_persona_model() -> String {
    DEFAULT_PERSONA_MODEL.to_string()
}

fn default_feedback_model() -> String {
    DEFAULT_FEEDBACK_MODEL.to_string()
}

fn default_image_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            persona_model: default_persona_model(),
            feedback_model: default_feedback_model(),
            image_model: default_image_model(),
            temperature: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    /// Model configured for a request kind.
    pub fn model_for(&self, kind: GenerationKind) -> &str {
        match kind {
            GenerationKind::PersonaSynthesis => &self.persona_model,
            GenerationKind::FeedbackSynthesis => &self.feedback_model,
            GenerationKind::PortraitSynthesis => &self.image_model,
        }
    }

    /// Validate values that would otherwise fail at request time.
    pub fn validate(&self) -> Result<(), String> {
        for (label, model) in [
            ("persona_model", &self.persona_model),
            ("feedback_model", &self.feedback_model),
            ("image_model", &self.image_model),
        ] {
            if model.trim().is_empty() {
                return Err(format!("{} must not be empty", label));
            }
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(format!("temperature {} is outside 0.0-2.0", t));
            }
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be positive".to_string());
        }
        Ok(())
    }
}
