//! Settings Models
//!
//! Application configuration and settings data structures.

use serde::{Deserialize, Serialize};

use archetype_core::BackoffPolicy;
use archetype_llm::ProviderConfig;

/// Environment variables consulted (in order) for the service API key.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Retry schedule for text and image requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "BackoffPolicy::text")]
    pub text: BackoffPolicy,
    #[serde(default = "BackoffPolicy::image")]
    pub image: BackoffPolicy,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            text: BackoffPolicy::text(),
            image: BackoffPolicy::image(),
        }
    }
}

/// Portrait queue throttling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSettings {
    /// Wait before each queued portrait call, in milliseconds
    #[serde(default = "default_portrait_spacing_ms")]
    pub portrait_spacing_ms: u64,
}

fn default_portrait_spacing_ms() -> u64 {
    5_000
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            portrait_spacing_ms: default_portrait_spacing_ms(),
        }
    }
}

/// Application configuration stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Inference provider settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Retry schedules
    #[serde(default)]
    pub retry: RetrySettings,
    /// Portrait queue settings
    #[serde(default)]
    pub queue: QueueSettings,
    /// Log level: "trace", "debug", "info", "warn" or "error"
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            retry: RetrySettings::default(),
            queue: QueueSettings::default(),
            log_level: default_log_level(),
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub persona_model: Option<String>,
    pub feedback_model: Option<String>,
    pub image_model: Option<String>,
    pub temperature: Option<f32>,
    pub timeout_secs: Option<u64>,
    pub text_retry: Option<BackoffPolicy>,
    pub image_retry: Option<BackoffPolicy>,
    pub portrait_spacing_ms: Option<u64>,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(key) = update.api_key {
            self.provider.api_key = Some(key);
        }
        if let Some(url) = update.base_url {
            self.provider.base_url = Some(url);
        }
        if let Some(model) = update.persona_model {
            self.provider.persona_model = model;
        }
        if let Some(model) = update.feedback_model {
            self.provider.feedback_model = model;
        }
        if let Some(model) = update.image_model {
            self.provider.image_model = model;
        }
        if let Some(temperature) = update.temperature {
            self.provider.temperature = Some(temperature);
        }
        if let Some(timeout) = update.timeout_secs {
            self.provider.timeout_secs = timeout;
        }
        if let Some(policy) = update.text_retry {
            self.retry.text = policy;
        }
        if let Some(policy) = update.image_retry {
            self.retry.image = policy;
        }
        if let Some(spacing) = update.portrait_spacing_ms {
            self.queue.portrait_spacing_ms = spacing;
        }
        if let Some(level) = update.log_level {
            self.log_level = level;
        }
    }

    /// Override the API key from `GEMINI_API_KEY`, then `API_KEY`.
    /// The configured key is kept when neither is set.
    pub fn with_env_api_key(self) -> Self {
        self.with_api_key_from(|name| std::env::var(name).ok())
    }

    fn with_api_key_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let from_env = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty());
        if from_env.is_some() {
            self.provider.api_key = from_env;
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.provider.validate()?;

        for (label, policy) in [("text", &self.retry.text), ("image", &self.retry.image)] {
            if policy.base_delay_ms == 0 {
                return Err(format!("{} retry base delay must be positive", label));
            }
            if policy.max_retries > 10 {
                return Err(format!("{} retry cap cannot exceed 10", label));
            }
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }
}
