//! Data Models
//!
//! Application-level settings. Generation records live in `archetype-core`.

pub mod settings;

pub use settings::{AppConfig, QueueSettings, RetrySettings, SettingsUpdate};
