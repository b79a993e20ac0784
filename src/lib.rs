//! Archetype Studio - Generation Backend Library
//!
//! Turns user-research notes into personas, tutor feedback and portraits via
//! an external inference service. It includes:
//! - Generation services (retrying client, portrait queue, orchestrator)
//! - Configuration storage
//! - Logging bootstrap
//! - Application settings and error types
//!
//! Domain types and validation live in `archetype-core`; the provider
//! abstraction and Gemini implementation live in `archetype-llm`.

pub mod logging;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use archetype_core::{
    FeedbackRecord, GenerationError, GenerationResult, PersonaBatch, PersonaRecord,
    PortraitImage, ResearchNotes,
};
pub use logging::init_tracing;
pub use models::settings::{AppConfig, SettingsUpdate};
pub use services::generation::{GenerationOrchestrator, InferenceClient, PortraitQueue};
pub use storage::ConfigService;
pub use utils::error::{AppError, AppResult};
