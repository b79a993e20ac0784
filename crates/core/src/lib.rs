//! Archetype Core
//!
//! Pure domain layer for persona, feedback and portrait generation. Nothing in
//! this crate performs I/O, so every piece is testable from synthetic inputs.
//!
//! ## Module Organization
//!
//! - `error` - Generation error taxonomy (`GenerationError`, `GenerationResult`)
//! - `backoff` - Retry decisions (`BackoffPolicy`, `RetryState`)
//! - `request` - Request kinds, response-schema descriptors, raw responses
//! - `records` - Research notes and the typed generation outputs
//! - `schema` - Validation of raw responses into typed records

pub mod backoff;
pub mod error;
pub mod records;
pub mod request;
pub mod schema;

// ── Errors ─────────────────────────────────────────────────────────────
pub use error::{GenerationError, GenerationResult};

// ── Retry Policy ───────────────────────────────────────────────────────
pub use backoff::{BackoffDecision, BackoffPolicy, RetryState};

// ── Requests ───────────────────────────────────────────────────────────
pub use request::{
    GenerationKind, GenerationRequest, RawResponse, ResponseFormat, ResponseSchema, SchemaType,
};

// ── Records ────────────────────────────────────────────────────────────
pub use records::{
    FeedbackRecord, GradeBand, PersonaBatch, PersonaDraft, PersonaRecord, PortraitImage,
    ResearchFramework, ResearchNotes,
};

// ── Validation ─────────────────────────────────────────────────────────
pub use schema::{validate, GeneratedRecord};
