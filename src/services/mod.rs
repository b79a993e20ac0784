//! Services
//!
//! Business logic services for the application.

pub mod generation;

pub use generation::{GenerationOrchestrator, InferenceClient, PortraitQueue, QueueTicket};
