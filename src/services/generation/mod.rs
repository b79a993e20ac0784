//! Generation Services
//!
//! Orchestration of persona, feedback and portrait synthesis:
//! - `client` - Retry loop and response validation around a provider
//! - `queue` - Single-flight FIFO lane for portrait requests
//! - `orchestrator` - Public entry points and record annotation
//! - `prompts` - Request bodies built from research notes
//! - `timing` - Injectable sleep and clock sources

pub mod client;
pub mod orchestrator;
pub mod prompts;
pub mod queue;
pub mod timing;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use client::InferenceClient;
pub use orchestrator::GenerationOrchestrator;
pub use queue::{PortraitQueue, QueueTicket, DEFAULT_PORTRAIT_SPACING_MS};
pub use timing::{Clock, Sleeper, SystemClock, TokioSleeper};
