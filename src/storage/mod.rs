//! Storage Layer
//!
//! Configuration file persistence.

pub mod config;

pub use config::ConfigService;
