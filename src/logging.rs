//! Logging Bootstrap
//!
//! Installs a `tracing` subscriber for the process. `RUST_LOG` takes
//! precedence over the configured level. Calling `init_tracing` more than
//! once is harmless.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::{fmt, EnvFilter};

use crate::utils::error::{AppError, AppResult};

static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Build the filter: `RUST_LOG` if set, otherwise `level` for this workspace
/// and `warn` for dependencies.
pub fn build_filter(level: &str) -> AppResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directives = format!(
        "warn,archetype_studio={level},archetype_llm={level},archetype_core={level}",
        level = level
    );
    EnvFilter::try_new(directives).map_err(|e| AppError::config(format!("invalid log level: {}", e)))
}

/// Install the global fmt subscriber.
pub fn init_tracing(level: &str) -> AppResult<()> {
    install(&TRACING_INITIALIZED, level)
}

/// A rejected level leaves `initialized` untouched so a later call can still
/// install the subscriber.
fn install(initialized: &AtomicBool, level: &str) -> AppResult<()> {
    if initialized.load(Ordering::SeqCst) {
        return Ok(());
    }

    let filter = build_filter(level)?;
    if fmt().with_env_filter(filter).with_target(true).try_init().is_err() {
        tracing::debug!("a global tracing subscriber was already installed");
    }
    initialized.store(true, Ordering::SeqCst);
    Ok(())
}
