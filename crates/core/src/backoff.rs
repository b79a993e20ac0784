//! Backoff Policy
//!
//! Pure retry decisions for generation requests. Given an error and the number
//! of retries already performed, `BackoffPolicy::decide` answers whether to
//! try again and how long to wait first. Delays double on every retry:
//! `base_delay * 2^attempt`.
//!
//! The policy performs no I/O and reads no clock; the caller owns sleeping.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Base delay for text-synthesis requests (personas, feedback).
pub const TEXT_BASE_DELAY_MS: u64 = 6_000;

/// Maximum retries for text-synthesis requests.
pub const TEXT_MAX_RETRIES: u32 = 3;

/// Base delay for image-synthesis requests.
pub const IMAGE_BASE_DELAY_MS: u64 = 7_000;

/// Maximum retries for image-synthesis requests.
pub const IMAGE_MAX_RETRIES: u32 = 2;

/// Message fragments that mark an error as throttling or quota exhaustion.
const THROTTLING_MARKERS: &[&str] = &[
    "quota",
    "rate limit",
    "rate-limit",
    "ratelimit",
    "too many requests",
    "resource exhausted",
    "resource_exhausted",
];

/// 429 as a status token: leading the message, or right after
/// `http`/`status`/`code` (`HTTP 429`, `status: 429`, `"code": 429`).
/// Digits inside ports, ids or hashes do not count.
fn status_429_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#"(?i)(?:^\s*|\b(?:http|status|code)\b["':=\s]{0,4})429\b"#).ok())
        .as_ref()
}

/// Whether an error message positively indicates throttling.
pub fn is_throttling_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    THROTTLING_MARKERS.iter().any(|marker| lower.contains(marker))
        || status_429_pattern().is_some_and(|re| re.is_match(message))
}

/// Outcome of a single backoff decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffDecision {
    pub retry: bool,
    pub delay: Duration,
}

impl BackoffDecision {
    fn stop() -> Self {
        Self {
            retry: false,
            delay: Duration::ZERO,
        }
    }
}

/// Exponential backoff with a fixed retry cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffPolicy {
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Number of retries allowed after the initial attempt.
    pub max_retries: u32,
}

impl BackoffPolicy {
    pub fn new(base_delay_ms: u64, max_retries: u32) -> Self {
        Self {
            base_delay_ms,
            max_retries,
        }
    }

    /// Policy for persona and feedback requests: 6s, 12s, 24s.
    pub fn text() -> Self {
        Self::new(TEXT_BASE_DELAY_MS, TEXT_MAX_RETRIES)
    }

    /// Policy for portrait requests: 7s, 14s.
    pub fn image() -> Self {
        Self::new(IMAGE_BASE_DELAY_MS, IMAGE_MAX_RETRIES)
    }

    /// Decide whether to retry after `error`, given `attempt` retries so far.
    pub fn decide(&self, error: &GenerationError, attempt: u32) -> BackoffDecision {
        if !error.is_retryable() || attempt >= self.max_retries {
            return BackoffDecision::stop();
        }
        BackoffDecision {
            retry: true,
            delay: self.delay_for(attempt),
        }
    }

    /// Delay preceding retry number `attempt + 1`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }

    /// Total sleep time of a request that exhausts every retry.
    pub fn worst_case_delay(&self) -> Duration {
        (0..self.max_retries).map(|attempt| self.delay_for(attempt)).sum()
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::text()
    }
}

/// Bookkeeping for one logical request's retry sequence.
#[derive(Debug, Clone)]
pub struct RetryState {
    policy: BackoffPolicy,
    attempt: u32,
    elapsed_delay: Duration,
}

impl RetryState {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            attempt: 0,
            elapsed_delay: Duration::ZERO,
        }
    }

    /// Retries performed so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Sum of all delays handed out so far.
    pub fn elapsed_delay(&self) -> Duration {
        self.elapsed_delay
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Record a failure. Returns the delay to wait before retrying, or `None`
    /// when the error is terminal.
    pub fn next_delay(&mut self, error: &GenerationError) -> Option<Duration> {
        let decision = self.policy.decide(error, self.attempt);
        if !decision.retry {
            return None;
        }
        self.attempt += 1;
        self.elapsed_delay += decision.delay;
        Some(decision.delay)
    }
}
