//! Shared test utilities for generation unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use archetype_core::{GenerationKind, GenerationRequest, GenerationResult, RawResponse};
use archetype_llm::InferenceProvider;

use super::timing::{Clock, Sleeper};

/// One observed provider invocation.
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub kind: GenerationKind,
    pub payload: String,
    pub started_at: tokio::time::Instant,
}

/// Provider that replays scripted outcomes in order, then repeats `fallback`.
pub(crate) struct ScriptedProvider {
    script: Mutex<VecDeque<GenerationResult<RawResponse>>>,
    fallback: GenerationResult<RawResponse>,
    latency: Duration,
    calls: Mutex<Vec<RecordedCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(script: Vec<GenerationResult<RawResponse>>, fallback: GenerationResult<RawResponse>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Always return the same outcome.
    pub fn always(outcome: GenerationResult<RawResponse>) -> Self {
        Self::new(Vec::new(), outcome)
    }

    /// Simulated time each call spends in flight.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(&self, request: &GenerationRequest) -> GenerationResult<RawResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            kind: request.kind(),
            payload: request.payload().to_string(),
            started_at: tokio::time::Instant::now(),
        });
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

/// Sleeper that records requested delays and returns immediately.
#[derive(Default)]
pub(crate) struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays_ms(&self) -> Vec<u128> {
        self.delays.lock().unwrap().iter().map(|d| d.as_millis()).collect()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Clock pinned to one instant.
pub(crate) struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn default_instant() -> Self {
        Self(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(crate) fn persona_json(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "role": "Senior Developer",
        "age": 41,
        "quote": "Show me the logs.",
        "bio": "Has shipped software for two decades.",
        "goals": ["Ship reliably"],
        "frustrations": ["Flaky tooling"],
        "motivations": ["Craft"],
        "techLiteracy": 9,
        "personalityTraits": ["Analytical", "Direct"],
        "imagePrompt": "A man in his early forties with a grey beard",
        "tags": ["power-user"]
    })
}

/// A valid persona payload with the given names.
pub(crate) fn personas_response(names: &[&str]) -> RawResponse {
    let archetypes: Vec<_> = names.iter().map(|n| persona_json(n)).collect();
    RawResponse::text(json!({ "archetypes": archetypes }).to_string())
}

/// A valid feedback payload with the given score.
pub(crate) fn feedback_response(score: u8) -> RawResponse {
    RawResponse::text(
        json!({
            "grade": "B",
            "score": score,
            "feedbackTitle": "Dig deeper into motivations",
            "strengths": ["Concrete quotes"],
            "improvements": ["Separate actions from motivations"],
            "thoughtProvokingQuestions": ["Why do they abandon the flow?"],
            "overallComment": "Good start, keep going."
        })
        .to_string(),
    )
}

/// A valid portrait payload.
pub(crate) fn portrait_response() -> RawResponse {
    RawResponse::inline("image/png", "aGVsbG8=")
}
