//! Inference Client
//!
//! Issues one logical request against an `InferenceProvider`, retrying
//! quota failures on the kind's backoff schedule and validating the final
//! response before returning it. Callers never see unvalidated data.
//!
//! Every retry repeats the identical request body, so retries are safe from
//! the caller's perspective.

use std::sync::Arc;

use tracing::Instrument;

use archetype_core::{
    validate, BackoffPolicy, GeneratedRecord, GenerationKind, GenerationRequest,
    GenerationResult, RetryState,
};
use archetype_llm::InferenceProvider;

use super::timing::{Sleeper, TokioSleeper};

/// Retrying, validating front for an inference provider.
pub struct InferenceClient {
    provider: Arc<dyn InferenceProvider>,
    sleeper: Arc<dyn Sleeper>,
    text_policy: BackoffPolicy,
    image_policy: BackoffPolicy,
}

impl InferenceClient {
    /// Client with the default text/image schedules and the tokio timer.
    pub fn new(provider: Arc<dyn InferenceProvider>) -> Self {
        Self {
            provider,
            sleeper: Arc::new(TokioSleeper),
            text_policy: BackoffPolicy::text(),
            image_policy: BackoffPolicy::image(),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_policies(mut self, text: BackoffPolicy, image: BackoffPolicy) -> Self {
        self.text_policy = text;
        self.image_policy = image;
        self
    }

    /// Backoff schedule applied to a request kind.
    pub fn policy_for(&self, kind: GenerationKind) -> BackoffPolicy {
        if kind.is_text() {
            self.text_policy
        } else {
            self.image_policy
        }
    }

    /// Run `request` to a terminal outcome.
    pub async fn call(&self, request: &GenerationRequest) -> GenerationResult<GeneratedRecord> {
        let kind = request.kind();
        let span = tracing::info_span!("inference", kind = %kind, provider = self.provider.name());
        self.call_with_retry(request).instrument(span).await
    }

    async fn call_with_retry(&self, request: &GenerationRequest) -> GenerationResult<GeneratedRecord> {
        let kind = request.kind();
        let mut state = RetryState::new(self.policy_for(kind));

        loop {
            let err = match self.provider.generate(request).await {
                Ok(raw) => {
                    return match validate(kind, &raw) {
                        Ok(record) => {
                            tracing::debug!(retries = state.attempt(), "generation succeeded");
                            Ok(record)
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "service response failed validation");
                            Err(err)
                        }
                    };
                }
                Err(err) => err,
            };

            match state.next_delay(&err) {
                Some(delay) => {
                    tracing::warn!(
                        attempt = state.attempt(),
                        max_attempts = state.policy().max_retries,
                        wait_ms = delay.as_millis() as u64,
                        error = %err,
                        "retryable error, backing off"
                    );
                    self.sleeper.sleep(delay).await;
                }
                None => {
                    let err = err.normalized();
                    tracing::warn!(
                        retries = state.attempt(),
                        waited_ms = state.elapsed_delay().as_millis() as u64,
                        error_kind = err.kind_name(),
                        error = %err,
                        "generation failed"
                    );
                    return Err(err);
                }
            }
        }
    }
}
