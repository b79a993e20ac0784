//! Generation Orchestrator
//!
//! Public entry points for persona, feedback and portrait synthesis. Each
//! operation builds its request, runs it through the `InferenceClient`, and
//! attaches derived metadata. Errors from the client are returned unchanged.
//!
//! The orchestrator holds no per-call state. Persona and feedback calls may
//! overlap freely; portrait calls go through the injected `PortraitQueue`.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use archetype_core::{
    FeedbackRecord, GenerationRequest, GenerationResult, PersonaBatch, PersonaDraft,
    PersonaRecord, PortraitImage, ResearchFramework, ResearchNotes,
};
use archetype_llm::{GeminiProvider, InferenceProvider};

use super::client::InferenceClient;
use super::prompts::{
    feedback_prompt, persona_prompt, portrait_prompt, FEEDBACK_SYSTEM_INSTRUCTION,
    PERSONA_SYSTEM_INSTRUCTION,
};
use super::queue::PortraitQueue;
use super::timing::{Clock, SystemClock, TokioSleeper};
use crate::models::AppConfig;
use crate::utils::error::{AppError, AppResult};

pub struct GenerationOrchestrator {
    client: Arc<InferenceClient>,
    portrait_queue: Arc<PortraitQueue>,
    clock: Arc<dyn Clock>,
}

impl GenerationOrchestrator {
    pub fn new(client: Arc<InferenceClient>, portrait_queue: Arc<PortraitQueue>) -> Self {
        Self {
            client,
            portrait_queue,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Wire a Gemini-backed orchestrator from validated settings.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate().map_err(AppError::config)?;

        let provider: Arc<dyn InferenceProvider> =
            Arc::new(GeminiProvider::new(config.provider.clone())?);
        let client = InferenceClient::new(provider)
            .with_policies(config.retry.text, config.retry.image);
        let queue = PortraitQueue::new(
            Duration::from_millis(config.queue.portrait_spacing_ms),
            Arc::new(TokioSleeper),
        );

        tracing::info!(
            persona_model = %config.provider.persona_model,
            feedback_model = %config.provider.feedback_model,
            image_model = %config.provider.image_model,
            portrait_spacing_ms = config.queue.portrait_spacing_ms,
            "generation orchestrator ready"
        );

        Ok(Self::new(Arc::new(client), Arc::new(queue)))
    }

    pub fn portrait_queue(&self) -> &Arc<PortraitQueue> {
        &self.portrait_queue
    }

    /// Synthesize 2 to 4 personas from research notes.
    ///
    /// Every persona in the batch shares one fresh `group_id`; two calls never
    /// share one.
    pub async fn synthesize_personas(&self, notes: &ResearchNotes) -> GenerationResult<PersonaBatch> {
        if notes.is_empty() {
            tracing::warn!("synthesizing personas from empty research notes");
        }

        let request = GenerationRequest::persona_synthesis(
            persona_prompt(notes),
            PERSONA_SYSTEM_INSTRUCTION,
        );
        let drafts = self.client.call(&request).await?.into_personas()?;

        let batch = self.annotate(notes, drafts);
        tracing::info!(
            group_id = %batch.group_id,
            count = batch.personas.len(),
            "personas synthesized"
        );
        Ok(batch)
    }

    /// Grade research notes. Passing the previous round's feedback lets the
    /// service judge the revision against it.
    pub async fn synthesize_feedback(
        &self,
        notes: &ResearchNotes,
        previous: Option<&FeedbackRecord>,
    ) -> GenerationResult<FeedbackRecord> {
        let request = GenerationRequest::feedback_synthesis(
            feedback_prompt(notes, previous),
            FEEDBACK_SYSTEM_INSTRUCTION,
        );
        let feedback = self.client.call(&request).await?.into_feedback()?;

        match previous {
            Some(previous) => tracing::info!(
                grade = %feedback.grade,
                score = feedback.score,
                delta = feedback.score_delta(previous),
                "feedback synthesized for revision"
            ),
            None => tracing::info!(grade = %feedback.grade, score = feedback.score, "feedback synthesized"),
        }
        Ok(feedback)
    }

    /// Generate a portrait. Calls are serialized through the portrait queue.
    pub async fn synthesize_portrait(&self, image_prompt: &str) -> GenerationResult<PortraitImage> {
        let request = GenerationRequest::portrait_synthesis(portrait_prompt(image_prompt));
        let client = Arc::clone(&self.client);

        self.portrait_queue
            .enqueue(move || async move { client.call(&request).await?.into_portrait() })
            .await
    }

    fn annotate(&self, notes: &ResearchNotes, drafts: Vec<PersonaDraft>) -> PersonaBatch {
        let group_id = Uuid::new_v4().to_string();
        let saved_at = self.clock.now();

        let personas: Vec<PersonaRecord> = drafts
            .into_iter()
            .map(|persona| PersonaRecord {
                id: Uuid::new_v4().to_string(),
                group_id: group_id.clone(),
                persona,
                researcher_name: notes.researcher_name.clone(),
                team_name: notes.team_name.clone(),
                category: notes.stakeholder_tag.clone(),
                saved_at,
                image_url: None,
                notes: None,
            })
            .collect();

        let framework = ResearchFramework {
            id: format!("fw-{}", group_id),
            notes: notes.clone(),
            saved_at,
            archetype_ids: personas.iter().map(|p| p.id.clone()).collect(),
        };

        PersonaBatch {
            group_id,
            personas,
            framework,
        }
    }
}
