//! Domain Records
//!
//! Typed shapes for everything the generation pipeline consumes or produces:
//! the caller's research notes, validated service output (`PersonaDraft`,
//! `FeedbackRecord`, `PortraitImage`), and the annotated `PersonaRecord`
//! handed back to the application.
//!
//! Service-facing structs use camelCase keys because that is the wire shape
//! the response schemas describe.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, GenerationResult};

/// The research form a user fills in before generating personas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResearchNotes {
    pub title: String,
    pub researcher_name: String,
    pub team_name: String,
    pub stakeholder_tag: String,
    pub description: String,
    pub pain_points: String,
    pub needs: String,
    pub goals: String,
    pub actions: String,
}

impl ResearchNotes {
    /// True when every field is blank.
    pub fn is_empty(&self) -> bool {
        [
            &self.title,
            &self.researcher_name,
            &self.team_name,
            &self.stakeholder_tag,
            &self.description,
            &self.pain_points,
            &self.needs,
            &self.goals,
            &self.actions,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
    }
}

/// A persona exactly as the service produced it, after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaDraft {
    pub name: String,
    pub role: String,
    pub age: u32,
    pub quote: String,
    pub bio: String,
    pub goals: Vec<String>,
    pub frustrations: Vec<String>,
    pub motivations: Vec<String>,
    /// 1 (low) to 10 (high)
    pub tech_literacy: u8,
    pub personality_traits: Vec<String>,
    pub image_prompt: String,
    pub tags: Vec<String>,
}

/// A persona annotated with identity and categorization metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaRecord {
    pub id: String,
    /// Shared by every persona produced by the same generation call.
    pub group_id: String,
    #[serde(flatten)]
    pub persona: PersonaDraft,
    pub researcher_name: String,
    pub team_name: String,
    /// Stakeholder / department tag supplied by the caller.
    pub category: String,
    pub saved_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes: Option<String>,
}

impl PersonaRecord {
    /// Attach a generated portrait as a data URL.
    pub fn with_portrait(mut self, portrait: &PortraitImage) -> Self {
        self.image_url = Some(portrait.data_url());
        self
    }
}

/// The grouping record for one persona batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchFramework {
    pub id: String,
    #[serde(flatten)]
    pub notes: ResearchNotes,
    pub saved_at: DateTime<Utc>,
    pub archetype_ids: Vec<String>,
}

/// Output of one persona synthesis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaBatch {
    pub group_id: String,
    pub personas: Vec<PersonaRecord>,
    pub framework: ResearchFramework,
}

/// Grade band used for presentation and score comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeBand {
    Excellent,
    Good,
    Fair,
    NeedsWork,
}

/// Tutor feedback on a set of research notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    /// Letter grade: A+, A, B, C, D or F
    pub grade: String,
    /// 0 to 100
    pub score: u8,
    pub feedback_title: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub thought_provoking_questions: Vec<String>,
    pub overall_comment: String,
}

impl FeedbackRecord {
    pub fn grade_band(&self) -> GradeBand {
        match self.grade.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('A') => GradeBand::Excellent,
            Some('B') => GradeBand::Good,
            Some('C') => GradeBand::Fair,
            _ => GradeBand::NeedsWork,
        }
    }

    /// Score change relative to an earlier round of feedback.
    pub fn score_delta(&self, previous: &FeedbackRecord) -> i16 {
        i16::from(self.score) - i16::from(previous.score)
    }
}

/// A generated portrait: base64 image bytes plus MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortraitImage {
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

impl PortraitImage {
    /// Self-describing `data:` URL.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Parse a `data:<mime>;base64,<data>` URL.
    pub fn from_data_url(url: &str) -> GenerationResult<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| GenerationError::malformed("not a data URL"))?;
        let (mime_type, data) = rest
            .split_once(";base64,")
            .ok_or_else(|| GenerationError::malformed("data URL is not base64-encoded"))?;
        if mime_type.is_empty() || data.is_empty() {
            return Err(GenerationError::malformed("data URL is missing MIME type or data"));
        }
        Ok(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    /// Decoded image bytes.
    pub fn bytes(&self) -> GenerationResult<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| GenerationError::malformed(format!("invalid base64 image data: {}", e)))
    }
}
