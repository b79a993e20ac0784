//! Response Validation
//!
//! Turns a `RawResponse` into the typed record promised by the request kind,
//! or rejects it as `Malformed`. Decoding goes through serde into the record
//! structs, so a missing or mistyped field fails the whole payload; range
//! checks run afterwards. There is never a partially-populated result.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, GenerationResult};
use crate::records::{FeedbackRecord, PersonaDraft, PortraitImage};
use crate::request::{GenerationKind, RawResponse};

/// A validated, kind-specific service output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratedRecord {
    Personas { personas: Vec<PersonaDraft> },
    Feedback { feedback: FeedbackRecord },
    Portrait { image: PortraitImage },
}

impl GeneratedRecord {
    pub fn kind(&self) -> GenerationKind {
        match self {
            GeneratedRecord::Personas { .. } => GenerationKind::PersonaSynthesis,
            GeneratedRecord::Feedback { .. } => GenerationKind::FeedbackSynthesis,
            GeneratedRecord::Portrait { .. } => GenerationKind::PortraitSynthesis,
        }
    }

    pub fn into_personas(self) -> GenerationResult<Vec<PersonaDraft>> {
        match self {
            GeneratedRecord::Personas { personas } => Ok(personas),
            other => Err(unexpected_record(GenerationKind::PersonaSynthesis, &other)),
        }
    }

    pub fn into_feedback(self) -> GenerationResult<FeedbackRecord> {
        match self {
            GeneratedRecord::Feedback { feedback } => Ok(feedback),
            other => Err(unexpected_record(GenerationKind::FeedbackSynthesis, &other)),
        }
    }

    pub fn into_portrait(self) -> GenerationResult<PortraitImage> {
        match self {
            GeneratedRecord::Portrait { image } => Ok(image),
            other => Err(unexpected_record(GenerationKind::PortraitSynthesis, &other)),
        }
    }
}

fn unexpected_record(expected: GenerationKind, got: &GeneratedRecord) -> GenerationError {
    GenerationError::malformed(format!("expected {} output, got {}", expected, got.kind()))
}

#[derive(Deserialize)]
struct PersonaEnvelope {
    archetypes: Vec<PersonaDraft>,
}

/// Validate a raw response against the shape promised for `kind`.
pub fn validate(kind: GenerationKind, raw: &RawResponse) -> GenerationResult<GeneratedRecord> {
    match (kind, raw) {
        (GenerationKind::PersonaSynthesis, RawResponse::Text { text }) => {
            let personas = validate_personas(text)?;
            Ok(GeneratedRecord::Personas { personas })
        }
        (GenerationKind::FeedbackSynthesis, RawResponse::Text { text }) => {
            let feedback = validate_feedback(text)?;
            Ok(GeneratedRecord::Feedback { feedback })
        }
        (GenerationKind::PortraitSynthesis, RawResponse::InlineData { mime_type, data }) => {
            let image = validate_portrait(mime_type.as_deref(), data.as_deref())?;
            Ok(GeneratedRecord::Portrait { image })
        }
        (GenerationKind::PortraitSynthesis, RawResponse::Text { .. }) => Err(
            GenerationError::malformed("No image generated: response contained only text"),
        ),
        (kind, RawResponse::InlineData { .. }) => Err(GenerationError::malformed(format!(
            "{} expected text output, got inline data",
            kind
        ))),
    }
}

/// Decode and check a persona payload.
pub fn validate_personas(text: &str) -> GenerationResult<Vec<PersonaDraft>> {
    let envelope: PersonaEnvelope = decode_json(text)?;
    if envelope.archetypes.is_empty() {
        return Err(GenerationError::malformed("response contained no archetypes"));
    }
    for (index, persona) in envelope.archetypes.iter().enumerate() {
        check_persona(persona).map_err(|reason| {
            GenerationError::malformed(format!("archetype {}: {}", index, reason))
        })?;
    }
    Ok(envelope.archetypes)
}

/// Decode and check a feedback payload.
pub fn validate_feedback(text: &str) -> GenerationResult<FeedbackRecord> {
    let feedback: FeedbackRecord = decode_json(text)?;
    if feedback.grade.trim().is_empty() {
        return Err(GenerationError::malformed("feedback grade is empty"));
    }
    if feedback.score > 100 {
        return Err(GenerationError::malformed(format!(
            "feedback score {} is outside 0-100",
            feedback.score
        )));
    }
    Ok(feedback)
}

/// Check an inline image payload.
pub fn validate_portrait(mime_type: Option<&str>, data: Option<&str>) -> GenerationResult<PortraitImage> {
    let mime_type = mime_type
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| GenerationError::malformed("image response is missing a MIME type"))?;
    let data = data
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| GenerationError::malformed("No image generated: inline data is empty"))?;

    if !mime_type.starts_with("image/") {
        return Err(GenerationError::malformed(format!(
            "expected an image MIME type, got {}",
            mime_type
        )));
    }
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| GenerationError::malformed(format!("invalid base64 image data: {}", e)))?;

    Ok(PortraitImage {
        mime_type: mime_type.to_string(),
        data: data.to_string(),
    })
}

fn check_persona(persona: &PersonaDraft) -> Result<(), String> {
    if persona.name.trim().is_empty() {
        return Err("name is empty".to_string());
    }
    if persona.age == 0 {
        return Err("age must be positive".to_string());
    }
    if !(1..=10).contains(&persona.tech_literacy) {
        return Err(format!(
            "techLiteracy {} is outside 1-10",
            persona.tech_literacy
        ));
    }
    Ok(())
}

fn decode_json<T: serde::de::DeserializeOwned>(text: &str) -> GenerationResult<T> {
    let body = extract_json(text);
    if body.is_empty() {
        return Err(GenerationError::malformed("No response from AI"));
    }
    serde_json::from_str(body)
        .map_err(|e| GenerationError::malformed(format!("Failed to parse response: {}", e)))
}

/// Strip a markdown code fence the model may have wrapped around the JSON.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        let content_start = after_fence.find('\n').map(|nl| nl + 1).unwrap_or(0);
        let content = &after_fence[content_start..];
        if let Some(end) = content.find("```") {
            return content[..end].trim();
        }
    }
    trimmed
}
