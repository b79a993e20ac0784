//! Generation Requests
//!
//! A `GenerationRequest` is an immutable pairing of a request kind, the
//! opaque prompt payload, and the response-shape descriptor the service uses
//! to constrain its output. Requests are only built through the per-kind
//! constructors, so the descriptor always matches the kind.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which of the three generation flows a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationKind {
    PersonaSynthesis,
    FeedbackSynthesis,
    PortraitSynthesis,
}

impl GenerationKind {
    /// Text kinds return JSON; the portrait kind returns inline image data.
    pub fn is_text(&self) -> bool {
        !matches!(self, GenerationKind::PortraitSynthesis)
    }

    /// Short identifier used in logs.
    pub fn id(&self) -> &'static str {
        match self {
            GenerationKind::PersonaSynthesis => "persona_synthesis",
            GenerationKind::FeedbackSynthesis => "feedback_synthesis",
            GenerationKind::PortraitSynthesis => "portrait_synthesis",
        }
    }
}

impl fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Primitive types understood by the service's response schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

/// Structural descriptor of an expected response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSchema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, ResponseSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ResponseSchema>>,
}

impl ResponseSchema {
    fn leaf(schema_type: SchemaType, description: &str) -> Self {
        Self {
            schema_type,
            description: Some(description.to_string()),
            properties: None,
            required: None,
            items: None,
        }
    }

    pub fn string(description: &str) -> Self {
        Self::leaf(SchemaType::String, description)
    }

    pub fn integer(description: &str) -> Self {
        Self::leaf(SchemaType::Integer, description)
    }

    /// An array of strings.
    pub fn string_list(description: &str) -> Self {
        Self::array(description, Self {
            schema_type: SchemaType::String,
            description: None,
            properties: None,
            required: None,
            items: None,
        })
    }

    pub fn array(description: &str, items: ResponseSchema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::leaf(SchemaType::Array, description)
        }
    }

    /// An object whose listed properties are all required.
    pub fn object(properties: Vec<(&str, ResponseSchema)>) -> Self {
        let required = properties.iter().map(|(name, _)| name.to_string()).collect();
        let properties = properties
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect();
        Self {
            schema_type: SchemaType::Object,
            description: None,
            properties: Some(properties),
            required: Some(required),
            items: None,
        }
    }

    /// Response shape for persona synthesis: `{"archetypes": [persona, ...]}`.
    pub fn personas() -> Self {
        let persona = Self::object(vec![
            ("name", Self::string("A realistic full name for the persona.")),
            ("role", Self::string("Job title or primary role.")),
            ("age", Self::integer("Age of the persona.")),
            ("quote", Self::string("A characteristic quote that captures their attitude.")),
            ("bio", Self::string("A short biography (2-3 sentences).")),
            ("goals", Self::string_list("3-5 key goals or needs.")),
            ("frustrations", Self::string_list("3-5 key pain points or frustrations.")),
            ("motivations", Self::string_list("3 key drivers for their behavior.")),
            ("techLiteracy", Self::integer("Score from 1 (Low) to 10 (High).")),
            (
                "personalityTraits",
                Self::string_list("4-5 adjectives describing personality."),
            ),
            (
                "imagePrompt",
                Self::string("A detailed physical description to generate a photorealistic headshot."),
            ),
            ("tags", Self::string_list("Short behavioral tags for organizing the persona.")),
        ]);
        Self::object(vec![(
            "archetypes",
            Self::array("Distinct user archetypes found in the research.", persona),
        )])
    }

    /// Response shape for tutor feedback.
    pub fn feedback() -> Self {
        Self::object(vec![
            ("grade", Self::string("A letter grade (A+, A, B, C, D, F).")),
            ("score", Self::integer("A numeric score from 0-100.")),
            ("feedbackTitle", Self::string("A short, punchy title for the feedback.")),
            ("strengths", Self::string_list("2-3 things the student did well.")),
            ("improvements", Self::string_list("2-3 specific, actionable tips.")),
            (
                "thoughtProvokingQuestions",
                Self::string_list("2 questions that challenge the student to think deeper."),
            ),
            ("overallComment", Self::string("A short, encouraging paragraph.")),
        ])
    }

    /// Names of the required properties, if this is an object schema.
    pub fn required_fields(&self) -> &[String] {
        self.required.as_deref().unwrap_or(&[])
    }
}

/// Expected response shape of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum ResponseFormat {
    /// JSON text constrained by a schema.
    Json { schema: ResponseSchema },
    /// Inline image bytes.
    Image { aspect_ratio: String },
}

/// One logical request to the inference service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    kind: GenerationKind,
    payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<String>,
    format: ResponseFormat,
}

impl GenerationRequest {
    pub fn persona_synthesis(payload: impl Into<String>, system_instruction: impl Into<String>) -> Self {
        Self {
            kind: GenerationKind::PersonaSynthesis,
            payload: payload.into(),
            system_instruction: Some(system_instruction.into()),
            format: ResponseFormat::Json {
                schema: ResponseSchema::personas(),
            },
        }
    }

    pub fn feedback_synthesis(payload: impl Into<String>, system_instruction: impl Into<String>) -> Self {
        Self {
            kind: GenerationKind::FeedbackSynthesis,
            payload: payload.into(),
            system_instruction: Some(system_instruction.into()),
            format: ResponseFormat::Json {
                schema: ResponseSchema::feedback(),
            },
        }
    }

    /// Square portrait by default.
    pub fn portrait_synthesis(payload: impl Into<String>) -> Self {
        Self::portrait_with_aspect_ratio(payload, "1:1")
    }

    pub fn portrait_with_aspect_ratio(payload: impl Into<String>, aspect_ratio: impl Into<String>) -> Self {
        Self {
            kind: GenerationKind::PortraitSynthesis,
            payload: payload.into(),
            system_instruction: None,
            format: ResponseFormat::Image {
                aspect_ratio: aspect_ratio.into(),
            },
        }
    }

    pub fn kind(&self) -> GenerationKind {
        self.kind
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn system_instruction(&self) -> Option<&str> {
        self.system_instruction.as_deref()
    }

    pub fn format(&self) -> &ResponseFormat {
        &self.format
    }

    /// The JSON schema for text kinds.
    pub fn schema(&self) -> Option<&ResponseSchema> {
        match &self.format {
            ResponseFormat::Json { schema } => Some(schema),
            ResponseFormat::Image { .. } => None,
        }
    }
}

/// A service response before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawResponse {
    /// Text output, expected to be JSON for text kinds.
    Text { text: String },
    /// Inline binary output. Either half may be missing in a broken response.
    InlineData {
        mime_type: Option<String>,
        data: Option<String>,
    },
}

impl RawResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::InlineData {
            mime_type: Some(mime_type.into()),
            data: Some(data.into()),
        }
    }
}
