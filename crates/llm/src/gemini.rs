//! Gemini Provider
//!
//! Implementation of `InferenceProvider` for Google's Gemini
//! `generateContent` REST endpoint. Text kinds ask for JSON constrained by the
//! request's response schema; the portrait kind asks for inline image data.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use archetype_core::{
    GenerationError, GenerationRequest, GenerationResult, RawResponse, ResponseFormat,
};

use super::http_client::build_http_client;
use super::provider::{
    missing_api_key_error, parse_http_error, parse_transport_error, InferenceProvider,
};
use super::types::{ProviderConfig, GEMINI_API_URL};

const PROVIDER_NAME: &str = "gemini";

/// Gemini provider
pub struct GeminiProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider with the given configuration
    pub fn new(config: ProviderConfig) -> GenerationResult<Self> {
        let client = build_http_client(Duration::from_secs(config.timeout_secs))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(GEMINI_API_URL)
            .trim_end_matches('/')
    }

    fn api_key(&self) -> GenerationResult<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| missing_api_key_error(PROVIDER_NAME))
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url(), model)
    }

    /// Build the request body for the API
    fn build_request_body(&self, request: &GenerationRequest) -> serde_json::Value {
        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.payload() }]
            }]
        });

        if let Some(system) = request.system_instruction() {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }

        let mut generation_config = match request.format() {
            ResponseFormat::Json { schema } => json!({
                "responseMimeType": "application/json",
                "responseSchema": schema,
            }),
            ResponseFormat::Image { aspect_ratio } => json!({
                "responseModalities": ["TEXT", "IMAGE"],
                "imageConfig": { "aspectRatio": aspect_ratio },
            }),
        };
        if request.kind().is_text() {
            if let Some(t) = self.config.temperature {
                generation_config["temperature"] = json!(t);
            }
        }
        body["generationConfig"] = generation_config;

        body
    }

    /// Pull the relevant output out of a decoded response.
    fn parse_response(request: &GenerationRequest, response: GeminiResponse) -> RawResponse {
        let parts: Vec<GeminiPart> = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default();

        match request.format() {
            ResponseFormat::Json { .. } => {
                let text = parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("");
                RawResponse::Text { text }
            }
            ResponseFormat::Image { .. } => {
                let inline = parts.into_iter().find_map(|p| p.inline_data);
                match inline {
                    Some(data) => RawResponse::InlineData {
                        mime_type: data.mime_type,
                        data: data.data,
                    },
                    None => RawResponse::InlineData {
                        mime_type: None,
                        data: None,
                    },
                }
            }
        }
    }
}

#[async_trait]
impl InferenceProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn generate(&self, request: &GenerationRequest) -> GenerationResult<RawResponse> {
        let api_key = self.api_key()?;
        let model = self.config.model_for(request.kind());
        let body = self.build_request_body(request);

        tracing::debug!(kind = %request.kind(), model, "sending generateContent request");

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| parse_transport_error(&e, PROVIDER_NAME))?;

        let status = response.status().as_u16();
        let body_text = response
            .text()
            .await
            .map_err(|e| parse_transport_error(&e, PROVIDER_NAME))?;

        if status != 200 {
            return Err(parse_http_error(status, &body_text, PROVIDER_NAME));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&body_text).map_err(|e| {
            GenerationError::malformed(format!("Failed to parse response: {}", e))
        })?;

        if let Some(reason) = gemini_response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(GenerationError::unknown(format!(
                "{}: prompt blocked ({})",
                PROVIDER_NAME, reason
            )));
        }

        Ok(Self::parse_response(request, gemini_response))
    }

    async fn health_check(&self) -> GenerationResult<()> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .get(format!("{}/models", self.base_url()))
            .header("x-goog-api-key", api_key)
            .send()
            .await
            .map_err(|e| parse_transport_error(&e, PROVIDER_NAME))?;

        let status = response.status().as_u16();
        if status == 200 {
            return Ok(());
        }
        let body_text = response.text().await.unwrap_or_default();
        Err(parse_http_error(status, &body_text, PROVIDER_NAME))
    }
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: Option<String>,
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}
