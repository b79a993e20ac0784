//! Orchestrator Integration Tests
//!
//! Runs the full stack (orchestrator, client, queue, Gemini provider) against
//! a wiremock server standing in for the inference service.

use std::collections::HashSet;

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use archetype_core::BackoffPolicy;
use archetype_studio::{AppConfig, GenerationError, GenerationOrchestrator, ResearchNotes};

const PERSONA_PATH: &str = "/models/gemini-3-pro-preview:generateContent";
const FEEDBACK_PATH: &str = "/models/gemini-3-flash-preview:generateContent";
const IMAGE_PATH: &str = "/models/gemini-2.5-flash-image:generateContent";

// ============================================================================
// Helpers
// ============================================================================

fn config_for(server: &MockServer) -> AppConfig {
    let mut config = AppConfig::default();
    config.provider.api_key = Some("test-key".to_string());
    config.provider.base_url = Some(server.uri());
    config.retry.text = BackoffPolicy::new(1, 3);
    config.retry.image = BackoffPolicy::new(1, 2);
    config.queue.portrait_spacing_ms = 1;
    config
}

fn notes() -> ResearchNotes {
    ResearchNotes {
        title: "Grocery delivery".to_string(),
        researcher_name: "Jordan".to_string(),
        team_name: "Team Orbit".to_string(),
        stakeholder_tag: "Marketing".to_string(),
        description: "Ten interviews with weekly shoppers".to_string(),
        pain_points: "Substitutions arrive without warning".to_string(),
        needs: "Control over replacements".to_string(),
        goals: "Finish the weekly order in five minutes".to_string(),
        actions: "Re-orders last week's basket".to_string(),
    }
}

fn text_reply(payload: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": payload.to_string() }] }
        }]
    }))
}

fn persona(name: &str) -> Value {
    json!({
        "name": name,
        "role": "Busy Parent",
        "age": 38,
        "quote": "I just need it to arrive.",
        "bio": "Juggles two jobs and three kids.",
        "goals": ["Save time"],
        "frustrations": ["Surprise substitutions"],
        "motivations": ["Family"],
        "techLiteracy": 6,
        "personalityTraits": ["Pragmatic"],
        "imagePrompt": "A tired but cheerful parent in a kitchen",
        "tags": ["time-poor"]
    })
}

fn feedback(score: u8) -> Value {
    json!({
        "grade": if score >= 80 { "A" } else { "B" },
        "score": score,
        "feedbackTitle": "Solid Start",
        "strengths": ["Real quotes"],
        "improvements": ["Split actions from motivations"],
        "thoughtProvokingQuestions": ["What happens when the order is late?"],
        "overallComment": "Keep going!"
    })
}

async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

// ============================================================================
// Persona Synthesis
// ============================================================================

#[tokio::test]
async fn test_two_personas_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PERSONA_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(text_reply(json!({ "archetypes": [persona("Maya"), persona("Omar")] })))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = GenerationOrchestrator::from_config(&config_for(&server)).unwrap();
    let batch = orchestrator.synthesize_personas(&notes()).await.unwrap();

    assert_eq!(batch.personas.len(), 2);
    let ids: HashSet<_> = batch.personas.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids.len(), 2);
    for record in &batch.personas {
        assert_eq!(record.group_id, batch.group_id);
        assert_eq!(record.team_name, "Team Orbit");
        assert_eq!(record.category, "Marketing");
        assert_eq!(record.researcher_name, "Jordan");
    }

    let bodies = request_bodies(&server).await;
    let config = &bodies[0]["generationConfig"];
    assert_eq!(config["responseMimeType"], "application/json");
    assert_eq!(config["responseSchema"]["type"], "OBJECT");
    assert!(bodies[0]["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .contains("UX researcher"));
}

#[tokio::test]
async fn test_group_ids_differ_across_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PERSONA_PATH))
        .respond_with(text_reply(json!({ "archetypes": [persona("Maya"), persona("Omar")] })))
        .mount(&server)
        .await;

    let orchestrator = GenerationOrchestrator::from_config(&config_for(&server)).unwrap();
    let first = orchestrator.synthesize_personas(&notes()).await.unwrap();
    let second = orchestrator.synthesize_personas(&notes()).await.unwrap();

    assert_ne!(first.group_id, second.group_id);
    assert_ne!(first.framework.id, second.framework.id);
}

#[tokio::test]
async fn test_rate_limit_is_retried_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PERSONA_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("RESOURCE_EXHAUSTED"))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(PERSONA_PATH))
        .respond_with(text_reply(json!({ "archetypes": [persona("Maya")] })))
        .mount(&server)
        .await;

    let orchestrator = GenerationOrchestrator::from_config(&config_for(&server)).unwrap();
    let batch = orchestrator.synthesize_personas(&notes()).await.unwrap();

    assert_eq!(batch.personas.len(), 1);
    let bodies = request_bodies(&server).await;
    assert_eq!(bodies.len(), 3);
    assert!(bodies.iter().all(|b| b == &bodies[0]));
}

#[tokio::test]
async fn test_rate_limit_exhaustion_surfaces_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PERSONA_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .expect(4)
        .mount(&server)
        .await;

    let orchestrator = GenerationOrchestrator::from_config(&config_for(&server)).unwrap();
    let err = orchestrator.synthesize_personas(&notes()).await.unwrap_err();

    assert!(matches!(err, GenerationError::RateLimited { .. }));
}

#[tokio::test]
async fn test_invalid_key_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PERSONA_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "API key not valid. Please pass a valid API key." }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = GenerationOrchestrator::from_config(&config_for(&server)).unwrap();
    let err = orchestrator.synthesize_personas(&notes()).await.unwrap_err();

    assert!(matches!(err, GenerationError::AuthInvalid { .. }));
}

#[tokio::test]
async fn test_schema_violation_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PERSONA_PATH))
        .respond_with(text_reply(json!({ "archetypes": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = GenerationOrchestrator::from_config(&config_for(&server)).unwrap();
    let err = orchestrator.synthesize_personas(&notes()).await.unwrap_err();

    assert!(matches!(err, GenerationError::Malformed { .. }));
}

// ============================================================================
// Feedback Synthesis
// ============================================================================

#[tokio::test]
async fn test_feedback_revision_round() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FEEDBACK_PATH))
        .respond_with(text_reply(feedback(64)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(FEEDBACK_PATH))
        .respond_with(text_reply(feedback(85)))
        .mount(&server)
        .await;

    let orchestrator = GenerationOrchestrator::from_config(&config_for(&server)).unwrap();
    let first = orchestrator.synthesize_feedback(&notes(), None).await.unwrap();
    let second = orchestrator
        .synthesize_feedback(&notes(), Some(&first))
        .await
        .unwrap();

    assert_eq!(first.score, 64);
    assert_eq!(second.score, 85);
    assert_eq!(second.score_delta(&first), 21);

    let bodies = request_bodies(&server).await;
    let revision_prompt = bodies[1]["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(revision_prompt.contains("Student: Jordan"));
    assert!(revision_prompt.contains("Grade: B (score 64)"));
}

// ============================================================================
// Portrait Synthesis
// ============================================================================

#[tokio::test]
async fn test_portraits_return_data_urls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Here is your portrait." },
                    { "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } }
                ]}
            }]
        })))
        .expect(3)
        .mount(&server)
        .await;

    let orchestrator = GenerationOrchestrator::from_config(&config_for(&server)).unwrap();
    let (a, b, c) = tokio::join!(
        orchestrator.synthesize_portrait("first"),
        orchestrator.synthesize_portrait("second"),
        orchestrator.synthesize_portrait("third")
    );

    for portrait in [a, b, c] {
        assert_eq!(portrait.unwrap().data_url(), "data:image/png;base64,aGVsbG8=");
    }

    let bodies = request_bodies(&server).await;
    let prompts: Vec<_> = bodies
        .iter()
        .map(|b| b["contents"][0]["parts"][0]["text"].as_str().unwrap().to_string())
        .collect();
    assert!(prompts[0].contains("headshot of: first"));
    assert!(prompts[1].contains("headshot of: second"));
    assert!(prompts[2].contains("headshot of: third"));
    assert_eq!(bodies[0]["generationConfig"]["imageConfig"]["aspectRatio"], "1:1");
}

#[tokio::test]
async fn test_portrait_without_image_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .respond_with(text_reply(json!("no image today")))
        .mount(&server)
        .await;

    let orchestrator = GenerationOrchestrator::from_config(&config_for(&server)).unwrap();
    let err = orchestrator.synthesize_portrait("anyone").await.unwrap_err();

    assert!(matches!(err, GenerationError::Malformed { .. }));
}
