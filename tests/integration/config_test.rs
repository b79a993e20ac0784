//! Configuration Integration Tests
//!
//! Config file persistence as seen from outside the crate.

use archetype_core::BackoffPolicy;
use archetype_studio::{AppError, ConfigService, GenerationOrchestrator, SettingsUpdate};

#[test]
fn test_api_key_is_never_written_to_disk() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("config.json");
    let mut service = ConfigService::open(&path).unwrap();

    service
        .update_config(SettingsUpdate {
            api_key: Some("secret-key".to_string()),
            ..Default::default()
        })
        .unwrap();

    let on_disk = std::fs::read_to_string(&path).unwrap();
    assert!(!on_disk.contains("secret-key"));
    assert_eq!(
        service.get_config().provider.api_key.as_deref(),
        Some("secret-key")
    );
}

#[test]
fn test_retry_and_queue_settings_round_trip() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("config.json");
    let mut service = ConfigService::open(&path).unwrap();

    service
        .update_config(SettingsUpdate {
            text_retry: Some(BackoffPolicy::new(2_000, 5)),
            portrait_spacing_ms: Some(8_000),
            ..Default::default()
        })
        .unwrap();

    let reopened = ConfigService::open(&path).unwrap();
    let config = reopened.get_config();
    assert_eq!(config.retry.text, BackoffPolicy::new(2_000, 5));
    assert_eq!(config.retry.image, BackoffPolicy::image());
    assert_eq!(config.queue.portrait_spacing_ms, 8_000);
}

#[test]
fn test_corrupt_file_is_reported() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        ConfigService::open(&path),
        Err(AppError::Serialization(_))
    ));
}

#[test]
fn test_orchestrator_from_stored_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("config.json");
    let mut service = ConfigService::open(&path).unwrap();
    service
        .update_config(SettingsUpdate {
            api_key: Some("k".to_string()),
            portrait_spacing_ms: Some(250),
            ..Default::default()
        })
        .unwrap();

    let orchestrator = GenerationOrchestrator::from_config(service.get_config()).unwrap();
    assert_eq!(orchestrator.portrait_queue().spacing().as_millis(), 250);
}

#[test]
fn test_env_api_key_is_picked_up_on_open() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("config.json");
    let saved: Vec<_> = ["GEMINI_API_KEY", "API_KEY"]
        .iter()
        .map(|name| (*name, std::env::var_os(name)))
        .collect();

    std::env::remove_var("GEMINI_API_KEY");
    std::env::set_var("API_KEY", "generic-key");
    let fallback = ConfigService::open(&path).unwrap();

    std::env::set_var("GEMINI_API_KEY", "gemini-key");
    let preferred = ConfigService::open(&path).unwrap();

    for (name, value) in saved {
        match value {
            Some(value) => std::env::set_var(name, value),
            None => std::env::remove_var(name),
        }
    }

    assert_eq!(fallback.get_config().provider.api_key.as_deref(), Some("generic-key"));
    assert_eq!(preferred.get_config().provider.api_key.as_deref(), Some("gemini-key"));
    assert!(!std::fs::read_to_string(&path).unwrap().contains("gemini-key"));
}
