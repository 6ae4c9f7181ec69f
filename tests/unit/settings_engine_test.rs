//! Unit tests for the settings engine.

use std::path::PathBuf;

use linkvault::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use linkvault::types::errors::SettingsError;
use linkvault::types::settings::{StorageSettings, DEFAULT_NAMESPACE_KEY};
use serde_json::json;
use tempfile::TempDir;

fn engine_in(dir: &TempDir) -> SettingsEngine {
    SettingsEngine::new(Some(dir.path().join("config").join("settings.json")))
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);

    let settings = engine.load().unwrap();

    assert_eq!(settings, StorageSettings::default());
    assert_eq!(settings.namespace_key, DEFAULT_NAMESPACE_KEY);
    assert!(settings.enable_table_provider);
}

#[test]
fn test_set_value_persists() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);
    engine.load().unwrap();

    engine.set_value("provider_timeout_ms", json!(250)).unwrap();
    engine.set_value("data_dir", json!("/tmp/linkvault-data")).unwrap();

    let mut reloaded = engine_in(&dir);
    let settings = reloaded.load().unwrap();
    assert_eq!(settings.provider_timeout_ms, 250);
    assert_eq!(settings.data_dir, Some(PathBuf::from("/tmp/linkvault-data")));
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"enable_table_provider": false}"#).unwrap();
    let mut engine = SettingsEngine::new(Some(path));

    let settings = engine.load().unwrap();

    assert!(!settings.enable_table_provider);
    assert_eq!(settings.namespace_key, DEFAULT_NAMESPACE_KEY);
}

#[test]
fn test_unknown_key_rejected() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);
    let err = engine.set_value("theme", json!("dark")).unwrap_err();
    assert!(matches!(err, SettingsError::InvalidValue(ref m) if m.contains("theme")));
}

#[test]
fn test_wrong_type_rejected_and_unchanged() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);

    assert!(matches!(
        engine.set_value("provider_timeout_ms", json!("soon")),
        Err(SettingsError::InvalidValue(_))
    ));
    assert!(matches!(
        engine.set_value("namespace_key", json!("")),
        Err(SettingsError::InvalidValue(_))
    ));
    assert_eq!(engine.get_settings(), &StorageSettings::default());
}

#[test]
fn test_malformed_file_is_serialization_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();
    let mut engine = SettingsEngine::new(Some(path));

    assert!(matches!(
        engine.load(),
        Err(SettingsError::SerializationError(_))
    ));
}

#[test]
fn test_reset_restores_defaults() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);
    engine.set_value("enable_table_provider", json!(false)).unwrap();

    engine.reset().unwrap();

    assert_eq!(engine.get_settings(), &StorageSettings::default());
    let mut reloaded = engine_in(&dir);
    assert_eq!(reloaded.load().unwrap(), StorageSettings::default());
}

#[test]
fn test_config_path_is_reported() {
    let dir = TempDir::new().unwrap();
    let engine = engine_in(&dir);
    assert_eq!(
        engine.get_config_path(),
        dir.path().join("config").join("settings.json")
    );
}
