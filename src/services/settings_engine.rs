// LinkVault Settings Engine
// Loads, saves, and updates the storage settings.
// Settings are stored as a JSON file at the platform-specific config path.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::StorageSettings;

/// Environment variable overriding `data_dir`.
pub const DATA_DIR_ENV: &str = "LINKVAULT_DATA_DIR";

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<StorageSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &StorageSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &Path;
}

/// Settings engine that persists [`StorageSettings`] as JSON on disk.
pub struct SettingsEngine {
    config_path: PathBuf,
    settings: StorageSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// With `path_override` unset, uses `settings.json` in the platform config directory.
    pub fn new(path_override: Option<PathBuf>) -> Self {
        let config_path =
            path_override.unwrap_or_else(|| platform::get_config_dir().join("settings.json"));
        Self {
            config_path,
            settings: StorageSettings::default(),
        }
    }

    /// Loads settings and then applies `LINKVAULT_DATA_DIR` if it is set.
    pub fn load_with_env(&mut self) -> Result<StorageSettings, SettingsError> {
        let settings = self.load()?;
        self.settings = apply_data_dir_override(settings, std::env::var(DATA_DIR_ENV).ok());
        Ok(self.settings.clone())
    }
}

/// Replaces `data_dir` with `value` when it is present and non-empty.
pub fn apply_data_dir_override(mut settings: StorageSettings, value: Option<String>) -> StorageSettings {
    if let Some(dir) = value.filter(|v| !v.trim().is_empty()) {
        settings.data_dir = Some(PathBuf::from(dir));
    }
    settings
}

fn validate(settings: &StorageSettings) -> Result<(), SettingsError> {
    if settings.namespace_key.trim().is_empty() {
        return Err(SettingsError::InvalidValue(
            "namespace_key cannot be empty".to_string(),
        ));
    }
    if settings.database_file.trim().is_empty() {
        return Err(SettingsError::InvalidValue(
            "database_file cannot be empty".to_string(),
        ));
    }
    Ok(())
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file.
    ///
    /// A missing file yields defaults; a malformed one is a serialization error.
    fn load(&mut self) -> Result<StorageSettings, SettingsError> {
        if !self.config_path.exists() {
            debug!(path = %self.config_path.display(), "no settings file, using defaults");
            self.settings = StorageSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        let settings: StorageSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        validate(&settings)?;

        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Saves the current settings, creating parent directories as needed.
    fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(&self.config_path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_settings(&self) -> &StorageSettings {
        &self.settings
    }

    /// Updates one top-level setting by name and saves.
    ///
    /// The new value is validated by deserializing the whole settings object.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        let mut json_value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        match json_value.as_object_mut() {
            Some(map) if map.contains_key(key) => {
                map.insert(key.to_string(), value);
            }
            _ => {
                return Err(SettingsError::InvalidValue(format!(
                    "Unknown settings key '{}'",
                    key
                )))
            }
        }

        let new_settings: StorageSettings = serde_json::from_value(json_value).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;
        validate(&new_settings)?;

        self.settings = new_settings;
        self.save()
    }

    /// Resets all settings to defaults and saves to disk.
    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = StorageSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &Path {
        &self.config_path
    }
}
