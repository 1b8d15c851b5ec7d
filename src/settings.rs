//! Player preferences and runner tuning
//!
//! Read from LocalStorage on the web; native builds use the defaults.

use serde::{Deserialize, Serialize};

use crate::tuning::{RunnerTuning, TuningError};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid runner tuning: {0}")]
    Tuning(#[from] TuningError),
}

/// Arcade settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `KeyboardEvent.code` that makes the runner jump
    pub jump_key: String,
    /// `KeyboardEvent.code` that toggles the runner autopilot
    pub autopilot_key: String,
    /// Runner physics and pacing
    pub runner: RunnerTuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            jump_key: "Space".to_string(),
            autopilot_key: "KeyI".to_string(),
            runner: RunnerTuning::default(),
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "poem_arcade_settings";

    /// Parse and validate settings. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.runner.validate()?;
        Ok(settings)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("No settings storage on native, {} unused", Self::STORAGE_KEY);
        Self::default()
    }
}
