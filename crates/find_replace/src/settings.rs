//! Find/replace settings
//!
//! The last-used option toggles, loaded from and saved to a JSON file.
//! History lists are kept by the UI and are not part of these settings.

use crate::options::SearchOptions;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings container
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FindReplaceSettings {
    /// Option toggles a new controller starts with
    pub options: SearchOptions,
}

impl FindReplaceSettings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Settings file manager
pub struct SettingsFile {
    /// Path to the settings file
    path: PathBuf,
    /// Current settings (cached)
    current: FindReplaceSettings,
}

impl SettingsFile {
    /// Create a manager for `findreplace.json` in the given directory
    pub fn new(settings_dir: impl AsRef<Path>) -> Self {
        Self {
            path: settings_dir.as_ref().join("findreplace.json"),
            current: FindReplaceSettings::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings from disk, or fall back to defaults if the file is missing or malformed
    pub fn load(&mut self) -> Result<&FindReplaceSettings> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            match FindReplaceSettings::from_json(&content) {
                Ok(settings) => {
                    self.current = settings;
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse find/replace settings, using defaults: {}",
                        e
                    );
                    self.current = FindReplaceSettings::default();
                }
            }
        } else {
            self.current = FindReplaceSettings::default();
        }
        Ok(&self.current)
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, self.current.to_json()?)?;
        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> &FindReplaceSettings {
        &self.current
    }

    /// Update settings and save to disk
    pub fn update(&mut self, settings: FindReplaceSettings) -> Result<()> {
        self.current = settings;
        self.save()
    }
}
