//! User settings persisted on the device
//!
//! Currently only the backend URL, which the user can point at their own
//! server. An unreadable settings file behaves like an empty one.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared::{normalize_api_url, validate_api_url};

use crate::error::{AppError, AppResult};

/// Contents of the settings file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

/// JSON-file backed settings
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings file; a missing file yields defaults
    pub fn load(&self) -> AppResult<Settings> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, settings: &Settings) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(settings)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Save a backend URL and return it as stored
    ///
    /// The URL is normalized first, so what is validated is what gets saved.
    pub fn save_api_url(&self, url: &str) -> AppResult<String> {
        let url = normalize_api_url(url);
        validate_api_url(url).map_err(|msg| AppError::validation("api_url", msg))?;

        let mut settings = self.load().unwrap_or_default();
        settings.api_url = Some(url.to_string());
        self.store(&settings)?;

        tracing::info!(path = %self.path.display(), url, "Backend URL saved");
        Ok(url.to_string())
    }

    /// Forget the saved URL so the configured default applies again
    pub fn reset_api_url(&self) -> AppResult<()> {
        let mut settings = self.load().unwrap_or_default();
        if settings.api_url.take().is_some() {
            self.store(&settings)?;
            tracing::info!("Backend URL reset to default");
        }
        Ok(())
    }

    /// The saved URL if there is one, otherwise `configured`
    pub fn resolve_api_url(&self, configured: &str) -> String {
        match self.load() {
            Ok(Settings { api_url: Some(url) }) if validate_api_url(&url).is_ok() => url,
            Ok(Settings { api_url: Some(url) }) => {
                tracing::warn!(%url, "Saved backend URL is invalid, using configured one");
                configured.to_string()
            }
            Ok(_) => configured.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read settings, using configured backend URL");
                configured.to_string()
            }
        }
    }
}
