//! Application configuration
//!
//! This module re-exports shared types from stagger-types and provides
//! persistence and the platform data directory for AppConfig.

use std::path::PathBuf;

use tracing::warn;

use super::ConfigError;

// Re-export all shared types
pub use stagger_types::{AlertSettings, AppConfig, ClockSettings, HandicapPolicy, PointsTable};

/// Name used for the confy config file and the data directory
pub const APP_NAME: &str = "stagger";

const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Defaults
// ─────────────────────────────────────────────────────────────────────────────

fn default_data_directory() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join(APP_NAME).join("races"))
}

// ─────────────────────────────────────────────────────────────────────────────
// AppConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for AppConfig persistence
pub trait AppConfigExt: Sized {
    /// Load from disk, falling back to defaults when the file is missing or
    /// unreadable
    fn load() -> Self;
    fn try_load() -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;

    /// Where race files live. An empty `data_directory` means the platform
    /// default.
    fn data_dir(&self) -> Result<PathBuf, ConfigError>;
}

impl AppConfigExt for AppConfig {
    fn load() -> Self {
        Self::try_load().unwrap_or_else(|e| {
            warn!(error = %e, "Could not load configuration, using defaults");
            Self::default()
        })
    }

    fn try_load() -> Result<Self, ConfigError> {
        Ok(confy::load(APP_NAME, CONFIG_NAME)?)
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        if self.data_directory.trim().is_empty() {
            default_data_directory().ok_or(ConfigError::NoDataDir)
        } else {
            Ok(PathBuf::from(&self.data_directory))
        }
    }
}
