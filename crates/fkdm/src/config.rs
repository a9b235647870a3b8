//! Configuration management for fkdm.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "fkdm";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "fkdm.db";

/// Environment variable prefix.
const ENV_PREFIX: &str = "FKDM_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FKDM_`, sections split by `__`,
///    e.g. `FKDM_STORAGE__QUOTA_BYTES`)
/// 2. TOML config file at `~/.config/fkdm/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Session restore behavior.
    pub session: SessionConfig,
    /// Login credential and the user it unlocks.
    pub auth: AuthConfig,
    /// Share link configuration.
    pub share: ShareConfig,
    /// Dashboard configuration.
    pub dashboard: DashboardConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/fkdm/fkdm.db`
    pub database_path: Option<PathBuf>,
    /// Maximum bytes the slot store may hold. 0 means unlimited.
    pub quota_bytes: u64,
    /// Slot holding the persisted session.
    pub session_slot: String,
    /// Slot holding the persisted report list.
    pub reports_slot: String,
}

/// Session-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Treat a malformed persisted session as a fatal startup error instead
    /// of discarding it.
    pub strict_restore: bool,
}

/// The single credential pair accepted by `login` and the user it yields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Accepted login name.
    pub username: String,
    /// Accepted secret.
    pub password: String,
    /// Identifier of the user created on login.
    pub user_id: String,
    /// Display name of the user created on login.
    pub full_name: String,
    /// Organizational identifier of the user created on login.
    pub fkdm_id: String,
    /// Locality of the user created on login.
    pub kelurahan: String,
}

/// How share links are opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenerKind {
    /// Hand the link to the platform URL handler.
    #[default]
    System,
    /// Print the link to stdout.
    Print,
}

/// Share-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Prefix the encoded transcript is appended to for WhatsApp.
    pub whatsapp_template: String,
    /// Prefix the encoded transcript is appended to for Telegram.
    pub telegram_template: String,
    /// How links are opened.
    pub opener: OpenerKind,
}

/// Dashboard-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Number of newest reports listed on the dashboard.
    pub recent_limit: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            quota_bytes: 5 * 1024 * 1024,
            session_slot: "fkdm_user".to_string(),
            reports_slot: "fkdm_reports".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin123".to_string(),
            user_id: "1".to_string(),
            full_name: "Administrator FKDM".to_string(),
            fkdm_id: "FKDM001".to_string(),
            kelurahan: "Kelurahan Contoh".to_string(),
        }
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            whatsapp_template: "https://wa.me/?text=".to_string(),
            telegram_template: "https://t.me/share/url?text=".to_string(),
            opener: OpenerKind::System,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { recent_limit: 5 }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let slot_name = Regex::new(r"^[A-Za-z0-9_.-]+$")
            .map_err(|e| Error::internal(format!("slot name pattern: {e}")))?;
        for (label, slot) in [
            ("session_slot", &self.storage.session_slot),
            ("reports_slot", &self.storage.reports_slot),
        ] {
            if !slot_name.is_match(slot) {
                return Err(Error::ConfigValidation {
                    message: format!("{label} must match [A-Za-z0-9_.-]+, got '{slot}'"),
                });
            }
        }
        if self.storage.session_slot == self.storage.reports_slot {
            return Err(Error::ConfigValidation {
                message: format!(
                    "session_slot and reports_slot must differ (both are '{}')",
                    self.storage.session_slot
                ),
            });
        }

        let url_scheme = Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:")
            .map_err(|e| Error::internal(format!("url scheme pattern: {e}")))?;
        for (label, template) in [
            ("whatsapp_template", &self.share.whatsapp_template),
            ("telegram_template", &self.share.telegram_template),
        ] {
            if !url_scheme.is_match(template) {
                return Err(Error::ConfigValidation {
                    message: format!("{label} must start with a URL scheme, got '{template}'"),
                });
            }
        }

        if self.dashboard.recent_limit == 0 {
            return Err(Error::ConfigValidation {
                message: "recent_limit must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the storage quota, `None` when unlimited.
    #[must_use]
    pub fn quota(&self) -> Option<u64> {
        (self.storage.quota_bytes > 0).then_some(self.storage.quota_bytes)
    }
}
