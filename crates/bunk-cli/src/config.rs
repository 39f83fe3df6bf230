//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use bunk_core::{UserId, ValidationError};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// User profile used when none is configured.
pub const DEFAULT_USER: &str = "default";

/// Application configuration.
///
/// The attendance target is not configured here; it lives on the user profile
/// in the database (see `bunk target`).
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Profile whose subjects and attendance the CLI operates on.
    pub user: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("user", &self.user)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("bunk.db"),
            user: DEFAULT_USER.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (BUNK_*)
        figment = figment.merge(Env::prefixed("BUNK_"));

        figment.extract()
    }

    /// The configured user as a validated ID.
    pub fn user_id(&self) -> Result<UserId, ValidationError> {
        UserId::new(self.user.clone())
    }
}

/// Returns the platform-specific config directory for bunk.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("bunk"))
}

/// Returns the platform-specific data directory for bunk.
///
/// On Linux: `~/.local/share/bunk`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("bunk"))
}
