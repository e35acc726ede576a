//! Application configuration.
//!
//! Loaded from `config.toml` in the platform data directory. The remote
//! connection can also come from the environment, which wins over the file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variables checked, in order, for the remote project URL.
const URL_VARS: &[&str] = &["VITE_SUPABASE_URL", "SUPABASE_URL"];

/// Environment variables checked, in order, for the anonymous API key.
const KEY_VARS: &[&str] = &["VITE_SUPABASE_ANON_KEY", "SUPABASE_ANON_KEY"];

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Local storage settings
    #[serde(default)]
    pub storage: StorageSettings,
    /// Remote content store settings
    #[serde(default)]
    pub remote: RemoteSettings,
    /// Point awards and badge thresholds
    #[serde(default)]
    pub rewards: RewardSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            storage: StorageSettings::default(),
            remote: RemoteSettings::default(),
            rewards: RewardSettings::default(),
        }
    }
}

impl AppConfig {
    /// Path of the local progress database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.storage.database_file)
    }
}

/// Local storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Database file name inside the data directory
    pub database_file: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_file: "noornest.db".to_string(),
        }
    }
}

/// Remote content store connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: Option<String>,
    /// Anonymous API key
    pub anon_key: Option<String>,
    /// Subscribe to realtime change notifications
    #[serde(default = "default_true")]
    pub realtime_enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            realtime_enabled: true,
        }
    }
}

impl RemoteSettings {
    /// Overlay values found in the environment.
    pub fn apply_env(&mut self) {
        if let Some(url) = first_env(URL_VARS) {
            self.url = Some(url);
        }
        if let Some(key) = first_env(KEY_VARS) {
            self.anon_key = Some(key);
        }
    }

    /// Connection parameters, if both are present and the URL looks usable.
    pub fn connection(&self) -> Option<(&str, &str)> {
        let url = self.url.as_deref()?.trim();
        let key = self.anon_key.as_deref()?.trim();

        if url.starts_with("http") && !key.is_empty() {
            Some((url, key))
        } else {
            None
        }
    }

    /// Whether a remote store can be reached at all.
    pub fn is_configured(&self) -> bool {
        self.connection().is_some()
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

/// Point awards and badge thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardSettings {
    /// Points for a day with every habit checked
    pub points_per_perfect_day: u32,
    /// Points for each Juz marked complete
    pub points_per_juz: u32,
    /// Completed Juz needed for the Quran Seeker badge
    pub quran_seeker_juz: usize,
    /// Charity acts needed for the Generous Heart badge
    pub charity_star_acts: usize,
    /// Streak length needed for the Consistent Soul badge
    pub streak_badge_days: u32,
}

impl Default for RewardSettings {
    fn default() -> Self {
        Self {
            points_per_perfect_day: 100,
            points_per_juz: 200,
            quran_seeker_juz: 5,
            charity_star_acts: 10,
            streak_badge_days: 7,
        }
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "noornest", "NoorNest")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from file, then apply environment overrides.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let mut config = load_config_from(&get_config_path())?;
    config.data_dir = get_data_dir();
    config.remote.apply_env();

    if !config.remote.is_configured() {
        tracing::info!(
            "Remote content store not configured; set SUPABASE_URL and SUPABASE_ANON_KEY to enable it"
        );
    }

    Ok(config)
}

/// Load configuration from a specific file. A missing file yields defaults.
pub fn load_config_from(path: &std::path::Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Save application configuration to file.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &get_config_path())
}

/// Save configuration to a specific file.
pub fn save_config_to(config: &AppConfig, path: &std::path::Path) -> Result<(), ConfigError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
