// Credential & Configuration Storage
// Resolves the Gemini API key from the environment or the config file and
// hands it around as an explicit value. The gateway never reads ambient
// process state itself.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A caller-supplied API key. Deliberately opaque in Debug output so keys do
/// not leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve a credential from environment variables, then the config file.
    /// Returns None when no key is configured anywhere.
    pub fn resolve() -> Option<Self> {
        for key in ["GEMINI_API_KEY", "VERIDECT_GEMINI_API_KEY"] {
            if let Ok(val) = env::var(key) {
                let v = val.trim();
                if !v.is_empty() {
                    return Some(Self(v.to_string()));
                }
            }
        }

        if let Some(config_dir) = ConfigStore::default_config_dir() {
            let store = ConfigStore::new(config_dir);
            if let Ok(Some(key)) = store.get_api_key("gemini") {
                return Some(Self(key));
            }
        }

        None
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential(len={})", self.0.len())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub version: String,
    /// Model override for the analysis features; default is picked in the
    /// request builders when absent.
    pub model: Option<String>,
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
}

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("veridect"))
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.config_dir)?;
        Ok(())
    }

    /// Load configuration from file
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        self.ensure_dir()?;

        // Create backup if file exists
        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_file, content)?;
        Ok(())
    }

    /// Create a backup of current config
    fn create_backup(&self) -> Result<(), ConfigError> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir)?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));

        fs::copy(&self.config_file, &backup_file)?;

        // Keep only last 10 backups
        self.cleanup_old_backups(&backup_dir, 10)?;

        Ok(())
    }

    /// Remove old backups, keeping only the most recent N
    fn cleanup_old_backups(&self, backup_dir: &PathBuf, keep: usize) -> Result<(), ConfigError> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Sort by modification time (oldest first)
        entries.sort_by_key(|e| {
            e.metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
        });

        for entry in entries.iter().take(entries.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }

    /// Get provider API key from config file
    pub fn get_api_key(&self, provider: &str) -> Result<Option<String>, ConfigError> {
        let config = self.load()?;
        Ok(config.api_keys.get(provider).cloned())
    }

    /// Store provider API key in config file
    pub fn set_api_key(&self, provider: &str, key: &str) -> Result<(), ConfigError> {
        let mut config = self.load()?;
        config.api_keys.insert(provider.to_string(), key.to_string());
        self.save(&config)
    }

    /// Delete provider API key from config file
    pub fn delete_api_key(&self, provider: &str) -> Result<(), ConfigError> {
        let mut config = self.load()?;
        config.api_keys.remove(provider);
        self.save(&config)
    }
}
