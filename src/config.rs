use crate::conversation::RetrievalWidth;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Backend used when neither the flag, the environment nor the file set one
pub const DEFAULT_BASE_URL: &str = "http://65.0.117.13:8000";

/// Environment variable overriding the backend base URL
pub const BASE_URL_ENV: &str = "SEBI_ASSIST_API_URL";

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the question-answering service
    pub base_url: String,

    /// Retrieval width selected at startup
    pub default_top_k: RetrievalWidth,

    /// Per-request timeout; unset waits for the backend indefinitely
    pub request_timeout_secs: Option<u64>,

    /// UI preferences
    pub ui: UiConfig,
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub show_timestamps: bool,
    pub tick_rate_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_timestamps: true,
            tick_rate_ms: 300,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_top_k: RetrievalWidth::default(),
            request_timeout_secs: None,
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// `~/.sebi-assist`
    pub fn home_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".sebi-assist"))
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("config.toml"))
    }

    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Apply the base URL override chain: flag, then environment, then file.
    pub fn resolve_base_url(&mut self, flag: Option<String>, env: Option<String>) {
        if let Some(url) = flag.or(env).filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
    }

    /// Read [`BASE_URL_ENV`]
    pub fn base_url_from_env() -> Option<String> {
        std::env::var(BASE_URL_ENV).ok()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.ui.tick_rate_ms.max(50))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.default_top_k, RetrievalWidth::Four);
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            base_url: "http://localhost:9000".to_string(),
            default_top_k: RetrievalWidth::Eight,
            request_timeout_secs: Some(30),
            ui: UiConfig {
                show_timestamps: false,
                tick_rate_ms: 120,
            },
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_top_k = 6\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_top_k, RetrievalWidth::Six);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.ui.show_timestamps);
    }

    #[test]
    fn invalid_width_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_top_k = 5\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn base_url_precedence() {
        let mut config = Config::default();
        config.resolve_base_url(None, None);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);

        config.resolve_base_url(None, Some("http://env:1".into()));
        assert_eq!(config.base_url, "http://env:1");

        config.resolve_base_url(Some("http://flag:2".into()), Some("http://env:1".into()));
        assert_eq!(config.base_url, "http://flag:2");

        config.resolve_base_url(None, Some("  ".into()));
        assert_eq!(config.base_url, "http://flag:2");
    }

    #[test]
    fn tick_rate_has_floor() {
        let mut config = Config::default();
        config.ui.tick_rate_ms = 0;
        assert_eq!(config.tick_rate(), Duration::from_millis(50));
    }
}
