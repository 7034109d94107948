use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::store::LocalStore;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub const CURRENT_WEATHER_PATH: &str = "/api/weather/current";
pub const FORECAST_PATH: &str = "/api/weather/forecast";
pub const HEALTH_PATH: &str = "/api/health";

/// Everything the proxy client needs to issue requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// backend_url = "http://localhost:5000"
/// timeout_ms = 10000
/// data_dir = "/home/me/.local/share/weatherdash"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Origin of the weather proxy; request paths are appended to it.
    pub backend_url: String,

    pub timeout_ms: u64,

    /// Where search history and preferences live. Defaults to the platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            data_dir: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    ///
    /// The result is not validated, so a broken file can still be repaired
    /// through `configure` or overridden before use.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.validate()?;
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.backend_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(anyhow!(
                "Invalid backend_url '{}'. It must start with http:// or https://.",
                self.backend_url
            ));
        }
        if self.timeout_ms == 0 {
            return Err(anyhow!("timeout_ms must be greater than zero."));
        }
        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weatherdash", "weatherdash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding history and preferences.
    pub fn resolved_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.data_dir().to_path_buf()),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.backend_url.trim().trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }

    pub fn local_store(&self) -> Result<LocalStore> {
        Ok(LocalStore::on_disk(self.resolved_data_dir()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_proxy() {
        let cfg = Config::default();
        assert_eq!(cfg.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(cfg.client_config(), ClientConfig::default());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = Config::from_toml("backend_url = \"https://weather.example.com/\"\n")
            .expect("config should parse");
        assert_eq!(cfg.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(cfg.data_dir, None);
        assert_eq!(cfg.client_config().base_url, "https://weather.example.com");
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = Config {
            backend_url: "http://127.0.0.1:8080".into(),
            timeout_ms: 2500,
            data_dir: Some(PathBuf::from("/tmp/weatherdash")),
        };
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), cfg);
        assert_eq!(cfg.client_config().timeout, Duration::from_millis(2500));
    }

    #[test]
    fn rejects_non_http_backend() {
        let cfg = Config::from_toml("backend_url = \"ftp://nope\"\n").unwrap();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid backend_url"));
    }

    #[test]
    fn rejects_zero_timeout() {
        let cfg = Config::from_toml("timeout_ms = 0\n").unwrap();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[test]
    fn invalid_stored_backend_still_loads_and_can_be_overridden() {
        let mut cfg = Config::from_toml("backend_url = \"localhost:5000\"\n")
            .expect("unvalidated config should parse");
        assert!(cfg.validate().is_err());
        assert!(crate::provider::provider_from_config(&cfg).is_err());

        cfg.backend_url = "http://localhost:5001".into();
        cfg.validate().expect("override should make the config usable");
    }

    #[test]
    fn save_refuses_invalid_config() {
        let cfg = Config { timeout_ms: 0, ..Config::default() };
        assert!(cfg.save().is_err());
    }

    #[test]
    fn explicit_data_dir_wins() {
        let cfg = Config { data_dir: Some(PathBuf::from("/srv/wx")), ..Config::default() };
        assert_eq!(cfg.resolved_data_dir().unwrap(), PathBuf::from("/srv/wx"));
    }
}
