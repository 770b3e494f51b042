//! Dashboard configuration: backend location, poll cadence and default parameters.
//!
//! Loaded from TOML. Lookup order: an explicit path, then
//! `<config dir>/zlema-trader/config.toml` when it exists, then built-in
//! defaults. `ZLEMA_API_URL` overrides the backend base URL in every case.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::domain::{OverlaySettings, PolynomialParams, StrategyToggles, TradingParams};

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "ZLEMA_API_URL";

/// Application directory name under the platform config dir.
pub const APP_DIR: &str = "zlema-trader";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Poll intervals in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Market data, key levels, trades and account status.
    pub dashboard_secs: u64,
    pub market_status_secs: u64,
    pub news_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            dashboard_secs: 5,
            market_status_secs: 30,
            news_secs: 60,
        }
    }
}

/// Parameters the dashboard starts with when nothing was persisted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Ask the backend for model-scored headlines.
    pub news_ai_analysis: bool,
    pub params: TradingParams,
    pub overlays: OverlaySettings,
    pub polynomial: PolynomialParams,
    pub toggles: StrategyToggles,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory for rolling log files; the platform data dir when unset.
    pub log_dir: Option<PathBuf>,
    pub api: ApiConfig,
    pub poll: PollConfig,
    pub defaults: DefaultsConfig,
}

impl DashboardConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Default config file location under `config_root`.
    pub fn default_path(config_root: &Path) -> PathBuf {
        config_root.join(APP_DIR).join("config.toml")
    }

    /// Resolve the configuration.
    ///
    /// An explicit path must exist. The default location is optional.
    pub fn load(explicit: Option<&Path>, config_root: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match (explicit, config_root) {
            (Some(path), _) => Self::from_file(path)?,
            (None, Some(root)) => {
                let path = Self::default_path(root);
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
            (None, None) => Self::default(),
        };
        config.apply_env(std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    /// Apply the `ZLEMA_API_URL` override, if set and non-empty.
    pub fn apply_env(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api.base_url must start with http:// or https://, got '{url}'"
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid("api.timeout_secs must be positive".into()));
        }
        if self.poll.dashboard_secs == 0 || self.poll.market_status_secs == 0 || self.poll.news_secs == 0 {
            return Err(ConfigError::Invalid("poll intervals must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let c = DashboardConfig::default();
        assert_eq!(c.api.base_url, "http://localhost:8000");
        assert_eq!(c.api.timeout(), Duration::from_secs(10));
        assert_eq!(c.poll.dashboard_secs, 5);
        assert_eq!(c.defaults.params.pair, "GBP_USD");
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let c = DashboardConfig::from_toml(
            r#"
            [api]
            base_url = "http://trader:9000"

            [defaults.params]
            pair = "EUR_USD"
            timeframe = "H1"
            "#,
        )
        .unwrap();
        assert_eq!(c.api.base_url, "http://trader:9000");
        assert_eq!(c.api.timeout_secs, 10);
        assert_eq!(c.defaults.params.pair, "EUR_USD");
        assert_eq!(c.defaults.params.periods, 48);
        assert!(c.defaults.overlays.support);
    }

    #[test]
    fn toml_roundtrip() {
        let mut c = DashboardConfig::default();
        c.poll.news_secs = 120;
        c.defaults.polynomial.degree = 3;
        let text = c.to_toml().unwrap();
        let back = DashboardConfig::from_toml(&text).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn rejects_bad_url_and_zero_intervals() {
        assert!(matches!(
            DashboardConfig::from_toml("[api]\nbase_url = \"localhost\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DashboardConfig::from_toml("[poll]\ndashboard_secs = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn env_override_wins() {
        let mut c = DashboardConfig::default();
        c.apply_env(Some("http://remote:8080".into()));
        assert_eq!(c.api.base_url, "http://remote:8080");
        c.apply_env(Some("   ".into()));
        assert_eq!(c.api.base_url, "http://remote:8080");
    }

    #[test]
    fn load_uses_default_location_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = DashboardConfig::default_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[poll]\nnews_secs = 90\n").unwrap();

        let c = DashboardConfig::load(None, Some(dir.path())).unwrap();
        assert_eq!(c.poll.news_secs, 90);
    }

    #[test]
    fn missing_default_location_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let c = DashboardConfig::load(None, Some(dir.path())).unwrap();
        assert_eq!(c.poll.news_secs, 60);
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = DashboardConfig::load(Some(Path::new("/nonexistent/zlema.toml")), None);
        assert!(matches!(err, Err(ConfigError::Read { .. })));
    }
}
