//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Where and how to reach the prediction backend.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub predict_path: String,
    /// Upper bound for one classification request.
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            predict_path: "/predict".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl GatewayConfig {
    /// Full URL of the prediction endpoint.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.predict_path.trim_start_matches('/')
        )
    }
}

/// Assistant configuration.
#[derive(Debug, Clone)]
pub struct AssistConfig {
    pub gateway: GatewayConfig,
    /// Typing delay before each bot message is shown.
    pub reveal_delay: Duration,
    /// Optional JSON catalog replacing the built-in one.
    pub catalog_path: Option<PathBuf>,
    /// Port for `serve` mode.
    pub http_port: u16,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            reveal_delay: Duration::from_millis(600),
            catalog_path: None,
            http_port: 8080,
        }
    }
}

impl AssistConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from any key lookup. Unparseable values fall back to
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());

        let gateway = GatewayConfig {
            base_url: lookup("GEOTEXTILE_BACKEND_URL").unwrap_or(defaults.gateway.base_url),
            predict_path: lookup("GEOTEXTILE_PREDICT_PATH").unwrap_or(defaults.gateway.predict_path),
            timeout: parsed("GEOTEXTILE_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.gateway.timeout),
        };

        let reveal_delay = parsed("GEOTEXTILE_REVEAL_DELAY_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.reveal_delay);

        let catalog_path = lookup("GEOTEXTILE_CATALOG_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let http_port: u16 = lookup("GEOTEXTILE_HTTP_PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.http_port);

        Self {
            gateway,
            reveal_delay,
            catalog_path,
            http_port,
        }
    }

    /// Reject values that cannot work at all.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.gateway.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "GEOTEXTILE_BACKEND_URL".to_string(),
                message: format!("{url:?} is not an http(s) URL"),
            });
        }
        Ok(())
    }
}
