//! Application configuration.
//!
//! Numeric knobs load from an optional `quotedesk.toml`; every field has a
//! default matching the provider's documented behavior (15-minute cache,
//! 30-second transport timeout, 12-second rate-limit back-off). The API
//! credential is deliberately not part of the file: it comes from the
//! environment once at startup, and its absence is fatal before any fetch
//! is attempted.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable holding the Alpha Vantage credential.
pub const API_KEY_ENV: &str = "ALPHAVANTAGE_API_KEY";

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "quotedesk.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Quote API host; tests point this at a local server.
    pub base_url: String,
    /// Freshness window for the in-memory cache.
    pub cache_ttl_minutes: u64,
    /// Trailing window of bars shown when the user gives no count.
    pub default_bars: usize,
    /// Per-request transport timeout.
    pub request_timeout_secs: u64,
    /// Fixed wait before the single rate-limit retry.
    pub rate_limit_backoff_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.alphavantage.co".to_string(),
            cache_ttl_minutes: 15,
            default_bars: 180,
            request_timeout_secs: 30,
            rate_limit_backoff_secs: 12,
        }
    }
}

impl AppConfig {
    /// Load configuration: an explicit path must exist and parse; with no
    /// path, `quotedesk.toml` is used when present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p,
            None => {
                let default = Path::new(CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_minutes * 60)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn rate_limit_backoff(&self) -> Duration {
        Duration::from_secs(self.rate_limit_backoff_secs)
    }
}

/// Read the API credential from the environment. Absence (or a blank value)
/// is a fatal startup condition.
pub fn api_key_from_env() -> Result<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            anyhow!("set {API_KEY_ENV} to your Alpha Vantage API key before running")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_provider_behavior() {
        let config = AppConfig::default();
        assert_eq!(config.cache_ttl(), Duration::from_secs(15 * 60));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.rate_limit_backoff(), Duration::from_secs(12));
        assert_eq!(config.default_bars, 180);
    }

    #[test]
    fn partial_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotedesk.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "cache_ttl_minutes = 5\ndefault_bars = 120").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.cache_ttl_minutes, 5);
        assert_eq!(config.default_bars, 120);
        // Untouched knobs keep their defaults.
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotedesk.toml");
        std::fs::write(&path, "cache_ttl_mins = 5\n").unwrap();

        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn api_key_respects_environment() {
        std::env::set_var(API_KEY_ENV, "  demo-key  ");
        assert_eq!(api_key_from_env().unwrap(), "demo-key");

        std::env::set_var(API_KEY_ENV, "   ");
        assert!(api_key_from_env().is_err());
        std::env::remove_var(API_KEY_ENV);
    }
}
