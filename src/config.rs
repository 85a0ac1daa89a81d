//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration errors that abort startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `LISTEN_ADDR` is not a socket address.
    #[error("LISTEN_ADDR '{0}' is not a valid socket address")]
    ListenAddr(String),

    /// `BACKEND_BASE_URL` is not an absolute http(s) URL.
    #[error("BACKEND_BASE_URL '{0}' is not a valid http(s) URL")]
    BaseUrl(String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Base URL of the platform API, without trailing slash.
    pub backend_base_url: String,

    /// Bearer token sent to the platform API.
    pub backend_api_token: Option<String>,

    /// Timeout of a single backend call, in seconds.
    pub backend_timeout_secs: u64,

    /// Timeout of a whole gateway request, in seconds.
    pub request_timeout_secs: u64,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,

    /// JSON fixture served through the in-memory backend instead of the
    /// platform API.
    pub backend_fixture_path: Option<PathBuf>,

    /// Log output format.
    pub log_format: LogFormat,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `LISTEN_ADDR` or `BACKEND_BASE_URL` is
    /// set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`GatewayConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr = lookup("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let listen_addr: SocketAddr = raw_addr
            .trim()
            .parse()
            .map_err(|_| ConfigError::ListenAddr(raw_addr.clone()))?;

        let raw_url =
            lookup("BACKEND_BASE_URL").unwrap_or_else(|| "http://localhost:8080/api".to_string());
        let backend_base_url = validate_base_url(&raw_url)?;

        let backend_api_token = non_blank(lookup("BACKEND_API_TOKEN"));
        let backend_fixture_path = non_blank(lookup("BACKEND_FIXTURE_PATH")).map(PathBuf::from);

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            backend_base_url,
            backend_api_token,
            backend_timeout_secs: parse_var(&lookup, "BACKEND_TIMEOUT_SECS", 10),
            request_timeout_secs: parse_var(&lookup, "REQUEST_TIMEOUT_SECS", 30),
            event_bus_capacity: parse_var(&lookup, "EVENT_BUS_CAPACITY", 1024),
            backend_fixture_path,
            log_format,
        })
    }

    /// Backend call timeout.
    #[must_use]
    pub const fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }

    /// Whole-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    match reqwest::Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            Ok(trimmed.trim_end_matches('/').to_string())
        }
        _ => Err(ConfigError::BaseUrl(raw.to_string())),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parses a variable as `T`, returning `default` on missing or invalid
/// values.
fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let Ok(config) = load(&[]) else {
            panic!("defaults should load");
        };
        assert_eq!(config.listen_addr.port(), 3000);
        assert_eq!(config.backend_base_url, "http://localhost:8080/api");
        assert_eq!(config.backend_api_token, None);
        assert_eq!(config.backend_timeout(), Duration::from_secs(10));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.event_bus_capacity, 1024);
        assert_eq!(config.backend_fixture_path, None);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let Ok(config) = load(&[
            ("LISTEN_ADDR", "127.0.0.1:8081"),
            ("BACKEND_BASE_URL", "https://platform.example.com/api/"),
            ("BACKEND_API_TOKEN", "secret"),
            ("BACKEND_TIMEOUT_SECS", "3"),
            ("EVENT_BUS_CAPACITY", "16"),
            ("BACKEND_FIXTURE_PATH", "demos/fixture.json"),
            ("LOG_FORMAT", "JSON"),
        ]) else {
            panic!("config should load");
        };
        assert_eq!(config.listen_addr.port(), 8081);
        assert_eq!(config.backend_base_url, "https://platform.example.com/api");
        assert_eq!(config.backend_api_token.as_deref(), Some("secret"));
        assert_eq!(config.backend_timeout_secs, 3);
        assert_eq!(config.event_bus_capacity, 16);
        assert_eq!(
            config.backend_fixture_path,
            Some(PathBuf::from("demos/fixture.json"))
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn bad_numbers_fall_back_to_defaults() {
        let Ok(config) = load(&[("REQUEST_TIMEOUT_SECS", "soon")]) else {
            panic!("config should load");
        };
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn blank_token_is_absent() {
        let Ok(config) = load(&[("BACKEND_API_TOKEN", "   ")]) else {
            panic!("config should load");
        };
        assert_eq!(config.backend_api_token, None);
    }

    #[test]
    fn bad_listen_addr_is_an_error() {
        assert!(matches!(
            load(&[("LISTEN_ADDR", "localhost")]),
            Err(ConfigError::ListenAddr(_))
        ));
    }

    #[test]
    fn bad_base_url_is_an_error() {
        for url in ["not a url", "ftp://host/api", "file:///tmp"] {
            assert!(
                matches!(
                    load(&[("BACKEND_BASE_URL", url)]),
                    Err(ConfigError::BaseUrl(_))
                ),
                "{url} should be rejected"
            );
        }
    }
}
