//! Server configuration module
//!
//! Handles loading configuration from environment variables with sensible defaults.
//! Store connection settings live in [`wallpaper_core::StoreConfig`].

use std::net::SocketAddr;
use std::time::Duration;

use wallpaper_core::DEFAULT_IMAGE_BASE_URL;

/// Default `Cache-Control` for image redirects: one hour in browsers, one day
/// at the edge, and a week of stale-while-revalidate.
pub const DEFAULT_REDIRECT_CACHE_CONTROL: &str =
    "public, max-age=3600, s-maxage=86400, stale-while-revalidate=604800";

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 3000)
    pub port: u16,
    /// Server host (default: 127.0.0.1)
    pub host: [u8; 4],
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Enable rate limiting (default: false for tests, true when loaded from env)
    pub rate_limit_enabled: bool,
    /// Rate limit: sustained requests per second per client (default: 10)
    pub rate_limit_per_sec: u64,
    /// Rate limit: burst size (default: 20)
    pub rate_limit_burst: u32,
    /// Origin prefixed to relative image records
    pub image_base_url: String,
    /// `Cache-Control` sent with image redirects
    pub redirect_cache_control: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            host: [127, 0, 0, 1],
            timeout_secs: 30,
            rate_limit_enabled: false, // Disabled by default (for tests)
            rate_limit_per_sec: 10,
            rate_limit_burst: 20,
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            redirect_cache_control: DEFAULT_REDIRECT_CACHE_CONTROL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        let host = lookup("HOST")
            .map(|h| {
                if h == "0.0.0.0" {
                    [0, 0, 0, 0]
                } else {
                    [127, 0, 0, 1]
                }
            })
            .unwrap_or(defaults.host);

        let timeout_secs = lookup("REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.timeout_secs);

        let rate_limit_per_sec = lookup("RATE_LIMIT_PER_SEC")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.rate_limit_per_sec);

        let rate_limit_burst = lookup("RATE_LIMIT_BURST")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.rate_limit_burst);

        // Enabled in production unless RATE_LIMIT_ENABLED=false
        let rate_limit_enabled = lookup("RATE_LIMIT_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let image_base_url = lookup("IMAGE_BASE_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.image_base_url);

        let redirect_cache_control = lookup("REDIRECT_CACHE_CONTROL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.redirect_cache_control);

        Self {
            port,
            host,
            timeout_secs,
            rate_limit_enabled,
            rate_limit_per_sec,
            rate_limit_burst,
            image_base_url,
            redirect_cache_control,
        }
    }

    /// Interval after which one request of the burst quota is replenished.
    ///
    /// A rate of 0 is treated as 1 request per second.
    pub fn rate_limit_period(&self) -> Duration {
        let nanos = 1_000_000_000 / self.rate_limit_per_sec.max(1);
        Duration::from_nanos(nanos.max(1))
    }

    /// Get socket address from config
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert!(!config.rate_limit_enabled);
        assert_eq!(config.image_base_url, "https://bing.com");
        assert!(config.redirect_cache_control.contains("stale-while-revalidate"));
    }

    #[test]
    fn test_from_lookup() {
        let config = Config::from_lookup(|name| match name {
            "PORT" => Some("8080".into()),
            "HOST" => Some("0.0.0.0".into()),
            "RATE_LIMIT_ENABLED" => Some("FALSE".into()),
            "IMAGE_BASE_URL" => Some("https://cn.bing.com".into()),
            "REQUEST_TIMEOUT_SECS" => Some("not-a-number".into()),
            _ => None,
        });
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert!(!config.rate_limit_enabled);
        assert_eq!(config.image_base_url, "https://cn.bing.com");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_rate_limit_period_is_inverse_of_rate() {
        let mut config = Config::default();
        assert_eq!(config.rate_limit_period(), Duration::from_millis(100));

        config.rate_limit_per_sec = 1000;
        assert_eq!(config.rate_limit_period(), Duration::from_millis(1));

        config.rate_limit_per_sec = 1;
        assert_eq!(config.rate_limit_period(), Duration::from_secs(1));

        config.rate_limit_per_sec = 0;
        assert_eq!(config.rate_limit_period(), Duration::from_secs(1));
    }

    #[test]
    fn test_rate_limit_enabled_from_empty_env() {
        let config = Config::from_lookup(|_| None);
        assert!(config.rate_limit_enabled);
        assert_eq!(config.host, [127, 0, 0, 1]);
    }
}
