//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ## Configuration Methods
//!
//! ### Method 1: Full Redis URL (simpler for local development)
//!
//! ```bash
//! export REDIS_URL="redis://localhost:6379/0"
//! ```
//!
//! ### Method 2: Individual components (recommended for production)
//!
//! ```bash
//! export REDIS_HOST="localhost"
//! export REDIS_PORT="6379"
//! export REDIS_PASSWORD=""
//! export REDIS_DB="0"
//! ```
//!
//! If neither is set, caching is disabled and the service falls back to a
//! no-op cache.
//!
//! ## Required Variables
//!
//! - `SECRET_KEY` - HMAC key used to fingerprint provider API keys
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:8000`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `FOURSQUARE_API_KEY` / `YELP_API_KEY` / `GOOGLE_PLACES_API_KEY` -
//!   provider credentials; a source is only registered when its key is set
//! - `USE_MOCK_DATA` - when `true` (default), paid upstream calls are
//!   blocked and only the mock source serves data
//! - `DEFAULT_LOCATION` - fallback search location (default: `New York`)
//! - `MAX_REQUESTS_PER_DAY` - per-provider daily request cap (default: 50)
//! - `MAX_TOTAL_COST` - hard spend ceiling in USD (default: 5.00)
//! - `BUDGET_FILE` - usage ledger path (default: `data/api_budget.json`)
//! - `CACHE_TTL_SECONDS` - default Redis TTL (default: 3600)
//! - `UPSTREAM_RPM` - outbound requests/minute per provider (default: 10)

use anyhow::{Context, Result};
use std::env;

use crate::utils::secrets::mask_string;

/// Placeholder credential values shipped in `.env.example`; treated the
/// same as an unset variable.
const KEY_PLACEHOLDER_PREFIX: &str = "your-";

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,
    /// When true, rate limiting reads client IP from X-Forwarded-For / X-Real-IP headers.
    /// Enable only when the service is behind a trusted reverse proxy.
    pub behind_proxy: bool,

    pub redis_url: Option<String>,
    /// Default TTL (seconds) for cached upstream responses in Redis.
    /// Has no effect when Redis is not configured.
    pub cache_ttl_seconds: u64,

    pub foursquare_api_key: Option<String>,
    pub yelp_api_key: Option<String>,
    pub google_places_api_key: Option<String>,

    /// When true, every paid upstream call is refused and the mock source
    /// answers all requests.
    pub use_mock_data: bool,
    pub default_location: String,

    /// Per-provider daily request cap applied when no built-in limit exists.
    pub max_requests_per_day: u32,
    /// Hard spend ceiling in USD across all providers.
    pub max_total_cost: f64,
    /// Path of the JSON usage ledger.
    pub budget_file: String,

    /// Outbound requests per minute allowed against each provider.
    pub upstream_rpm: u32,

    /// HMAC signing key for API-key fingerprints. Must be non-empty.
    pub secret_key: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `SECRET_KEY` is missing.
    pub fn from_env() -> Result<Self> {
        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        let behind_proxy = env::var("BEHIND_PROXY")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        let redis_url = Self::load_redis_url();

        let cache_ttl_seconds = env::var("CACHE_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);

        let foursquare_api_key = Self::load_api_key("FOURSQUARE_API_KEY");
        let yelp_api_key = Self::load_api_key("YELP_API_KEY");
        let google_places_api_key = Self::load_api_key("GOOGLE_PLACES_API_KEY");

        let use_mock_data = env::var("USE_MOCK_DATA")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(true);

        let default_location =
            env::var("DEFAULT_LOCATION").unwrap_or_else(|_| "New York".to_string());

        let max_requests_per_day = env::var("MAX_REQUESTS_PER_DAY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(50);

        let max_total_cost = env::var("MAX_TOTAL_COST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5.0);

        let budget_file =
            env::var("BUDGET_FILE").unwrap_or_else(|_| "data/api_budget.json".to_string());

        let upstream_rpm = env::var("UPSTREAM_RPM")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let secret_key = env::var("SECRET_KEY").context("SECRET_KEY must be set")?;

        Ok(Self {
            listen_addr,
            log_level,
            log_format,
            behind_proxy,
            redis_url,
            cache_ttl_seconds,
            foursquare_api_key,
            yelp_api_key,
            google_places_api_key,
            use_mock_data,
            default_location,
            max_requests_per_day,
            max_total_cost,
            budget_file,
            upstream_rpm,
            secret_key,
        })
    }

    /// Loads a provider API key, treating placeholder values from the
    /// `.env` template as unset.
    fn load_api_key(var: &str) -> Option<String> {
        let value = env::var(var).ok()?;
        if value.is_empty() || value.starts_with(KEY_PLACEHOLDER_PREFIX) {
            return None;
        }
        Some(value)
    }

    /// Loads Redis URL with fallback to component-based configuration.
    ///
    /// Priority:
    /// 1. `REDIS_URL` environment variable
    /// 2. Constructed from `REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`, `REDIS_DB`
    ///
    /// Returns `None` if Redis is not configured.
    fn load_redis_url() -> Option<String> {
        if let Ok(url) = env::var("REDIS_URL") {
            return Some(url);
        }

        let host = env::var("REDIS_HOST").ok()?;
        let port = env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string());
        let password = env::var("REDIS_PASSWORD").ok();
        let db = env::var("REDIS_DB").unwrap_or_else(|_| "0".to_string());

        let url = if let Some(pwd) = password {
            // Empty password means no authentication
            if pwd.is_empty() {
                format!("redis://{}:{}/{}", host, port, db)
            } else {
                format!("redis://:{}@{}:{}/{}", pwd, host, port, db)
            }
        } else {
            format!("redis://{}:{}/{}", host, port, db)
        };

        Some(url)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` is invalid
    /// - Redis URL has an unknown scheme
    /// - Any budget or throttle knob is outside its allowed range
    pub fn validate(&self) -> Result<()> {
        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if let Some(ref redis_url) = self.redis_url
            && !redis_url.starts_with("redis://")
            && !redis_url.starts_with("rediss://")
        {
            anyhow::bail!(
                "REDIS_URL must start with 'redis://' or 'rediss://', got '{}'",
                redis_url
            );
        }

        if self.cache_ttl_seconds == 0 {
            anyhow::bail!("CACHE_TTL_SECONDS must be greater than 0");
        }

        if self.max_requests_per_day == 0 {
            anyhow::bail!("MAX_REQUESTS_PER_DAY must be at least 1");
        }

        if self.max_total_cost <= 0.0 {
            anyhow::bail!(
                "MAX_TOTAL_COST must be positive, got {}",
                self.max_total_cost
            );
        }

        if self.upstream_rpm == 0 || self.upstream_rpm > 600 {
            anyhow::bail!(
                "UPSTREAM_RPM must be between 1 and 600, got {}",
                self.upstream_rpm
            );
        }

        if self.secret_key.is_empty() {
            anyhow::bail!("SECRET_KEY must not be empty");
        }

        Ok(())
    }

    /// Returns whether Redis caching is enabled.
    pub fn is_cache_enabled(&self) -> bool {
        self.redis_url.is_some()
    }

    /// Returns whether any real (non-mock) provider credential is set.
    pub fn has_real_sources(&self) -> bool {
        self.foursquare_api_key.is_some()
            || self.yelp_api_key.is_some()
            || self.google_places_api_key.is_some()
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);

        if let Some(ref redis_url) = self.redis_url {
            tracing::info!("  Redis: {} (enabled)", mask_connection_string(redis_url));
        } else {
            tracing::info!("  Redis: disabled");
        }

        for (name, key) in [
            ("Foursquare", &self.foursquare_api_key),
            ("Yelp", &self.yelp_api_key),
            ("Google Places", &self.google_places_api_key),
        ] {
            match key {
                Some(k) => tracing::info!("  {} key: {}", name, mask_string(k, 4)),
                None => tracing::info!("  {} key: not configured", name),
            }
        }

        tracing::info!("  Mock data mode: {}", self.use_mock_data);
        tracing::info!("  Default location: {}", self.default_location);
        tracing::info!(
            "  Budget: {} req/day, ${:.2} total cap, ledger {}",
            self.max_requests_per_day,
            self.max_total_cost,
            self.budget_file
        );
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

/// Masks sensitive information in connection strings for logging.
///
/// Replaces password with `***` in URLs like:
/// - `redis://:password@host:port/db` → `redis://:***@host:port/db`
fn mask_connection_string(url: &str) -> String {
    if let Some(start) = url.find("://") {
        let scheme_end = start + 3;
        let rest = &url[scheme_end..];

        if let Some(at_pos) = rest.find('@') {
            let credentials = &rest[..at_pos];
            let host_part = &rest[at_pos..];

            if let Some(colon_pos) = credentials.rfind(':') {
                let username = &credentials[..colon_pos];
                return format!("{}://{}:***{}", &url[..start], username, host_part);
            }
        }
    }

    url.to_string()
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if required variables are missing or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn base_config() -> Config {
        Config {
            listen_addr: "0.0.0.0:8000".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            behind_proxy: false,
            redis_url: None,
            cache_ttl_seconds: 3600,
            foursquare_api_key: None,
            yelp_api_key: None,
            google_places_api_key: None,
            use_mock_data: true,
            default_location: "New York".to_string(),
            max_requests_per_day: 50,
            max_total_cost: 5.0,
            budget_file: "data/api_budget.json".to_string(),
            upstream_rpm: 10,
            secret_key: "test-secret".to_string(),
        }
    }

    #[test]
    fn test_mask_connection_string() {
        assert_eq!(
            mask_connection_string("redis://:password@localhost:6379/0"),
            "redis://:***@localhost:6379/0"
        );

        assert_eq!(
            mask_connection_string("redis://localhost:6379/0"),
            "redis://localhost:6379/0"
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config = base_config();
        assert!(config.validate().is_ok());

        config.log_format = "invalid".to_string();
        assert!(config.validate().is_err());

        config.log_format = "json".to_string();
        assert!(config.validate().is_ok());

        config.listen_addr = "8000".to_string();
        assert!(config.validate().is_err());

        config.listen_addr = "0.0.0.0:8000".to_string();

        config.redis_url = Some("http://localhost".to_string());
        assert!(config.validate().is_err());

        config.redis_url = Some("redis://localhost:6379/0".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_budget_knob_validation() {
        let mut config = base_config();

        config.max_requests_per_day = 0;
        assert!(config.validate().is_err());

        config.max_requests_per_day = 50;
        config.max_total_cost = 0.0;
        assert!(config.validate().is_err());

        config.max_total_cost = 5.0;
        config.upstream_rpm = 0;
        assert!(config.validate().is_err());

        config.upstream_rpm = 601;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_has_real_sources() {
        let mut config = base_config();
        assert!(!config.has_real_sources());

        config.yelp_api_key = Some("key".to_string());
        assert!(config.has_real_sources());
    }

    #[test]
    #[serial]
    fn test_load_api_key_rejects_placeholder() {
        // SAFETY: Tests are run serially due to #[serial], so no concurrent access
        unsafe {
            env::set_var("FOURSQUARE_API_KEY", "your-foursquare-api-key-here");
        }

        assert!(Config::load_api_key("FOURSQUARE_API_KEY").is_none());

        unsafe {
            env::set_var("FOURSQUARE_API_KEY", "fsq3-real-key");
        }

        assert_eq!(
            Config::load_api_key("FOURSQUARE_API_KEY").as_deref(),
            Some("fsq3-real-key")
        );

        unsafe {
            env::remove_var("FOURSQUARE_API_KEY");
        }
    }

    #[test]
    #[serial]
    fn test_load_redis_url_from_components() {
        // SAFETY: Tests are run serially due to #[serial], so no concurrent access
        unsafe {
            env::set_var("REDIS_HOST", "redis-host");
            env::set_var("REDIS_PORT", "6380");
            env::set_var("REDIS_DB", "1");
        }

        let url = Config::load_redis_url().unwrap();
        assert_eq!(url, "redis://redis-host:6380/1");

        unsafe {
            env::set_var("REDIS_PASSWORD", "secret");
        }
        let url = Config::load_redis_url().unwrap();
        assert_eq!(url, "redis://:secret@redis-host:6380/1");

        unsafe {
            env::set_var("REDIS_PASSWORD", "");
        }
        let url = Config::load_redis_url().unwrap();
        assert_eq!(url, "redis://redis-host:6380/1");

        unsafe {
            env::remove_var("REDIS_HOST");
            env::remove_var("REDIS_PORT");
            env::remove_var("REDIS_DB");
            env::remove_var("REDIS_PASSWORD");
        }
    }

    #[test]
    #[serial]
    fn test_redis_url_priority() {
        // SAFETY: Tests are run serially
        unsafe {
            env::set_var("REDIS_URL", "redis://from-url:6379/0");
            env::set_var("REDIS_HOST", "from-components");
        }

        let url = Config::load_redis_url().unwrap();

        assert!(url.contains("from-url"));
        assert!(!url.contains("from-components"));

        unsafe {
            env::remove_var("REDIS_URL");
            env::remove_var("REDIS_HOST");
        }
    }
}
