//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (`https` enables secure cookies)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `CART_STORAGE` - `file` or `memory` (default: file)
//! - `CART_DATA_DIR` - Directory for file storage (default: data/carts)
//! - `CART_CACHE_CAPACITY` - Carts kept hydrated in memory (default: 10000)
//! - `CART_IDLE_SECONDS` - Evict hydrated carts idle this long (default: 3600)
//! - `CART_CURRENCY` - Currency used to format totals (default: KES)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use campus_market_core::CurrencyCode;
use thiserror::Error;
use url::Url;

/// Default directory for file-backed cart storage.
pub const DEFAULT_CART_DATA_DIR: &str = "data/carts";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where session carts are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartStorageConfig {
    /// Process memory; carts are lost on restart.
    Memory,
    /// One JSON file per cart under this directory.
    File(PathBuf),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Cart persistence backend
    pub cart_storage: CartStorageConfig,
    /// Maximum number of carts kept hydrated
    pub cart_cache_capacity: u64,
    /// Idle time after which a hydrated cart is evicted
    pub cart_idle_timeout: Duration,
    /// Currency used to format totals
    pub currency: CurrencyCode,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. production, staging)
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env.parsed_or("STOREFRONT_HOST", "127.0.0.1")?;
        let port = env.parsed_or("STOREFRONT_PORT", "3000")?;
        let base_url = env.parsed::<Url>("STOREFRONT_BASE_URL")?;

        let cart_storage = match env.or_default("CART_STORAGE", "file").as_str() {
            "memory" => CartStorageConfig::Memory,
            "file" => CartStorageConfig::File(PathBuf::from(
                env.or_default("CART_DATA_DIR", DEFAULT_CART_DATA_DIR),
            )),
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "CART_STORAGE".to_string(),
                    format!("expected 'file' or 'memory', got '{other}'"),
                ));
            }
        };

        let cart_cache_capacity = env.parsed_or("CART_CACHE_CAPACITY", "10000")?;
        let cart_idle_timeout = Duration::from_secs(env.parsed_or("CART_IDLE_SECONDS", "3600")?);
        let currency = env.parsed_or("CART_CURRENCY", "KES")?;

        Ok(Self {
            host,
            port,
            base_url,
            cart_storage,
            cart_cache_capacity,
            cart_idle_timeout,
            currency,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS (secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with typed accessors.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable; blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        parse_value(key, &self.required(key)?)
    }

    fn parsed_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        parse_value(key, &self.or_default(key, default))
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("STOREFRONT_BASE_URL", "http://localhost:3000")]).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(
            config.cart_storage,
            CartStorageConfig::File(PathBuf::from(DEFAULT_CART_DATA_DIR))
        );
        assert_eq!(config.cart_cache_capacity, 10_000);
        assert_eq!(config.cart_idle_timeout, Duration::from_secs(3600));
        assert_eq!(config.currency, CurrencyCode::KES);
        assert!(config.sentry_dsn.is_none());
        assert!(!config.is_secure());
    }

    #[test]
    fn test_missing_base_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "STOREFRONT_BASE_URL"));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = load(&[("STOREFRONT_BASE_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "STOREFRONT_BASE_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[
            ("STOREFRONT_BASE_URL", "http://localhost"),
            ("STOREFRONT_PORT", "seventy"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_memory_storage_and_overrides() {
        let config = load(&[
            ("STOREFRONT_BASE_URL", "https://market.example.ac.ke"),
            ("STOREFRONT_HOST", "0.0.0.0"),
            ("STOREFRONT_PORT", "8080"),
            ("CART_STORAGE", "memory"),
            ("CART_IDLE_SECONDS", "60"),
            ("CART_CURRENCY", "usd"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.cart_storage, CartStorageConfig::Memory);
        assert_eq!(config.cart_idle_timeout, Duration::from_secs(60));
        assert_eq!(config.currency, CurrencyCode::USD);
        assert!(config.is_secure());
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_custom_data_dir() {
        let config = load(&[
            ("STOREFRONT_BASE_URL", "http://localhost"),
            ("CART_DATA_DIR", "/var/lib/campus-market/carts"),
        ])
        .unwrap();
        assert_eq!(
            config.cart_storage,
            CartStorageConfig::File(PathBuf::from("/var/lib/campus-market/carts"))
        );
    }

    #[test]
    fn test_unknown_storage_backend() {
        let err = load(&[
            ("STOREFRONT_BASE_URL", "http://localhost"),
            ("CART_STORAGE", "redis"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "CART_STORAGE"));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = load(&[
            ("STOREFRONT_BASE_URL", "http://localhost"),
            ("STOREFRONT_PORT", "  "),
        ])
        .unwrap();
        assert_eq!(config.port, 3000);
    }
}
