//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `SHOPWARE_STORE_DOMAIN` - Shopware instance URL (e.g., `https://demo.shopware.store`)
//! - `SHOPWARE_ACCESS_TOKEN` - Sales channel access key (`sw-access-key`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SITE_NAME` - Site name used in page titles (default: Shopware Storefront)
//! - `SHOPWARE_API_TYPE` - API path segment (default: store-api)
//! - `SHOPWARE_USE_SEO_URLS` - Resolve handles through SEO urls (default: true)
//! - `SHOPWARE_CURRENCY` - Currency for view model prices (default: EUR)
//! - `SHOPWARE_REQUEST_TIMEOUT_SECS` - Store API request timeout (default: 10)
//! - `STOREFRONT_CHECKOUT_URL` - Checkout redirect target (default: base URL)
//! - `STOREFRONT_CACHE_TTL_SECS` - Catalog cache TTL (default: 300)
//! - `HOME_FEATURED_COLLECTION` - Category handle for the home page grid
//! - `HOME_CAROUSEL_COLLECTION` - Category handle for the home page carousel
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)
//! - `LOG_FORMAT` - `json` for structured logs, read by the binary

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use shopware_storefront_core::CurrencyCode;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront (no trailing slash)
    pub base_url: String,
    /// Site name for page titles
    pub site_name: String,
    /// Where `/checkout` sends the shopper
    pub checkout_url: String,
    /// Shopware Store API configuration
    pub shopware: ShopwareConfig,
    /// Home page content configuration
    pub home: HomeConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., production, staging)
    pub sentry_environment: Option<String>,
    /// Error event sample rate (0.0 - 1.0)
    pub sentry_sample_rate: f32,
    /// Performance transaction sample rate (0.0 - 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Shopware Store API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopwareConfig {
    /// Shopware instance URL without trailing slash
    pub store_domain: String,
    /// API path segment (`store-api`)
    pub api_type: String,
    /// Sales channel access key
    pub access_token: SecretString,
    /// Whether handles are SEO paths (true) or raw entity ids (false)
    pub use_seo_urls: bool,
    /// Currency used for view model prices
    pub currency: CurrencyCode,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Catalog cache time-to-live
    pub cache_ttl: Duration,
}

impl std::fmt::Debug for ShopwareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopwareConfig")
            .field("store_domain", &self.store_domain)
            .field("api_type", &self.api_type)
            .field("access_token", &"[REDACTED]")
            .field("use_seo_urls", &self.use_seo_urls)
            .field("currency", &self.currency)
            .field("request_timeout", &self.request_timeout)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

/// Category handles rendered on the home page.
#[derive(Debug, Clone)]
pub struct HomeConfig {
    /// Category whose first three products fill the featured grid
    pub featured_collection: String,
    /// Category whose products fill the carousel
    pub carousel_collection: String,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            featured_collection: "Home".to_string(),
            carousel_collection: "Products".to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the access token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_url("STOREFRONT_BASE_URL")?;
        let checkout_url =
            get_optional_env("STOREFRONT_CHECKOUT_URL").unwrap_or_else(|| base_url.clone());

        let shopware = ShopwareConfig::from_env()?;
        let home = HomeConfig::from_env();

        Ok(Self {
            host,
            port,
            base_url,
            site_name: get_env_or_default("SITE_NAME", "Shopware Storefront"),
            checkout_url,
            shopware,
            home,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_parsed_or_default("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_parsed_or_default("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl ShopwareConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            store_domain: get_url("SHOPWARE_STORE_DOMAIN")?,
            api_type: get_env_or_default("SHOPWARE_API_TYPE", "store-api")
                .trim_matches('/')
                .to_string(),
            access_token: get_validated_secret("SHOPWARE_ACCESS_TOKEN")?,
            use_seo_urls: parse_bool(
                "SHOPWARE_USE_SEO_URLS",
                &get_env_or_default("SHOPWARE_USE_SEO_URLS", "true"),
            )?,
            currency: get_env_or_default("SHOPWARE_CURRENCY", "EUR")
                .parse()
                .map_err(|e: shopware_storefront_core::UnknownValue| {
                    ConfigError::InvalidEnvVar("SHOPWARE_CURRENCY".to_string(), e.to_string())
                })?,
            request_timeout: Duration::from_secs(get_parsed_or_default(
                "SHOPWARE_REQUEST_TIMEOUT_SECS",
                10,
            )?),
            cache_ttl: Duration::from_secs(get_parsed_or_default(
                "STOREFRONT_CACHE_TTL_SECS",
                300,
            )?),
        })
    }

    /// Base URL for Store API requests, e.g. `https://shop.example/store-api`.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.store_domain, self.api_type)
    }
}

impl HomeConfig {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            featured_collection: get_optional_env("HOME_FEATURED_COLLECTION")
                .unwrap_or(defaults.featured_collection),
            carousel_collection: get_optional_env("HOME_CAROUSEL_COLLECTION")
                .unwrap_or(defaults.carousel_collection),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required absolute http(s) URL, normalized without trailing slash.
fn get_url(key: &str) -> Result<String, ConfigError> {
    let value = get_required_env(key)?;
    normalize_url(&value).map_err(|reason| ConfigError::InvalidEnvVar(key.to_string(), reason))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional environment variable, using `default` when unset.
fn get_parsed_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

fn normalize_url(value: &str) -> Result<String, String> {
    let url = Url::parse(value.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("URL must have a host".to_string());
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Sales channel access keys are random uppercase strings
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the access key from the sales channel."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
