//! Catalog service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CATALOG_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ORDERCLOUD_API_URL` - Catalog, pricing and auth API base URL
//! - `SELLER_CENTER_URL` - Seller-center middleware base URL (V2 products)
//! - `ORDERCLOUD_CLIENT_ID` - OAuth client ID
//! - `ORDERCLOUD_CLIENT_SECRET` - OAuth client secret (high entropy)
//! - `ORDERCLOUD_USERNAME` - API user for the password grant
//! - `ORDERCLOUD_PASSWORD` - API user password
//! - `ORDERCLOUD_TOKEN_REFRESH_MINUTES` - Access token refresh interval
//!
//! ## Optional
//! - `CATALOG_HOST` - Bind address (default: 127.0.0.1)
//! - `CATALOG_PORT` - Listen port (default: 3000)
//! - `CATALOG_DEFAULT_CATALOG_ID` - Catalog used when a request names none (default: zp-my)
//! - `CATALOG_DEFAULT_DEPTH` - Category tree depth (default: all)
//! - `CATALOG_CATEGORY_PAGE_SIZE` - Categories fetched per request (default: 50)
//! - `CACHE_MAX_COST_BYTES` - In-process cache budget (default: 500 MiB)
//! - `TRENDING_REFRESH_MINUTES` - Trending refresh interval (default: 60)
//! - `TRENDING_LIMIT` - Number of trending products kept (default: 10)
//! - `TRENDING_CACHE_TTL_SECS` - TTL of the trending entry (default: none)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
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

/// Catalog service configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Upstream catalog API configuration
    pub ordercloud: OrderCloudConfig,
    /// Defaults applied to catalog requests
    pub catalog: CatalogDefaults,
    /// In-process cache budget in bytes
    pub cache_max_cost_bytes: u64,
    /// Trending refresher configuration
    pub trending: TrendingConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Upstream catalog API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct OrderCloudConfig {
    /// Catalog/pricing/auth base URL, without trailing slash
    pub api_url: String,
    /// Seller-center middleware base URL, without trailing slash
    pub seller_center_url: String,
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: SecretString,
    /// API user for the password grant
    pub username: String,
    /// API user password
    pub password: SecretString,
    /// How often the access token is refreshed
    pub token_refresh_interval: Duration,
}

impl std::fmt::Debug for OrderCloudConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderCloudConfig")
            .field("api_url", &self.api_url)
            .field("seller_center_url", &self.seller_center_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("token_refresh_interval", &self.token_refresh_interval)
            .finish()
    }
}

/// Defaults applied to catalog requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogDefaults {
    /// Catalog used when a request names none
    pub catalog_id: String,
    /// Category tree depth requested upstream
    pub depth: String,
    /// Number of categories fetched per request
    pub category_page_size: u32,
}

impl Default for CatalogDefaults {
    fn default() -> Self {
        Self {
            catalog_id: "zp-my".to_string(),
            depth: "all".to_string(),
            category_page_size: 50,
        }
    }
}

/// Trending refresher configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendingConfig {
    /// Interval between refreshes
    pub refresh_interval: Duration,
    /// Number of products kept in the cached list
    pub limit: i64,
    /// TTL of the cached list (`None` keeps it until overwritten)
    pub cache_ttl: Option<Duration>,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(60 * 60),
            limit: 10,
            cache_ttl: None,
        }
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("CATALOG_DATABASE_URL")?;
        let host: IpAddr = parse_env_or_default("CATALOG_HOST", "127.0.0.1")?;
        let port: u16 = parse_env_or_default("CATALOG_PORT", "3000")?;

        let ordercloud = OrderCloudConfig::from_env()?;
        let catalog = CatalogDefaults::from_env()?;
        let cache_max_cost_bytes = parse_env_or_default("CACHE_MAX_COST_BYTES", "524288000")?;
        let trending = TrendingConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            ordercloud,
            catalog,
            cache_max_cost_bytes,
            trending,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl OrderCloudConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let refresh_minutes: u64 = parse_required_env("ORDERCLOUD_TOKEN_REFRESH_MINUTES")?;

        Ok(Self {
            api_url: get_base_url("ORDERCLOUD_API_URL")?,
            seller_center_url: get_base_url("SELLER_CENTER_URL")?,
            client_id: get_required_env("ORDERCLOUD_CLIENT_ID")?,
            client_secret: get_validated_secret("ORDERCLOUD_CLIENT_SECRET")?,
            username: get_required_env("ORDERCLOUD_USERNAME")?,
            password: get_required_secret("ORDERCLOUD_PASSWORD")?,
            token_refresh_interval: minutes(refresh_minutes, "ORDERCLOUD_TOKEN_REFRESH_MINUTES")?,
        })
    }
}

impl CatalogDefaults {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            catalog_id: get_env_or_default("CATALOG_DEFAULT_CATALOG_ID", &defaults.catalog_id),
            depth: get_env_or_default("CATALOG_DEFAULT_DEPTH", &defaults.depth),
            category_page_size: parse_env_or_default("CATALOG_CATEGORY_PAGE_SIZE", "50")?,
        })
    }
}

impl TrendingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let refresh_minutes: u64 = parse_env_or_default("TRENDING_REFRESH_MINUTES", "60")?;
        let cache_ttl = get_optional_env("TRENDING_CACHE_TTL_SECS")
            .map(|raw| parse_value::<u64>("TRENDING_CACHE_TTL_SECS", &raw))
            .transpose()?
            .map(Duration::from_secs);

        Ok(Self {
            refresh_interval: minutes(refresh_minutes, "TRENDING_REFRESH_MINUTES")?,
            limit: parse_env_or_default("TRENDING_LIMIT", "10")?,
            cache_ttl,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_required_env<T>(key: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    parse_value(key, &get_required_env(key)?)
}

fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

/// Convert a positive number of minutes to a `Duration`.
fn minutes(value: u64, key: &str) -> Result<Duration, ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(value.saturating_mul(60)))
}

/// Load an absolute http(s) base URL, normalized without a trailing slash.
fn get_base_url(key: &str) -> Result<String, ConfigError> {
    let raw = get_required_env(key)?;
    normalize_base_url(key, &raw)
}

fn normalize_base_url(key: &str, raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(raw.trim_end_matches('/').to_string())
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

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
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
