//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FIREBASE_API_KEY` - Web API key of the platform project
//! - `FIREBASE_PROJECT_ID` - Platform project ID
//!
//! ## Optional
//! - `FIREBASE_STORAGE_BUCKET` - Blob store bucket (default: `<project>.appspot.com`)
//! - `FIREBASE_AUTH_DOMAIN` - Hosted auth domain, informational
//! - `FIREBASE_AUTH_URL` - Identity endpoint override (e.g. an emulator)
//! - `FIREBASE_FIRESTORE_URL` - Document store endpoint override
//! - `FIREBASE_STORAGE_URL` - Blob store endpoint override
//! - `APP_ENV` - `development` or `production` (default: production)
//! - `LOG_LEVEL` - Minimum level in development (default: debug)
//! - `LOG_FORMAT` - `json` or `pretty` (default: pretty in development, json otherwise)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_API_BASE_URL` - Public API base URL (default: `http://localhost:3000/api`)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tensura_core::constants::{API_TIMEOUT, api};
use thiserror::Error;

use crate::telemetry::{Environment, LogConfig, LogLevel};

/// Default identity endpoint.
pub const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com";
/// Default document store endpoint.
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com";
/// Default blob store endpoint.
pub const DEFAULT_STORAGE_URL: &str = "https://firebasestorage.googleapis.com";

/// Template prefixes such as `your-api-key` (case-insensitive).
const PLACEHOLDER_PREFIXES: &[&str] = &[
    "your-",
    "your_",
    "enter-",
    "put-your",
    "add-your",
    "insert-",
];

/// Whole values that are placeholders (case-insensitive).
const PLACEHOLDER_VALUES: &[&str] = &[
    "changeme",
    "replace",
    "replaceme",
    "placeholder",
    "todo",
    "fixme",
    "insert",
    "api-key",
    "apikey",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the store API
    pub api_base_url: String,
    /// Logging configuration
    pub logging: LogConfig,
    /// Backend platform connection descriptor
    pub platform: PlatformConfig,
}

/// Backend platform connection descriptor.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct PlatformConfig {
    /// Web API key sent with identity and document store requests
    pub api_key: SecretString,
    /// Project ID
    pub project_id: String,
    /// Blob store bucket name
    pub storage_bucket: String,
    /// Hosted auth domain, if any
    pub auth_domain: Option<String>,
    /// Identity endpoint base URL
    pub auth_url: String,
    /// Document store endpoint base URL
    pub firestore_url: String,
    /// Blob store endpoint base URL
    pub storage_url: String,
    /// Timeout applied to every request
    pub request_timeout: Duration,
}

impl std::fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("api_key", &"[REDACTED]")
            .field("project_id", &self.project_id)
            .field("storage_bucket", &self.storage_bucket)
            .field("auth_domain", &self.auth_domain)
            .field("auth_url", &self.auth_url)
            .field("firestore_url", &self.firestore_url)
            .field("storage_url", &self.storage_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl PlatformConfig {
    /// Descriptor for the hosted platform with default endpoints.
    #[must_use]
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        let project_id = project_id.into();
        Self {
            api_key: SecretString::from(api_key.into()),
            storage_bucket: default_bucket(&project_id),
            project_id,
            auth_domain: None,
            auth_url: DEFAULT_AUTH_URL.to_string(),
            firestore_url: DEFAULT_FIRESTORE_URL.to_string(),
            storage_url: DEFAULT_STORAGE_URL.to_string(),
            request_timeout: API_TIMEOUT,
        }
    }

    /// Point every service at one base URL (emulators, test servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        self.auth_url = base_url.to_string();
        self.firestore_url = base_url.to_string();
        self.storage_url = base_url.to_string();
        self
    }

    /// Use a different blob store bucket.
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.storage_bucket = bucket.into();
        self
    }

    fn from_env() -> Result<Self, ConfigError> {
        let api_key = get_validated_key("FIREBASE_API_KEY")?;
        let project_id = get_required_env("FIREBASE_PROJECT_ID")?;

        let mut config = Self::new(api_key.expose_secret(), project_id);
        if let Some(bucket) = get_optional_env("FIREBASE_STORAGE_BUCKET") {
            config.storage_bucket = bucket;
        }
        config.auth_domain = get_optional_env("FIREBASE_AUTH_DOMAIN");
        config.auth_url = get_env_or_default("FIREBASE_AUTH_URL", DEFAULT_AUTH_URL);
        config.firestore_url = get_env_or_default("FIREBASE_FIRESTORE_URL", DEFAULT_FIRESTORE_URL);
        config.storage_url = get_env_or_default("FIREBASE_STORAGE_URL", DEFAULT_STORAGE_URL);
        Ok(config)
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the API key is an obvious placeholder.
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
        let api_base_url = get_env_or_default("STOREFRONT_API_BASE_URL", api::DEFAULT_BASE_URL);

        let logging = log_config_from_env()?;
        let platform = PlatformConfig::from_env()?;

        Ok(Self {
            host,
            port,
            api_base_url,
            logging,
            platform,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    // Kept for API routes to come.
    /// Absolute URL of a store API endpoint, e.g. `api::PRODUCTS`.
    #[must_use]
    pub fn api_url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.api_base_url.trim_end_matches('/'))
    }
}

fn log_config_from_env() -> Result<LogConfig, ConfigError> {
    let environment = Environment::from_flag(&get_env_or_default("APP_ENV", "production"));
    let mut logging = match environment {
        Environment::Development => LogConfig::development(),
        Environment::Production => LogConfig::production(),
    };

    if let Some(level) = get_optional_env("LOG_LEVEL") {
        logging.min_level = level
            .parse::<LogLevel>()
            .map_err(|e| ConfigError::InvalidEnvVar("LOG_LEVEL".to_string(), e))?;
    }

    if let Some(format) = get_optional_env("LOG_FORMAT") {
        logging.json = match format.to_ascii_lowercase().as_str() {
            "json" => true,
            "pretty" | "text" => false,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "LOG_FORMAT".to_string(),
                    format!("expected json or pretty, got {other}"),
                ));
            }
        };
    }

    logging.sentry_dsn = get_optional_env("SENTRY_DSN");
    Ok(logging)
}

// =============================================================================
// Helper Functions
// =============================================================================

fn default_bucket(project_id: &str) -> String {
    format!("{project_id}.appspot.com")
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Reject keys that are clearly copied from a template.
fn validate_not_placeholder(value: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = value.trim().to_lowercase();

    let placeholder = PLACEHOLDER_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
        || PLACEHOLDER_VALUES.contains(&lower.as_str())
        || (!lower.is_empty() && lower.chars().all(|c| c == 'x'));
    if placeholder {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "appears to be a placeholder".to_string(),
        ));
    }

    Ok(())
}

/// Load an API key from environment and check it is not a placeholder.
fn get_validated_key(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_not_placeholder(&value, key)?;
    Ok(SecretString::from(value))
}
