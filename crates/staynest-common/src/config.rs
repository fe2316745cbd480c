//! Application configuration loaded from environment variables and config files.
//!
//! Supports `.env` files for development and environment variables for production.
//! Config precedence: env vars > .env file > config.toml > defaults

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Get the global application configuration.
///
/// # Panics
/// Panics if config has not been initialized via [`init`] or [`init_from`].
pub fn get() -> &'static AppConfig {
    CONFIG
        .get()
        .expect("Config not initialized. Call staynest_common::config::init() first.")
}

/// Initialize the global configuration from environment.
///
/// Should be called once at application startup, before any other code accesses config.
pub fn init() -> Result<&'static AppConfig, ConfigError> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    let cfg = with_defaults()?
        // Optional config file
        .add_source(config::File::with_name("config").required(false))
        // Environment variables (STAYNEST__SERVER__PORT, STAYNEST__DATABASE__URL, etc.)
        .add_source(
            config::Environment::with_prefix("STAYNEST")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = cfg.try_deserialize()?;
    Ok(CONFIG.get_or_init(|| app_config))
}

/// Install an already-built configuration as the global one.
///
/// The first installed config wins; later calls return it unchanged.
pub fn init_from(app_config: AppConfig) -> &'static AppConfig {
    CONFIG.get_or_init(|| app_config)
}

/// Build a configuration from the defaults plus explicit `key = value`
/// overrides, ignoring files and the environment.
pub fn from_overrides(overrides: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let mut builder = with_defaults()?;
    for (key, value) in overrides {
        builder = builder.set_override(*key, *value)?;
    }
    builder.build()?.try_deserialize()
}

fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3001)?
        .set_default("server.client_url", "http://localhost:3000")?
        .set_default("database.max_connections", 20)?
        .set_default("database.min_connections", 2)?
        .set_default("auth.access_token_ttl_secs", 900)? // 15 min
        .set_default("auth.refresh_token_ttl_secs", 2_592_000)? // 30 days
        .set_default("auth.password_reset_ttl_secs", 3600)?
        .set_default("storage.endpoint", "")?
        .set_default("storage.bucket", "staynest")?
        .set_default("storage.access_key", "")?
        .set_default("storage.secret_key", "")?
        .set_default("storage.region", "us-east-1")?
        .set_default("storage.data_dir", "./data/uploads")?
        .set_default("storage.public_url", "")?
        .set_default("mail.smtp_host", "")?
        .set_default("mail.smtp_port", 587)?
        .set_default("mail.username", "")?
        .set_default("mail.password", "")?
        .set_default("mail.from", "StayNest <no-reply@staynest.local>")?
        .set_default("mail.admin_inbox", "")?
        .set_default("stripe.secret_key", "")?
        .set_default("stripe.currency", "usd")?
        .set_default("stripe.api_base", "https://api.stripe.com")?
        .set_default("limits.max_upload_bytes", 10_485_760)? // 10 MiB
        .set_default("limits.max_listing_photos", 20)?
        .set_default("limits.max_page_size", 100)
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub mail: MailConfig,
    pub stripe: StripeConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base URL of the web client. Used in emailed links and as the CORS
    /// origin (`*` allows any origin).
    pub client_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// JWT signing secret (HS256): should be 256+ bits of entropy
    pub jwt_secret: String,
    /// Access token TTL in seconds
    pub access_token_ttl_secs: u64,
    /// Refresh token TTL in seconds
    pub refresh_token_ttl_secs: u64,
    /// Lifetime of an emailed password-reset link
    pub password_reset_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// S3 endpoint URL (e.g., http://localhost:9000 for MinIO).
    /// Leave empty to keep media on local disk under `data_dir`.
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    /// Local directory for media in local mode (default: ./data/uploads).
    pub data_dir: String,
    /// Public base URL prepended to stored media keys. Empty means
    /// server-relative paths (`/uploads/...`).
    pub public_url: String,
}

impl StorageConfig {
    pub fn is_local(&self) -> bool {
        self.endpoint.trim().is_empty()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    /// SMTP relay host. Empty switches the mailer to log-only mode.
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    /// `From:` mailbox, e.g. `StayNest <no-reply@example.com>`
    pub from: String,
    /// Where contact-form notifications go. Empty disables them.
    pub admin_inbox: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StripeConfig {
    /// Secret API key. Empty disables the payment endpoints.
    pub secret_key: String,
    pub currency: String,
    pub api_base: String,
}

impl StripeConfig {
    pub fn is_enabled(&self) -> bool {
        !self.secret_key.trim().is_empty()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    pub max_upload_bytes: usize,
    pub max_listing_photos: usize,
    pub max_page_size: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [(&str, &str); 2] = [
        ("database.url", "postgres://localhost/staynest"),
        ("auth.jwt_secret", "test-secret"),
    ];

    #[test]
    fn defaults_fill_optional_sections() {
        let cfg = from_overrides(&REQUIRED).expect("defaults should deserialize");
        assert_eq!(cfg.server.port, 3001);
        assert_eq!(cfg.auth.password_reset_ttl_secs, 3600);
        assert!(cfg.storage.is_local());
        assert!(!cfg.stripe.is_enabled());
        assert_eq!(cfg.limits.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn missing_secret_is_rejected() {
        let result = from_overrides(&[("database.url", "postgres://localhost/staynest")]);
        assert!(result.is_err());
    }

    #[test]
    fn overrides_take_precedence() {
        let cfg = from_overrides(&[
            REQUIRED[0],
            REQUIRED[1],
            ("stripe.secret_key", "sk_test_123"),
            ("storage.endpoint", "http://minio:9000"),
        ])
        .unwrap();
        assert!(cfg.stripe.is_enabled());
        assert!(!cfg.storage.is_local());
    }
}
