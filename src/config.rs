//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `SHOP_BACKEND` - `postgres` (default) or `records`
//! - `DATABASE_URL` - `PostgreSQL` connection string (required for `postgres`)
//! - `RECORDS_PATH` - RocksDB directory for the `records` backend (needs the
//!   `storage-rocksdb` feature; documents stay in memory otherwise)
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8083)
//! - `PUBLIC_BASE_URL` - Public URL used for payment return links
//! - `SHOP_CURRENCY` - ISO 4217 currency sent to the payment provider (default: ARS)
//! - `MERCADOPAGO_ACCESS_TOKEN` - Payment provider token (the settings row may override it)
//! - `MERCADOPAGO_API_URL` - Payment provider base URL
//! - `MERCADOPAGO_SANDBOX` - Use sandbox checkout links (default: false)
//! - `WEBHOOK_TIMEOUT_SECS` - Outbound webhook timeout (default: 10)
//! - `NATS_URL` - Optional event bus

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_MERCADOPAGO_API_URL: &str = "https://api.mercadopago.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which persistence backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Postgres,
    Records,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "records" | "record" => Ok(Self::Records),
            other => Err(format!("unknown backend {other:?}, expected postgres or records")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShopConfig {
    pub backend: BackendKind,
    /// Present whenever `backend` is `Postgres`.
    pub database_url: Option<SecretString>,
    pub records_path: Option<PathBuf>,
    pub host: IpAddr,
    pub port: u16,
    pub public_base_url: String,
    pub currency: String,
    pub payments: PaymentConfig,
    pub webhook_timeout: Duration,
    pub nats_url: Option<String>,
}

/// Payment provider settings.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub access_token: Option<SecretString>,
    pub api_url: String,
    pub sandbox: bool,
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let backend = parse_env("SHOP_BACKEND", "postgres")?;
        let database_url = get_optional_env("DATABASE_URL").map(SecretString::from);
        if backend == BackendKind::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
        }

        let port: u16 = parse_env("PORT", "8083")?;
        let public_base_url = get_env_or_default("PUBLIC_BASE_URL", &format!("http://localhost:{port}"));

        Ok(Self {
            backend,
            database_url,
            records_path: get_optional_env("RECORDS_PATH").map(PathBuf::from),
            host: parse_env("HOST", "0.0.0.0")?,
            port,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            currency: get_env_or_default("SHOP_CURRENCY", "ARS").to_uppercase(),
            payments: PaymentConfig {
                access_token: get_optional_env("MERCADOPAGO_ACCESS_TOKEN").map(SecretString::from),
                api_url: get_env_or_default("MERCADOPAGO_API_URL", DEFAULT_MERCADOPAGO_API_URL),
                sandbox: parse_env("MERCADOPAGO_SANDBOX", "false")?,
            },
            webhook_timeout: Duration::from_secs(parse_env("WEBHOOK_TIMEOUT_SECS", "10")?),
            nats_url: get_optional_env("NATS_URL"),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr { SocketAddr::new(self.host, self.port) }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
