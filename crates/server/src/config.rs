//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//!
//! ## Optional
//! - `LEDGERBOOK_HOST` - Bind address (default: 127.0.0.1)
//! - `LEDGERBOOK_PORT` - Listen port (default: 3000)
//! - `LEDGERBOOK_NODE_ID` - Identifier-generator node id, 0-1023 (default: 0);
//!   give every replica its own value
//! - `LEDGERBOOK_DUPLICATE_CHECK` - Collapse duplicate create submissions
//!   (default: true)
//! - `LEDGERBOOK_SUBMISSION_TTL_SECS` - How long submission tokens are
//!   remembered (default: 300)
//! - `LEDGERBOOK_SUBMISSION_CAPACITY` - Max tracked submissions (default: 10000)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password).
    pub database_url: SecretString,
    /// Bind address.
    pub host: IpAddr,
    /// Listen port.
    pub port: u16,
    /// Node id embedded into generated record identifiers.
    pub node_id: u16,
    /// Whether duplicate create submissions are collapsed.
    pub duplicate_check_enabled: bool,
    /// Lifetime of a tracked submission token.
    pub submission_ttl: Duration,
    /// Capacity of the submission tracker cache.
    pub submission_capacity: u64,
}

impl ServerConfig {
    /// Load configuration from the environment (and a `.env` file if present).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = SecretString::from(get_required_env("DATABASE_URL")?);
        let host = parse_env_or("LEDGERBOOK_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_env_or("LEDGERBOOK_PORT", 3000)?;
        let node_id = parse_env_or("LEDGERBOOK_NODE_ID", 0)?;
        let duplicate_check_enabled = parse_env_or("LEDGERBOOK_DUPLICATE_CHECK", true)?;
        let submission_ttl =
            Duration::from_secs(parse_env_or("LEDGERBOOK_SUBMISSION_TTL_SECS", 300)?);
        let submission_capacity = parse_env_or("LEDGERBOOK_SUBMISSION_CAPACITY", 10_000)?;

        Ok(Self {
            database_url,
            host,
            port,
            node_id,
            duplicate_check_enabled,
            submission_ttl,
            submission_capacity,
        })
    }

    /// The socket address to bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
