//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use chrono::Duration;
use flashdeck::{auth::DEFAULT_TOKEN_TTL_MINUTES, AuthConfig, DatabaseConfig};
use std::net::SocketAddr;

/// Default listen address
pub const DEFAULT_BIND: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
    8000,
);

/// Default database when neither `--db-url` nor `DATABASE_URL` is given
pub const DEFAULT_DATABASE_URL: &str = "postgres://postgres@localhost/flashdeck";

const MIN_JWT_SECRET_LEN: usize = 32;
const MIN_PEPPER_LEN: usize = 16;
/// One year
const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Keep all data in process memory instead of PostgreSQL
    pub in_memory: bool,
    /// Security configuration
    pub security: SecurityConfig,
    /// Prometheus scrape endpoint, disabled when unset
    pub metrics_bind: Option<SocketAddr>,
}

/// Security-related configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
    /// Password hashing pepper (required)
    pub password_pepper: String,
    /// Access token lifetime in minutes
    pub token_ttl_minutes: i64,
}

impl SecurityConfig {
    /// Authenticator settings derived from this configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the token lifetime is not a representable duration
    pub fn auth_config(&self) -> Result<AuthConfig, ConfigError> {
        let token_ttl =
            Duration::try_minutes(self.token_ttl_minutes).ok_or_else(|| ConfigError::Invalid {
                var: "TOKEN_TTL_MINUTES".to_string(),
                reason: "Out of range".to_string(),
            })?;
        Ok(AuthConfig::new(self.jwt_secret.clone(), self.password_pepper.clone())
            .with_token_ttl(token_ttl))
    }
}

/// Command-line values that take precedence over the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<SocketAddr>,
    pub database_url: Option<String>,
    pub in_memory: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok(), overrides)
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_vars<F>(vars: F, overrides: Overrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = match overrides.bind {
            Some(bind) => bind,
            None => parse_opt(&vars, "SERVER_BIND")?.unwrap_or(DEFAULT_BIND),
        };

        let database_url = overrides
            .database_url
            .or_else(|| vars("DATABASE_URL"))
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let database = DatabaseConfig {
            database_url,
            max_connections: parse_or(&vars, "DB_MAX_CONNECTIONS", 20)?,
            min_connections: parse_or(&vars, "DB_MIN_CONNECTIONS", 1)?,
            connection_timeout_secs: parse_or(&vars, "DB_CONNECTION_TIMEOUT_SECS", 10)?,
            idle_timeout_secs: parse_or(&vars, "DB_IDLE_TIMEOUT_SECS", 600)?,
            max_lifetime_secs: parse_or(&vars, "DB_MAX_LIFETIME_SECS", 1800)?,
        };

        // Security configuration (REQUIRED)
        let jwt_secret = vars("JWT_SECRET").ok_or_else(|| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        let password_pepper =
            vars("PASSWORD_PEPPER").ok_or_else(|| ConfigError::MissingRequired {
                var: "PASSWORD_PEPPER".to_string(),
                hint: "Generate with: openssl rand -hex 16".to_string(),
            })?;

        let security = SecurityConfig {
            jwt_secret,
            password_pepper,
            token_ttl_minutes: parse_or(&vars, "TOKEN_TTL_MINUTES", DEFAULT_TOKEN_TTL_MINUTES)?,
        };

        let config = ServerConfig {
            bind,
            database,
            in_memory: overrides.in_memory,
            security,
            metrics_bind: parse_opt(&vars, "METRICS_BIND")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: format!("Must be at least {MIN_JWT_SECRET_LEN} characters"),
            });
        }

        if self.security.password_pepper.len() < MIN_PEPPER_LEN {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_PEPPER".to_string(),
                reason: format!("Must be at least {MIN_PEPPER_LEN} characters"),
            });
        }

        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&self.security.token_ttl_minutes) {
            return Err(ConfigError::Invalid {
                var: "TOKEN_TTL_MINUTES".to_string(),
                reason: format!("Must be between 1 and {MAX_TOKEN_TTL_MINUTES}"),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Must not exceed DB_MAX_CONNECTIONS ({})",
                    self.database.max_connections
                ),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse an optional variable, rejecting values that are set but malformed
fn parse_opt<F, T>(vars: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match vars(key) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("Cannot parse {raw:?}"),
        }),
        None => Ok(None),
    }
}

/// Helper to parse a variable with default fallback
fn parse_or<F, T>(vars: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    Ok(parse_opt(vars, key)?.unwrap_or(default))
}
