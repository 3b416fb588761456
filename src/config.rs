// Application configuration loaded from the process environment

use std::net::SocketAddr;
use std::str::FromStr;

use chrono::Duration;
use thiserror::Error;

use crate::domain::email::retry::RetryPolicy;

/// Signing secret used when `JWT_SECRET` is unset
pub const DEV_JWT_SECRET: &str = "dev-secret-key";

/// Errors raised while reading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
}

/// Log output format for the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Runtime configuration for the API server
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub cron_secret: Option<String>,
    pub mux_webhook_secret: Option<String>,
    pub mux_token_id: Option<String>,
    pub mux_token_secret: Option<String>,
    pub resend_api_key: Option<String>,
    pub email_batch_size: i64,
    pub email_retry_base_seconds: i64,
    pub email_retry_max_seconds: i64,
    pub email_max_attempts: i32,
    pub email_claim_timeout_minutes: i64,
    pub log_format: LogFormat,
    pub log_retention_days: i64,
}

impl AppConfig {
    /// Reads configuration from environment variables
    ///
    /// `.env` files should be loaded by the caller beforehand.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    ///
    /// Used by `from_env` and by tests that need a deterministic environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| ConfigError::Missing("DATABASE_URL".into()))?;

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string());

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT".into(),
                    value: other.into(),
                })
            }
        };

        Ok(Self {
            database_url,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            jwt_secret,
            session_ttl_hours: parse_or(&lookup, "SESSION_TTL_HOURS", 8)?,
            cron_secret: non_empty(lookup("CRON_SECRET")),
            mux_webhook_secret: non_empty(lookup("MUX_WEBHOOK_SECRET")),
            mux_token_id: non_empty(lookup("MUX_TOKEN_ID")),
            mux_token_secret: non_empty(lookup("MUX_TOKEN_SECRET")),
            resend_api_key: non_empty(lookup("RESEND_API_KEY")),
            email_batch_size: parse_or(&lookup, "EMAIL_BATCH_SIZE", 25)?,
            email_retry_base_seconds: parse_or(&lookup, "EMAIL_RETRY_BASE_SECONDS", 60)?,
            email_retry_max_seconds: parse_or(&lookup, "EMAIL_RETRY_MAX_SECONDS", 3600)?,
            email_max_attempts: parse_or(&lookup, "EMAIL_MAX_ATTEMPTS", 5)?,
            email_claim_timeout_minutes: parse_or(&lookup, "EMAIL_CLAIM_TIMEOUT_MINUTES", 15)?,
            log_format,
            log_retention_days: parse_or(&lookup, "LOG_RETENTION_DAYS", 30)?,
        })
    }

    /// Session lifetime used for new sessions and JWT expiry
    pub fn session_ttl(&self) -> Duration {
        Duration::hours(self.session_ttl_hours)
    }

    /// Retry policy for the email queue
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            Duration::seconds(self.email_retry_base_seconds),
            Duration::seconds(self.email_retry_max_seconds),
            self.email_max_attempts,
        )
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value: raw,
        }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
