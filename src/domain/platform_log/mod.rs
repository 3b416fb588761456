// Platform log domain module
// Structured log entries persisted for tenants, plus error-signature grouping

pub mod signature;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::validation::ValidationErrors;

pub use signature::{error_signature, normalize_error_message};

pub const MAX_MESSAGE_LENGTH: usize = 10_000;
pub const MAX_SERVICE_LENGTH: usize = 100;
pub const MAX_QUERY_LIMIT: i64 = 500;

/// Severity of a log entry, ordered from least to most severe
///
/// The Postgres enum is declared in the same order, so `>=` works in SQL too.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "log_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    /// Only error-level entries are fingerprinted
    pub fn is_error(&self) -> bool {
        *self >= LogLevel::Error
    }
}

/// A stored log entry
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PlatformLogEntry {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub level: LogLevel,
    pub service: String,
    pub message: String,
    pub context: serde_json::Value,
    pub request_id: Option<String>,
    pub error_signature: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Log entry submitted by a service
#[derive(Debug, Clone, Deserialize)]
pub struct NewLogEntry {
    pub level: LogLevel,
    pub service: String,
    pub message: String,
    #[serde(default)]
    pub context: Option<serde_json::Value>,
    pub request_id: Option<String>,
}

impl NewLogEntry {
    /// Validates the entry and prepares it for storage under `tenant_id`
    pub fn into_entry(self, tenant_id: Option<Uuid>) -> Result<PlatformLogEntry, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let service = self.service.trim().to_string();
        errors.check(!service.is_empty(), "Service cannot be empty");
        errors.check(
            service.chars().count() <= MAX_SERVICE_LENGTH,
            format!("Service cannot exceed {} characters", MAX_SERVICE_LENGTH),
        );
        errors.check(!self.message.trim().is_empty(), "Message cannot be empty");

        let context = self.context.unwrap_or_else(|| serde_json::json!({}));
        errors.check(context.is_object(), "Context must be a JSON object");
        errors.into_result()?;

        let message: String = self.message.chars().take(MAX_MESSAGE_LENGTH).collect();
        let error_signature = self.level.is_error().then(|| error_signature(&message));

        Ok(PlatformLogEntry {
            id: Uuid::new_v4(),
            tenant_id,
            level: self.level,
            service,
            message,
            context,
            request_id: self.request_id,
            error_signature,
            created_at: Utc::now(),
        })
    }
}

/// Filters for log queries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogFilter {
    #[serde(skip)]
    pub tenant_id: Option<Uuid>,
    pub min_level: Option<LogLevel>,
    pub service: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    /// Case-insensitive substring match on the message
    pub search: Option<String>,
    pub limit: Option<i64>,
}

impl LogFilter {
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(100).clamp(1, MAX_QUERY_LIMIT)
    }
}

/// Occurrences of one error signature
#[derive(Debug, Clone, Serialize)]
pub struct ErrorGroup {
    pub signature: String,
    pub sample_message: String,
    pub normalized_message: String,
    pub occurrences: i64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub services: Vec<String>,
}
