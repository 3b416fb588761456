use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::platform_log::{ErrorGroup, LogFilter, PlatformLogEntry};

/// Repository trait for persisted platform logs
#[async_trait]
pub trait PlatformLogRepository: Send + Sync {
    async fn insert(&self, entry: &PlatformLogEntry) -> Result<(), String>;

    /// Entries matching the filter, newest first
    async fn query(&self, filter: &LogFilter) -> Result<Vec<PlatformLogEntry>, String>;

    /// Error entries grouped by signature, most frequent first
    async fn error_groups(&self, tenant_id: Option<Uuid>, since: DateTime<Utc>, limit: i64) -> Result<Vec<ErrorGroup>, String>;

    /// Delete entries older than `days`; returns how many were removed
    async fn purge_older_than(&self, days: i64) -> Result<u64, String>;
}
