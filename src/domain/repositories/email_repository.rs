use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::email::{
    QueueStats, QueuedEmail, SenderAddress, SenderPurpose, ValidatedEmail,
};

/// Repository trait for the outbound email queue
#[async_trait]
pub trait EmailQueueRepository: Send + Sync {
    async fn enqueue(&self, tenant_id: Uuid, email: &ValidatedEmail, max_attempts: i32) -> Result<QueuedEmail, String>;

    /// Claim due pending emails for a worker, skipping rows locked by others
    async fn claim_batch(&self, worker_id: &str, limit: i64) -> Result<Vec<QueuedEmail>, String>;

    async fn mark_sent(&self, id: Uuid, provider_message_id: &str) -> Result<(), String>;

    async fn mark_retry(&self, id: Uuid, attempts: i32, next_attempt_at: DateTime<Utc>, error: &str) -> Result<(), String>;

    async fn mark_failed(&self, id: Uuid, attempts: i32, error: &str) -> Result<(), String>;

    async fn mark_skipped(&self, id: Uuid, reason: &str) -> Result<(), String>;

    /// Return claims older than the cutoff to pending; returns how many
    async fn release_stale_claims(&self, older_than: DateTime<Utc>) -> Result<u64, String>;

    async fn stats(&self, tenant_id: Uuid) -> Result<QueueStats, String>;
}

/// Repository trait for tenant sender addresses
#[async_trait]
pub trait SenderRepository: Send + Sync {
    /// Insert an address; it becomes the default when its purpose has none
    async fn create(&self, address: &SenderAddress) -> Result<SenderAddress, String>;

    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<SenderAddress>, String>;

    async fn list(&self, tenant_id: Uuid) -> Result<Vec<SenderAddress>, String>;

    /// Make one address the default for its purpose, clearing the others
    async fn set_default(&self, tenant_id: Uuid, id: Uuid) -> Result<(), String>;

    async fn mark_verified(&self, tenant_id: Uuid, id: Uuid) -> Result<(), String>;

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), String>;

    async fn count_for_purpose(&self, tenant_id: Uuid, purpose: SenderPurpose) -> Result<i64, String>;
}
