use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::email::{
    EmailStatus, QueueStats, QueuedEmail, SenderAddress, SenderPurpose, ValidatedEmail,
};
use crate::domain::repositories::{EmailQueueRepository, SenderRepository};

const QUEUE_COLUMNS: &str = r#"
    id, tenant_id, to_address, purpose, subject, html_body, text_body, reply_to,
    status, attempts, max_attempts, next_attempt_at, last_error, claimed_by,
    claimed_at, sent_at, provider_message_id, created_at
"#;

/// PostgreSQL implementation of EmailQueueRepository
///
/// Claims use `FOR UPDATE SKIP LOCKED` so concurrent cron runs never pick
/// up the same row.
pub struct PostgresEmailQueueRepository {
    pool: PgPool,
}

impl PostgresEmailQueueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmailQueueRepository for PostgresEmailQueueRepository {
    async fn enqueue(&self, tenant_id: Uuid, email: &ValidatedEmail, max_attempts: i32) -> Result<QueuedEmail, String> {
        let sql = format!(
            r#"
            INSERT INTO email_queue (
                id, tenant_id, to_address, purpose, subject, html_body, text_body,
                reply_to, max_attempts, next_attempt_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, NOW()))
            RETURNING {}
            "#,
            QUEUE_COLUMNS
        );

        sqlx::query_as::<_, QueuedEmail>(&sql)
            .bind(Uuid::new_v4())
            .bind(tenant_id)
            .bind(email.to.as_str())
            .bind(email.purpose)
            .bind(&email.subject)
            .bind(&email.html_body)
            .bind(&email.text_body)
            .bind(email.reply_to.as_ref().map(|r| r.as_str().to_string()))
            .bind(max_attempts)
            .bind(email.send_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| format!("Failed to enqueue email: {}", e))
    }

    async fn claim_batch(&self, worker_id: &str, limit: i64) -> Result<Vec<QueuedEmail>, String> {
        let sql = format!(
            r#"
            UPDATE email_queue
            SET status = 'processing', claimed_by = $1, claimed_at = NOW()
            WHERE id IN (
                SELECT id FROM email_queue
                WHERE status = 'pending' AND next_attempt_at <= NOW()
                ORDER BY next_attempt_at
                FOR UPDATE SKIP LOCKED
                LIMIT $2
            )
            RETURNING {}
            "#,
            QUEUE_COLUMNS
        );

        sqlx::query_as::<_, QueuedEmail>(&sql)
            .bind(worker_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| format!("Failed to claim email batch: {}", e))
    }

    async fn mark_sent(&self, id: Uuid, provider_message_id: &str) -> Result<(), String> {
        sqlx::query(
            r#"
            UPDATE email_queue
            SET status = 'sent', sent_at = NOW(), provider_message_id = $2,
                attempts = attempts + 1, last_error = NULL,
                claimed_by = NULL, claimed_at = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(provider_message_id)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to mark email sent: {}", e))?;

        Ok(())
    }

    async fn mark_retry(&self, id: Uuid, attempts: i32, next_attempt_at: DateTime<Utc>, error: &str) -> Result<(), String> {
        sqlx::query(
            r#"
            UPDATE email_queue
            SET status = 'pending', attempts = $2, next_attempt_at = $3, last_error = $4,
                claimed_by = NULL, claimed_at = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(attempts)
        .bind(next_attempt_at)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to schedule email retry: {}", e))?;

        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, attempts: i32, error: &str) -> Result<(), String> {
        sqlx::query(
            r#"
            UPDATE email_queue
            SET status = 'failed', attempts = $2, last_error = $3,
                claimed_by = NULL, claimed_at = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(attempts)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to mark email failed: {}", e))?;

        Ok(())
    }

    async fn mark_skipped(&self, id: Uuid, reason: &str) -> Result<(), String> {
        sqlx::query(
            r#"
            UPDATE email_queue
            SET status = 'skipped', last_error = $2, claimed_by = NULL, claimed_at = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to mark email skipped: {}", e))?;

        Ok(())
    }

    async fn release_stale_claims(&self, older_than: DateTime<Utc>) -> Result<u64, String> {
        let result = sqlx::query(
            r#"
            UPDATE email_queue
            SET status = 'pending', claimed_by = NULL, claimed_at = NULL
            WHERE status = 'processing' AND claimed_at < $1
            "#,
        )
        .bind(older_than)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to release stale claims: {}", e))?;

        Ok(result.rows_affected())
    }

    async fn stats(&self, tenant_id: Uuid) -> Result<QueueStats, String> {
        let rows = sqlx::query_as::<_, (EmailStatus, i64)>(
            r#"
            SELECT status, COUNT(*)
            FROM email_queue
            WHERE tenant_id = $1
            GROUP BY status
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| format!("Failed to load queue stats: {}", e))?;

        let mut stats = QueueStats::default();
        for (status, count) in rows {
            stats.record(status, count);
        }
        Ok(stats)
    }
}

const SENDER_COLUMNS: &str =
    "id, tenant_id, email, display_name, purpose, is_default, is_verified, created_at";

/// PostgreSQL implementation of SenderRepository
pub struct PostgresSenderRepository {
    pool: PgPool,
}

impl PostgresSenderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SenderRepository for PostgresSenderRepository {
    async fn create(&self, address: &SenderAddress) -> Result<SenderAddress, String> {
        let sql = format!(
            r#"
            INSERT INTO tenant_sender_addresses (
                id, tenant_id, email, display_name, purpose, is_default, is_verified, created_at
            )
            VALUES (
                $1, $2, $3, $4, $5,
                NOT EXISTS (
                    SELECT 1 FROM tenant_sender_addresses
                    WHERE tenant_id = $2 AND purpose = $5 AND is_default
                ),
                $6, $7
            )
            RETURNING {}
            "#,
            SENDER_COLUMNS
        );

        sqlx::query_as::<_, SenderAddress>(&sql)
            .bind(address.id)
            .bind(address.tenant_id)
            .bind(&address.email)
            .bind(&address.display_name)
            .bind(address.purpose)
            .bind(address.is_verified)
            .bind(address.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| format!("Failed to create sender address: {}", e))
    }

    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<SenderAddress>, String> {
        let sql = format!(
            "SELECT {} FROM tenant_sender_addresses WHERE id = $1 AND tenant_id = $2",
            SENDER_COLUMNS
        );

        sqlx::query_as::<_, SenderAddress>(&sql)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| format!("Failed to find sender address: {}", e))
    }

    async fn list(&self, tenant_id: Uuid) -> Result<Vec<SenderAddress>, String> {
        let sql = format!(
            r#"
            SELECT {}
            FROM tenant_sender_addresses
            WHERE tenant_id = $1
            ORDER BY purpose, is_default DESC, created_at
            "#,
            SENDER_COLUMNS
        );

        sqlx::query_as::<_, SenderAddress>(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| format!("Failed to list sender addresses: {}", e))
    }

    async fn set_default(&self, tenant_id: Uuid, id: Uuid) -> Result<(), String> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| format!("Failed to begin transaction: {}", e))?;

        let purpose = sqlx::query_scalar::<_, SenderPurpose>(
            "SELECT purpose FROM tenant_sender_addresses WHERE id = $1 AND tenant_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| format!("Failed to load sender address: {}", e))?
        .ok_or_else(|| "Sender address not found".to_string())?;

        // Clear first so the partial unique index never sees two defaults
        sqlx::query(
            r#"
            UPDATE tenant_sender_addresses
            SET is_default = FALSE
            WHERE tenant_id = $1 AND purpose = $2 AND is_default AND id <> $3
            "#,
        )
        .bind(tenant_id)
        .bind(purpose)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| format!("Failed to clear default sender: {}", e))?;

        sqlx::query("UPDATE tenant_sender_addresses SET is_default = TRUE WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| format!("Failed to set default sender: {}", e))?;

        tx.commit()
            .await
            .map_err(|e| format!("Failed to commit default sender: {}", e))
    }

    async fn mark_verified(&self, tenant_id: Uuid, id: Uuid) -> Result<(), String> {
        sqlx::query("UPDATE tenant_sender_addresses SET is_verified = TRUE WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await
            .map_err(|e| format!("Failed to verify sender address: {}", e))?;

        Ok(())
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), String> {
        sqlx::query("DELETE FROM tenant_sender_addresses WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await
            .map_err(|e| format!("Failed to delete sender address: {}", e))?;

        Ok(())
    }

    async fn count_for_purpose(&self, tenant_id: Uuid, purpose: SenderPurpose) -> Result<i64, String> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tenant_sender_addresses WHERE tenant_id = $1 AND purpose = $2",
        )
        .bind(tenant_id)
        .bind(purpose)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| format!("Failed to count sender addresses: {}", e))
    }
}
