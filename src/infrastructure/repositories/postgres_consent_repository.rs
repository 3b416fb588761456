use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::contact::{ContactChannel, ContactConsent};
use crate::domain::repositories::ConsentRepository;

/// PostgreSQL implementation of ConsentRepository
pub struct PostgresConsentRepository {
    pool: PgPool,
}

impl PostgresConsentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConsentRepository for PostgresConsentRepository {
    async fn upsert(&self, consent: &ContactConsent) -> Result<(), String> {
        sqlx::query(
            r#"
            INSERT INTO contact_consents (tenant_id, channel, address, opted_out, source_keyword, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (tenant_id, channel, address) DO UPDATE SET
                opted_out = EXCLUDED.opted_out,
                source_keyword = EXCLUDED.source_keyword,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(consent.tenant_id)
        .bind(consent.channel)
        .bind(consent.address.trim().to_lowercase())
        .bind(consent.opted_out)
        .bind(&consent.source_keyword)
        .bind(consent.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to save contact consent: {}", e))?;

        Ok(())
    }

    async fn is_opted_out(&self, tenant_id: Uuid, channel: ContactChannel, address: &str) -> Result<bool, String> {
        let opted_out = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT opted_out
            FROM contact_consents
            WHERE tenant_id = $1 AND channel = $2 AND address = $3
            "#,
        )
        .bind(tenant_id)
        .bind(channel)
        .bind(address.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| format!("Failed to check contact consent: {}", e))?;

        Ok(opted_out.unwrap_or(false))
    }
}
