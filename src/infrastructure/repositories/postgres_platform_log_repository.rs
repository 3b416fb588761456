use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::platform_log::{normalize_error_message, ErrorGroup, LogFilter, PlatformLogEntry};
use crate::domain::repositories::PlatformLogRepository;

#[derive(sqlx::FromRow)]
struct ErrorGroupRow {
    signature: String,
    sample_message: String,
    occurrences: i64,
    first_seen: DateTime<Utc>,
    last_seen: DateTime<Utc>,
    services: Vec<String>,
}

/// PostgreSQL implementation of PlatformLogRepository
pub struct PostgresPlatformLogRepository {
    pool: PgPool,
}

impl PostgresPlatformLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlatformLogRepository for PostgresPlatformLogRepository {
    async fn insert(&self, entry: &PlatformLogEntry) -> Result<(), String> {
        sqlx::query(
            r#"
            INSERT INTO platform_logs (
                id, tenant_id, level, service, message, context,
                request_id, error_signature, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(entry.id)
        .bind(entry.tenant_id)
        .bind(entry.level)
        .bind(&entry.service)
        .bind(&entry.message)
        .bind(&entry.context)
        .bind(&entry.request_id)
        .bind(&entry.error_signature)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to insert log entry: {}", e))?;

        Ok(())
    }

    async fn query(&self, filter: &LogFilter) -> Result<Vec<PlatformLogEntry>, String> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT id, tenant_id, level, service, message, context,
                   request_id, error_signature, created_at
            FROM platform_logs
            WHERE TRUE
            "#,
        );

        if let Some(tenant_id) = filter.tenant_id {
            qb.push(" AND tenant_id = ").push_bind(tenant_id);
        }
        if let Some(level) = filter.min_level {
            qb.push(" AND level >= ").push_bind(level);
        }
        if let Some(service) = &filter.service {
            qb.push(" AND service = ").push_bind(service.clone());
        }
        if let Some(since) = filter.since {
            qb.push(" AND created_at >= ").push_bind(since);
        }
        if let Some(until) = filter.until {
            qb.push(" AND created_at < ").push_bind(until);
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!(
                "%{}%",
                search.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
            );
            qb.push(" AND message ILIKE ").push_bind(pattern);
        }

        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(filter.effective_limit());

        qb.build_query_as::<PlatformLogEntry>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| format!("Failed to query logs: {}", e))
    }

    async fn error_groups(&self, tenant_id: Option<Uuid>, since: DateTime<Utc>, limit: i64) -> Result<Vec<ErrorGroup>, String> {
        let rows = sqlx::query_as::<_, ErrorGroupRow>(
            r#"
            SELECT
                error_signature AS signature,
                (ARRAY_AGG(message ORDER BY created_at DESC))[1] AS sample_message,
                COUNT(*) AS occurrences,
                MIN(created_at) AS first_seen,
                MAX(created_at) AS last_seen,
                ARRAY_AGG(DISTINCT service) AS services
            FROM platform_logs
            WHERE error_signature IS NOT NULL
              AND created_at >= $1
              AND ($2::uuid IS NULL OR tenant_id = $2)
            GROUP BY error_signature
            ORDER BY COUNT(*) DESC, MAX(created_at) DESC
            LIMIT $3
            "#,
        )
        .bind(since)
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| format!("Failed to load error groups: {}", e))?;

        Ok(rows
            .into_iter()
            .map(|r| ErrorGroup {
                normalized_message: normalize_error_message(&r.sample_message),
                signature: r.signature,
                sample_message: r.sample_message,
                occurrences: r.occurrences,
                first_seen: r.first_seen,
                last_seen: r.last_seen,
                services: r.services,
            })
            .collect())
    }

    async fn purge_older_than(&self, days: i64) -> Result<u64, String> {
        let result = sqlx::query(
            "DELETE FROM platform_logs WHERE created_at < NOW() - make_interval(days => $1)",
        )
        .bind(days as i32)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to purge logs: {}", e))?;

        Ok(result.rows_affected())
    }
}
