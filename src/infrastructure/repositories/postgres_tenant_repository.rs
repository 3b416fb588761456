use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::repositories::{SessionRepository, TenantRepository};
use crate::domain::tenant::{Membership, Session, Tenant, TenantRole};

const MEMBERSHIP_COLUMNS: &str = r#"
    m.user_id, m.tenant_id, t.slug AS tenant_slug, t.name AS tenant_name,
    m.role, m.created_at, m.last_used_at
"#;

/// PostgreSQL implementation of TenantRepository
pub struct PostgresTenantRepository {
    pool: PgPool,
}

impl PostgresTenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for PostgresTenantRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, String> {
        sqlx::query_as::<_, Tenant>("SELECT id, slug, name FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| format!("Failed to find tenant by id: {}", e))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, String> {
        sqlx::query_as::<_, Tenant>("SELECT id, slug, name FROM tenants WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| format!("Failed to find tenant by slug: {}", e))
    }

    async fn add_membership(&self, user_id: Uuid, tenant_id: Uuid, role: TenantRole) -> Result<(), String> {
        sqlx::query(
            r#"
            INSERT INTO tenant_memberships (user_id, tenant_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, tenant_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(tenant_id)
        .bind(role)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to add membership: {}", e))?;

        Ok(())
    }

    async fn find_membership(&self, user_id: Uuid, tenant_id: Uuid) -> Result<Option<Membership>, String> {
        let sql = format!(
            r#"
            SELECT {}
            FROM tenant_memberships m
            JOIN tenants t ON t.id = m.tenant_id
            WHERE m.user_id = $1 AND m.tenant_id = $2
            "#,
            MEMBERSHIP_COLUMNS
        );

        sqlx::query_as::<_, Membership>(&sql)
            .bind(user_id)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| format!("Failed to find membership: {}", e))
    }

    async fn list_memberships(&self, user_id: Uuid) -> Result<Vec<Membership>, String> {
        let sql = format!(
            r#"
            SELECT {}
            FROM tenant_memberships m
            JOIN tenants t ON t.id = m.tenant_id
            WHERE m.user_id = $1
            ORDER BY t.name
            "#,
            MEMBERSHIP_COLUMNS
        );

        sqlx::query_as::<_, Membership>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| format!("Failed to list memberships: {}", e))
    }

    async fn touch_membership(&self, user_id: Uuid, tenant_id: Uuid) -> Result<(), String> {
        sqlx::query(
            r#"
            UPDATE tenant_memberships
            SET last_used_at = NOW()
            WHERE user_id = $1 AND tenant_id = $2
            "#,
        )
        .bind(user_id)
        .bind(tenant_id)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to update membership usage: {}", e))?;

        Ok(())
    }
}

/// PostgreSQL implementation of SessionRepository
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn create(&self, session: &Session) -> Result<(), String> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, tenant_id, created_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(session.tenant_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .bind(session.revoked_at)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create session: {}", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>, String> {
        sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, tenant_id, created_at, expires_at, revoked_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| format!("Failed to find session: {}", e))
    }

    async fn revoke(&self, id: Uuid) -> Result<(), String> {
        sqlx::query("UPDATE sessions SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| format!("Failed to revoke session: {}", e))?;

        Ok(())
    }
}
