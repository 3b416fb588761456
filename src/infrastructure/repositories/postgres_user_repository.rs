use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::repositories::user_repository::{User, UserRepository};
use crate::domain::tenant::TenantRole;
use crate::domain::user::value_objects::Email;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    full_name: String,
    is_active: bool,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let email = Email::new(&r.email).map_err(|e| format!("Invalid email from database: {}", e))?;
        Ok(User {
            id: r.id,
            email,
            password_hash: r.password_hash,
            full_name: r.full_name,
            is_active: r.is_active,
        })
    }
}

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new PostgresUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<Uuid, String> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, full_name, is_active)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create user: {}", e))?;

        Ok(user.id)
    }

    async fn create_with_membership(
        &self,
        user: User,
        tenant_id: Uuid,
        role: TenantRole,
    ) -> Result<Uuid, String> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| format!("Failed to begin transaction: {}", e))?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, full_name, is_active)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.is_active)
        .execute(&mut *tx)
        .await
        .map_err(|e| format!("Failed to create user: {}", e))?;

        sqlx::query(
            r#"
            INSERT INTO tenant_memberships (user_id, tenant_id, role)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user.id)
        .bind(tenant_id)
        .bind(role)
        .execute(&mut *tx)
        .await
        .map_err(|e| format!("Failed to add membership: {}", e))?;

        tx.commit()
            .await
            .map_err(|e| format!("Failed to commit registration: {}", e))?;

        Ok(user.id)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, String> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, full_name, is_active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| format!("Failed to find user by id: {}", e))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, String> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, full_name, is_active
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| format!("Failed to find user by email: {}", e))?;

        row.map(User::try_from).transpose()
    }

    async fn update_last_login(&self, user_id: Uuid) -> Result<(), String> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_login = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to update last login: {}", e))?;

        Ok(())
    }
}
