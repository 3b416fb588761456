use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::tenant::TenantRole;
use crate::domain::user::value_objects::Email;

/// User data for persistence
///
/// Users are global; tenant access comes from memberships.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: Email,
    pub password_hash: String,
    pub full_name: String,
    pub is_active: bool,
}

/// Repository trait for User aggregate
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: User) -> Result<Uuid, String>;

    /// Create a user and their first membership atomically
    ///
    /// Neither row is written if either insert fails.
    async fn create_with_membership(
        &self,
        user: User,
        tenant_id: Uuid,
        role: TenantRole,
    ) -> Result<Uuid, String>;

    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, String>;

    /// Find a user by email address
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, String>;

    /// Update user's last login timestamp
    async fn update_last_login(&self, user_id: Uuid) -> Result<(), String>;
}
