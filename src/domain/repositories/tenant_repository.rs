use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::tenant::{Membership, Session, Tenant, TenantRole};

/// Repository trait for tenants and user memberships
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, String>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, String>;

    /// Grant a user a role in a tenant; an existing membership keeps its role
    async fn add_membership(&self, user_id: Uuid, tenant_id: Uuid, role: TenantRole) -> Result<(), String>;

    async fn find_membership(&self, user_id: Uuid, tenant_id: Uuid) -> Result<Option<Membership>, String>;

    /// All memberships of a user, joined with tenant names
    async fn list_memberships(&self, user_id: Uuid) -> Result<Vec<Membership>, String>;

    /// Stamp `last_used_at` so the next login lands in this tenant
    async fn touch_membership(&self, user_id: Uuid, tenant_id: Uuid) -> Result<(), String>;
}

/// Repository trait for login sessions
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<(), String>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>, String>;

    /// Revoke a session; revoking twice is a no-op
    async fn revoke(&self, id: Uuid) -> Result<(), String>;
}
