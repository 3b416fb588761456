// Tenant domain module
// Tenants, memberships and login sessions

pub mod session;
pub mod value_objects;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub use session::Session;
pub use value_objects::{TenantRole, TenantSlug};

/// A brand/organization on the platform
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Tenant {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

/// A user's membership in a tenant, joined with the tenant's display data
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Membership {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub tenant_slug: String,
    pub tenant_name: String,
    pub role: TenantRole,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Chooses the tenant a fresh login should land in
///
/// The most recently used membership wins; without usage history the
/// oldest membership is used.
pub fn choose_login_tenant(memberships: &[Membership]) -> Option<&Membership> {
    memberships
        .iter()
        .filter(|m| m.last_used_at.is_some())
        .max_by_key(|m| m.last_used_at)
        .or_else(|| memberships.iter().min_by_key(|m| m.created_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn membership(created_days_ago: i64, used_days_ago: Option<i64>) -> Membership {
        let now = Utc::now();
        Membership {
            user_id: Uuid::nil(),
            tenant_id: Uuid::new_v4(),
            tenant_slug: "brand".into(),
            tenant_name: "Brand".into(),
            role: TenantRole::Member,
            created_at: now - Duration::days(created_days_ago),
            last_used_at: used_days_ago.map(|d| now - Duration::days(d)),
        }
    }

    #[test]
    fn no_memberships() {
        assert!(choose_login_tenant(&[]).is_none());
    }

    #[test]
    fn most_recently_used_wins() {
        let memberships = vec![
            membership(30, Some(5)),
            membership(20, Some(1)),
            membership(40, None),
        ];
        let chosen = choose_login_tenant(&memberships).unwrap();
        assert_eq!(chosen.tenant_id, memberships[1].tenant_id);
    }

    #[test]
    fn falls_back_to_oldest() {
        let memberships = vec![membership(3, None), membership(10, None)];
        let chosen = choose_login_tenant(&memberships).unwrap();
        assert_eq!(chosen.tenant_id, memberships[1].tenant_id);
    }
}
