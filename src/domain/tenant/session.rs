use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Server-side record backing an issued JWT
///
/// Tokens carry the session id; a token is only honoured while its session
/// is neither revoked nor expired.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Starts a new session for a user, optionally scoped to a tenant
    pub fn start(user_id: Uuid, tenant_id: Option<Uuid>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            tenant_id,
            created_at: now,
            expires_at: now + ttl,
            revoked_at: None,
        }
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }
}
