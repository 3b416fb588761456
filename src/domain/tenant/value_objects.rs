use serde::{Deserialize, Serialize};

/// Role a user holds within a tenant
///
/// Variants are declared from most to least privileged, so the derived
/// ordering puts `Owner` first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "tenant_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TenantRole {
    Owner,
    Admin,
    Member,
    Viewer,
}

impl TenantRole {
    /// Owners and admins manage tenant configuration (tests, senders, connections)
    pub fn can_manage(&self) -> bool {
        matches!(self, TenantRole::Owner | TenantRole::Admin)
    }

    /// Viewers are read-only
    pub fn can_write(&self) -> bool {
        !matches!(self, TenantRole::Viewer)
    }

    /// True when this role is at least as privileged as `other`
    pub fn at_least(&self, other: TenantRole) -> bool {
        *self <= other
    }
}

impl std::fmt::Display for TenantRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TenantRole::Owner => write!(f, "owner"),
            TenantRole::Admin => write!(f, "admin"),
            TenantRole::Member => write!(f, "member"),
            TenantRole::Viewer => write!(f, "viewer"),
        }
    }
}

/// URL-safe tenant identifier used by public endpoints (feeds, inbound SMS)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSlug(String);

impl TenantSlug {
    pub fn new(slug: impl Into<String>) -> Result<Self, String> {
        let slug = slug.into().trim().to_lowercase();
        let valid_chars = slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

        if slug.is_empty() || slug.len() > 63 || !valid_chars {
            return Err(format!("Invalid tenant slug: {}", slug));
        }
        if slug.starts_with('-') || slug.ends_with('-') {
            return Err(format!("Invalid tenant slug: {}", slug));
        }

        Ok(Self(slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
