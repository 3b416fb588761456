use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::value_objects::Email;
use crate::domain::validation::ValidationErrors;

pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

/// What a sender address is used for
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "sender_purpose", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SenderPurpose {
    #[default]
    Transactional,
    Marketing,
    Support,
    Notifications,
}

impl std::fmt::Display for SenderPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SenderPurpose::Transactional => write!(f, "transactional"),
            SenderPurpose::Marketing => write!(f, "marketing"),
            SenderPurpose::Support => write!(f, "support"),
            SenderPurpose::Notifications => write!(f, "notifications"),
        }
    }
}

/// A tenant's configured "From" address
///
/// # Invariants
/// - At most one default per (tenant, purpose)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SenderAddress {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub purpose: SenderPurpose,
    pub is_default: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl SenderAddress {
    /// Renders the address for a `From` header: `Display Name <email>`
    pub fn formatted(&self) -> String {
        if self.display_name.is_empty() {
            self.email.clone()
        } else {
            format!("{} <{}>", self.display_name, self.email)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSenderAddress {
    pub email: String,
    pub display_name: String,
    pub purpose: SenderPurpose,
}

impl NewSenderAddress {
    /// Validates the address and display name
    pub fn validate(&self) -> Result<(Email, String), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = Email::new(&self.email).map_err(|e| errors.push(e)).ok();

        let display_name = self.display_name.trim().to_string();
        errors.check(
            display_name.chars().count() <= MAX_DISPLAY_NAME_LENGTH,
            format!(
                "Display name cannot exceed {} characters",
                MAX_DISPLAY_NAME_LENGTH
            ),
        );
        errors.check(
            !display_name.contains(['<', '>', '"', '\r', '\n']),
            "Display name cannot contain <, >, quotes or line breaks",
        );

        errors.into_result()?;
        Ok((email.ok_or_else(ValidationErrors::new)?, display_name))
    }
}

/// Picks the address to send from for a purpose
///
/// The verified default for the purpose wins; otherwise the verified
/// transactional default is used. Unverified addresses are never chosen.
pub fn resolve_sender(addresses: &[SenderAddress], purpose: SenderPurpose) -> Option<&SenderAddress> {
    let verified_default = |p: SenderPurpose| {
        addresses
            .iter()
            .find(|a| a.purpose == p && a.is_default && a.is_verified)
    };

    verified_default(purpose).or_else(|| verified_default(SenderPurpose::Transactional))
}
