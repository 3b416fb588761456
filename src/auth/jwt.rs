// JWT token creation and verification
// Tokens mirror a session row; expiry follows the session TTL

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::tenant::{Session, TenantRole};

/// JWT claims structure
///
/// # Fields
/// * `sub` - Subject (user_id)
/// * `sid` - Session id; the session row decides whether the token is still live
/// * `tenant_id` - Active tenant, absent for users without memberships
/// * `role` - Role held in the active tenant
/// * `exp` - Expiry time (seconds since epoch)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: Uuid,
    pub sid: Uuid,
    pub tenant_id: Option<Uuid>,
    pub role: Option<TenantRole>,
    pub exp: usize,
}

impl Claims {
    /// Builds claims that expire together with the session
    pub fn for_session(session: &Session, role: Option<TenantRole>) -> Self {
        Self {
            sub: session.user_id,
            sid: session.id,
            tenant_id: session.tenant_id,
            role,
            exp: session.expires_at.timestamp().max(0) as usize,
        }
    }
}

/// Signs claims into an HS256 token
///
/// # Arguments
/// * `claims` - Claims to embed
/// * `secret` - The secret key for signing (from configuration)
///
/// # Example
/// ```
/// use cgk_platform_api::auth::jwt::{create_token, Claims};
/// use cgk_platform_api::domain::tenant::Session;
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// let session = Session::start(Uuid::new_v4(), None, Duration::hours(8));
/// let token = create_token(&Claims::for_session(&session, None), "secret").expect("valid token");
/// assert_eq!(token.split('.').count(), 3);
/// ```
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| e.to_string())
}

/// Verifies and decodes a JWT token
///
/// # Returns
/// * `Ok(Claims)` - The decoded claims if token is valid
/// * `Err(String)` - If token is invalid or expired
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}
