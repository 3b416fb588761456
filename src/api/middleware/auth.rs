use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::auth::jwt::verify_token;
use crate::config::AppConfig;
use crate::domain::repositories::SessionRepository;
use crate::domain::tenant::TenantRole;
use crate::infrastructure::repositories::PostgresSessionRepository;

pub const CRON_SECRET_HEADER: &str = "x-cron-secret";

/// Authenticated session extractor for protected routes
///
/// The JWT must verify and its session row must be neither revoked nor expired.
///
/// Usage:
/// ```rust,ignore
/// async fn protected_handler(auth: AuthSession) -> Result<String, ApiError> {
///     Ok(format!("Hello user {}", auth.user_id))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub role: Option<TenantRole>,
}

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("Invalid authorization format. Use: Bearer <token>"))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
    PgPool: FromRef<S>,
    Arc<AppConfig>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let config = Arc::<AppConfig>::from_ref(state);

        let claims = verify_token(token, &config.jwt_secret)
            .map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))?;

        let sessions = PostgresSessionRepository::new(PgPool::from_ref(state));
        let session = sessions
            .find_by_id(claims.sid)
            .await
            .map_err(ApiError::internal_server_error)?
            .ok_or_else(|| ApiError::unauthorized("Session not found"))?;

        if session.user_id != claims.sub || !session.is_active() {
            return Err(ApiError::unauthorized("Session expired or revoked"));
        }

        Ok(AuthSession {
            user_id: claims.sub,
            session_id: session.id,
            tenant_id: session.tenant_id,
            role: claims.role,
        })
    }
}

/// Authenticated session with an active tenant
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub tenant_id: Uuid,
    pub role: TenantRole,
}

impl TenantContext {
    /// Rejects roles below admin
    pub fn require_manager(&self) -> Result<(), ApiError> {
        if self.role.can_manage() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Requires owner or admin role"))
        }
    }

    /// Rejects read-only roles
    pub fn require_writer(&self) -> Result<(), ApiError> {
        if self.role.can_write() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Read-only role"))
        }
    }
}

impl TryFrom<AuthSession> for TenantContext {
    type Error = ApiError;

    fn try_from(auth: AuthSession) -> Result<Self, Self::Error> {
        match (auth.tenant_id, auth.role) {
            (Some(tenant_id), Some(role)) => Ok(TenantContext {
                user_id: auth.user_id,
                session_id: auth.session_id,
                tenant_id,
                role,
            }),
            _ => Err(ApiError::forbidden("No active tenant for this session")),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
    PgPool: FromRef<S>,
    Arc<AppConfig>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        AuthSession::from_request_parts(parts, state).await?.try_into()
    }
}

/// Guard for endpoints driven by the external scheduler
///
/// The endpoint is disabled (503) when no cron secret is configured.
#[derive(Debug, Clone, Copy)]
pub struct CronAuth;

#[async_trait]
impl<S> FromRequestParts<S> for CronAuth
where
    S: Send + Sync,
    Arc<AppConfig>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<AppConfig>::from_ref(state);
        let expected = config
            .cron_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::service_unavailable("Cron endpoints are disabled"))?;

        let provided = parts
            .headers
            .get(CRON_SECRET_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing cron secret"))?;

        if provided.as_bytes() != expected.as_bytes() {
            return Err(ApiError::unauthorized("Invalid cron secret"));
        }

        Ok(CronAuth)
    }
}
