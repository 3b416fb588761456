use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::AuthSession;
use crate::auth::jwt::{create_token, Claims};
use crate::auth::password::{hash_password, validate_password, verify_password};
use crate::config::AppConfig;
use crate::domain::repositories::{SessionRepository, TenantRepository, User, UserRepository};
use crate::domain::tenant::{choose_login_tenant, Membership, Session, TenantRole};
use crate::domain::user::value_objects::Email;
use crate::infrastructure::repositories::{
    PostgresSessionRepository, PostgresTenantRepository, PostgresUserRepository,
};

/// Request body for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub tenant_id: Uuid,
}

/// Response from successful registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub message: String,
}

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token issued by login and tenant switching
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub role: Option<TenantRole>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SwitchTenantRequest {
    pub tenant_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub tenant_id: Option<Uuid>,
    pub role: Option<TenantRole>,
    pub memberships: Vec<Membership>,
}

async fn issue_session(
    pool: &PgPool,
    config: &AppConfig,
    user_id: Uuid,
    membership: Option<&Membership>,
) -> Result<TokenResponse, ApiError> {
    let tenant_id = membership.map(|m| m.tenant_id);
    let role = membership.map(|m| m.role);

    let session = Session::start(user_id, tenant_id, config.session_ttl());
    PostgresSessionRepository::new(pool.clone())
        .create(&session)
        .await
        .map_err(ApiError::internal_server_error)?;

    if let Some(tenant_id) = tenant_id {
        let tenants = PostgresTenantRepository::new(pool.clone());
        if let Err(e) = tenants.touch_membership(user_id, tenant_id).await {
            tracing::warn!(%user_id, %tenant_id, error = %e, "Failed to record membership use");
        }
    }

    let token = create_token(&Claims::for_session(&session, role), &config.jwt_secret)
        .map_err(|e| ApiError::internal_server_error(format!("Failed to create token: {}", e)))?;

    Ok(TokenResponse {
        token,
        user_id,
        tenant_id,
        role,
        expires_at: session.expires_at,
    })
}

/// Register a new user as a member of an existing tenant
///
/// POST /api/auth/register
pub async fn register(
    State(pool): State<PgPool>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let email = Email::new(&req.email).map_err(ApiError::bad_request)?;
    validate_password(&req.password).map_err(ApiError::bad_request)?;

    let full_name = req.full_name.trim().to_string();
    if full_name.is_empty() {
        return Err(ApiError::bad_request("Full name is required"));
    }

    let tenants = PostgresTenantRepository::new(pool.clone());
    tenants
        .find_by_id(req.tenant_id)
        .await
        .map_err(ApiError::internal_server_error)?
        .ok_or_else(|| ApiError::bad_request("Unknown tenant"))?;

    let password_hash = hash_password(&req.password)
        .map_err(|e| ApiError::internal_server_error(format!("Failed to hash password: {}", e)))?;

    let user = User {
        id: Uuid::new_v4(),
        email,
        password_hash,
        full_name,
        is_active: true,
    };

    let user_repo = PostgresUserRepository::new(pool);
    let user_id = user_repo
        .create_with_membership(user, req.tenant_id, TenantRole::Member)
        .await
        .map_err(|e| {
            if e.contains("Failed to create user") && (e.contains("duplicate") || e.contains("unique")) {
                ApiError::bad_request("Email already registered")
            } else {
                ApiError::internal_server_error(e)
            }
        })?;

    tracing::info!(%user_id, tenant_id = %req.tenant_id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            message: "User registered successfully".to_string(),
        }),
    ))
}

/// Login with email and password
///
/// The session starts in the most recently used tenant.
///
/// POST /api/auth/login
pub async fn login(
    State(pool): State<PgPool>,
    State(config): State<Arc<AppConfig>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = Email::new(&req.email).map_err(|_| ApiError::unauthorized("Invalid credentials"))?;

    let user_repo = PostgresUserRepository::new(pool.clone());
    let user = user_repo
        .find_by_email(&email)
        .await
        .map_err(ApiError::internal_server_error)?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
        ApiError::internal_server_error(format!("Password verification failed: {}", e))
    })?;

    if !valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    if !user.is_active {
        return Err(ApiError::unauthorized("Account is disabled"));
    }

    if let Err(e) = user_repo.update_last_login(user.id).await {
        tracing::warn!(user_id = %user.id, error = %e, "Failed to update last login");
    }

    let memberships = PostgresTenantRepository::new(pool.clone())
        .list_memberships(user.id)
        .await
        .map_err(ApiError::internal_server_error)?;

    let response = issue_session(&pool, &config, user.id, choose_login_tenant(&memberships)).await?;
    Ok(Json(response))
}

/// Move the caller to another tenant they belong to
///
/// The current session is revoked and replaced by one scoped to the target.
///
/// POST /api/auth/switch-tenant
pub async fn switch_tenant(
    State(pool): State<PgPool>,
    State(config): State<Arc<AppConfig>>,
    auth: AuthSession,
    Json(req): Json<SwitchTenantRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let membership = PostgresTenantRepository::new(pool.clone())
        .find_membership(auth.user_id, req.tenant_id)
        .await
        .map_err(ApiError::internal_server_error)?
        .ok_or_else(|| ApiError::forbidden("Not a member of that tenant"))?;

    PostgresSessionRepository::new(pool.clone())
        .revoke(auth.session_id)
        .await
        .map_err(ApiError::internal_server_error)?;

    let response = issue_session(&pool, &config, auth.user_id, Some(&membership)).await?;

    tracing::info!(user_id = %auth.user_id, tenant_id = %req.tenant_id, "Switched tenant");
    Ok(Json(response))
}

/// Revoke the current session
///
/// POST /api/auth/logout
pub async fn logout(State(pool): State<PgPool>, auth: AuthSession) -> Result<StatusCode, ApiError> {
    PostgresSessionRepository::new(pool)
        .revoke(auth.session_id)
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Current user, active tenant and all memberships
///
/// GET /api/auth/me
pub async fn me(State(pool): State<PgPool>, auth: AuthSession) -> Result<Json<MeResponse>, ApiError> {
    let user = PostgresUserRepository::new(pool.clone())
        .find_by_id(auth.user_id)
        .await
        .map_err(ApiError::internal_server_error)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let memberships = PostgresTenantRepository::new(pool)
        .list_memberships(auth.user_id)
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok(Json(MeResponse {
        user_id: user.id,
        email: user.email.to_string(),
        full_name: user.full_name,
        tenant_id: auth.tenant_id,
        role: auth.role,
        memberships,
    }))
}

/// Health check endpoint
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
