use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::TenantContext;
use crate::domain::email::{NewSenderAddress, SenderAddress};
use crate::domain::repositories::SenderRepository;
use crate::infrastructure::repositories::PostgresSenderRepository;

async fn find_sender(
    repo: &PostgresSenderRepository,
    tenant_id: Uuid,
    id: Uuid,
) -> Result<SenderAddress, ApiError> {
    repo.find_by_id(tenant_id, id)
        .await
        .map_err(ApiError::internal_server_error)?
        .ok_or_else(|| ApiError::not_found("Sender address not found"))
}

/// GET /api/senders
pub async fn list_senders(
    State(pool): State<PgPool>,
    ctx: TenantContext,
) -> Result<Json<Vec<SenderAddress>>, ApiError> {
    let senders = PostgresSenderRepository::new(pool)
        .list(ctx.tenant_id)
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok(Json(senders))
}

/// Add a sender address
///
/// The first address for a purpose becomes its default.
///
/// POST /api/senders
pub async fn create_sender(
    State(pool): State<PgPool>,
    ctx: TenantContext,
    Json(req): Json<NewSenderAddress>,
) -> Result<(StatusCode, Json<SenderAddress>), ApiError> {
    ctx.require_manager()?;
    let (email, display_name) = req.validate()?;

    let address = SenderAddress {
        id: Uuid::new_v4(),
        tenant_id: ctx.tenant_id,
        email: email.to_string(),
        display_name,
        purpose: req.purpose,
        is_default: false,
        is_verified: false,
        created_at: Utc::now(),
    };

    let created = PostgresSenderRepository::new(pool)
        .create(&address)
        .await
        .map_err(|e| {
            if e.contains("duplicate") || e.contains("unique") {
                ApiError::bad_request("Sender address already exists for this purpose")
            } else {
                ApiError::internal_server_error(e)
            }
        })?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /api/senders/:id/default
pub async fn set_default_sender(
    State(pool): State<PgPool>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<SenderAddress>, ApiError> {
    ctx.require_manager()?;

    let repo = PostgresSenderRepository::new(pool);
    find_sender(&repo, ctx.tenant_id, id).await?;

    repo.set_default(ctx.tenant_id, id)
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok(Json(find_sender(&repo, ctx.tenant_id, id).await?))
}

/// Record that the provider confirmed the sending domain
///
/// POST /api/senders/:id/verify
pub async fn verify_sender(
    State(pool): State<PgPool>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<SenderAddress>, ApiError> {
    ctx.require_manager()?;

    let repo = PostgresSenderRepository::new(pool);
    find_sender(&repo, ctx.tenant_id, id).await?;

    repo.mark_verified(ctx.tenant_id, id)
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok(Json(find_sender(&repo, ctx.tenant_id, id).await?))
}

/// Remove a sender address
///
/// The default for a purpose can only go once it is the last address left.
///
/// DELETE /api/senders/:id
pub async fn delete_sender(
    State(pool): State<PgPool>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ctx.require_manager()?;

    let repo = PostgresSenderRepository::new(pool);
    let sender = find_sender(&repo, ctx.tenant_id, id).await?;

    if sender.is_default {
        let remaining = repo
            .count_for_purpose(ctx.tenant_id, sender.purpose)
            .await
            .map_err(ApiError::internal_server_error)?;
        if remaining > 1 {
            return Err(ApiError::bad_request(
                "Choose another default before deleting this address",
            ));
        }
    }

    repo.delete(ctx.tenant_id, id)
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok(StatusCode::NO_CONTENT)
}
