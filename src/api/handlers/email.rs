use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::Duration;
use sqlx::PgPool;

use crate::api::errors::ApiError;
use crate::api::middleware::{CronAuth, TenantContext};
use crate::config::AppConfig;
use crate::domain::email::{NewEmail, ProcessSummary, QueueStats, QueuedEmail};
use crate::domain::repositories::EmailQueueRepository;
use crate::infrastructure::clients::ResendClient;
use crate::infrastructure::repositories::{
    PostgresConsentRepository, PostgresEmailQueueRepository, PostgresSenderRepository,
};
use crate::services::EmailDispatcher;

/// Queue an email for delivery
///
/// POST /api/email/queue
pub async fn enqueue_email(
    State(pool): State<PgPool>,
    State(config): State<Arc<AppConfig>>,
    ctx: TenantContext,
    Json(req): Json<NewEmail>,
) -> Result<(StatusCode, Json<QueuedEmail>), ApiError> {
    ctx.require_writer()?;
    let email = req.validate()?;

    let queued = PostgresEmailQueueRepository::new(pool)
        .enqueue(ctx.tenant_id, &email, config.email_max_attempts)
        .await
        .map_err(ApiError::internal_server_error)?;

    tracing::debug!(email_id = %queued.id, tenant_id = %ctx.tenant_id, purpose = %queued.purpose, "Email queued");
    Ok((StatusCode::ACCEPTED, Json(queued)))
}

/// GET /api/email/queue/stats
pub async fn queue_stats(
    State(pool): State<PgPool>,
    ctx: TenantContext,
) -> Result<Json<QueueStats>, ApiError> {
    let stats = PostgresEmailQueueRepository::new(pool)
        .stats(ctx.tenant_id)
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok(Json(stats))
}

/// Deliver one batch of due emails
///
/// Called by the external scheduler with the cron secret.
///
/// POST /api/email/queue/process
pub async fn process_queue(
    State(pool): State<PgPool>,
    State(config): State<Arc<AppConfig>>,
    _cron: CronAuth,
) -> Result<Json<ProcessSummary>, ApiError> {
    let api_key = config
        .resend_api_key
        .as_deref()
        .ok_or_else(|| ApiError::service_unavailable("Email delivery is not configured"))?;

    let dispatcher = EmailDispatcher::new(
        Arc::new(PostgresEmailQueueRepository::new(pool.clone())),
        Arc::new(PostgresSenderRepository::new(pool.clone())),
        Arc::new(PostgresConsentRepository::new(pool)),
        Arc::new(ResendClient::new(api_key)),
        config.retry_policy(),
    )
    .with_batch_size(config.email_batch_size)
    .with_claim_timeout(Duration::minutes(config.email_claim_timeout_minutes));

    let summary = dispatcher
        .process_batch()
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok(Json(summary))
}
