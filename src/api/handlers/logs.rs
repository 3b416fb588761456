use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::api::errors::ApiError;
use crate::api::middleware::{CronAuth, TenantContext};
use crate::config::AppConfig;
use crate::domain::platform_log::{ErrorGroup, LogFilter, NewLogEntry, PlatformLogEntry, MAX_QUERY_LIMIT};
use crate::domain::repositories::PlatformLogRepository;
use crate::infrastructure::repositories::PostgresPlatformLogRepository;

const DEFAULT_ERROR_WINDOW_HOURS: i64 = 24;
const DEFAULT_ERROR_GROUPS: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct ErrorGroupQuery {
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub deleted: u64,
    pub retention_days: i64,
}

/// Ingest a log entry for the caller's tenant
///
/// POST /api/logs
pub async fn ingest_log(
    State(pool): State<PgPool>,
    ctx: TenantContext,
    Json(req): Json<NewLogEntry>,
) -> Result<(StatusCode, Json<PlatformLogEntry>), ApiError> {
    let entry = req.into_entry(Some(ctx.tenant_id))?;

    PostgresPlatformLogRepository::new(pool)
        .insert(&entry)
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Search the caller's logs, newest first
///
/// GET /api/logs?min_level=&service=&since=&until=&search=&limit=
pub async fn query_logs(
    State(pool): State<PgPool>,
    ctx: TenantContext,
    Query(mut filter): Query<LogFilter>,
) -> Result<Json<Vec<PlatformLogEntry>>, ApiError> {
    filter.tenant_id = Some(ctx.tenant_id);

    let entries = PostgresPlatformLogRepository::new(pool)
        .query(&filter)
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok(Json(entries))
}

/// Error and fatal entries grouped by signature
///
/// GET /api/logs/errors?since=&limit=
pub async fn error_groups(
    State(pool): State<PgPool>,
    ctx: TenantContext,
    Query(params): Query<ErrorGroupQuery>,
) -> Result<Json<Vec<ErrorGroup>>, ApiError> {
    let since = params
        .since
        .unwrap_or_else(|| Utc::now() - Duration::hours(DEFAULT_ERROR_WINDOW_HOURS));
    let limit = params
        .limit
        .unwrap_or(DEFAULT_ERROR_GROUPS)
        .clamp(1, MAX_QUERY_LIMIT);

    let groups = PostgresPlatformLogRepository::new(pool)
        .error_groups(Some(ctx.tenant_id), since, limit)
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok(Json(groups))
}

/// Drop entries past the retention window
///
/// POST /api/logs/purge
pub async fn purge_logs(
    State(pool): State<PgPool>,
    State(config): State<Arc<AppConfig>>,
    _cron: CronAuth,
) -> Result<Json<PurgeResponse>, ApiError> {
    let deleted = PostgresPlatformLogRepository::new(pool)
        .purge_older_than(config.log_retention_days)
        .await
        .map_err(ApiError::internal_server_error)?;

    tracing::info!(deleted, retention_days = config.log_retention_days, "Purged platform logs");
    Ok(Json(PurgeResponse {
        deleted,
        retention_days: config.log_retention_days,
    }))
}
