use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;

use crate::api::errors::ApiError;
use crate::api::middleware::TenantContext;
use crate::domain::drive::{AssetKind, ConnectDrive, DriveAsset, DriveConnectionView, DriveError, IngestSummary};
use crate::domain::repositories::DriveRepository;
use crate::infrastructure::clients::DriveClient;
use crate::infrastructure::repositories::PostgresDriveRepository;
use crate::services::DriveSync;

#[derive(Debug, Deserialize)]
pub struct AssetQuery {
    pub kind: Option<AssetKind>,
}

/// Connect (or reconnect) the tenant's Drive folder
///
/// Reconnecting clears a pending re-auth flag.
///
/// PUT /api/drive/connection
pub async fn put_connection(
    State(pool): State<PgPool>,
    ctx: TenantContext,
    Json(req): Json<ConnectDrive>,
) -> Result<Json<DriveConnectionView>, ApiError> {
    ctx.require_manager()?;
    req.validate()?;

    let conn = PostgresDriveRepository::new(pool)
        .upsert_connection(ctx.tenant_id, req.folder_id.trim(), req.access_token.trim())
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok(Json(DriveConnectionView::from(&conn)))
}

/// GET /api/drive/connection
pub async fn get_connection(
    State(pool): State<PgPool>,
    ctx: TenantContext,
) -> Result<Json<DriveConnectionView>, ApiError> {
    let conn = PostgresDriveRepository::new(pool)
        .find_connection(ctx.tenant_id)
        .await
        .map_err(ApiError::internal_server_error)?
        .ok_or(DriveError::NotConnected)?;

    Ok(Json(DriveConnectionView::from(&conn)))
}

/// Pull the connected folder into the asset library
///
/// POST /api/drive/sync
pub async fn sync_folder(
    State(pool): State<PgPool>,
    ctx: TenantContext,
) -> Result<Json<IngestSummary>, ApiError> {
    ctx.require_writer()?;

    let sync = DriveSync::new(
        Arc::new(PostgresDriveRepository::new(pool)),
        Arc::new(DriveClient::new()),
    );

    Ok(Json(sync.sync(ctx.tenant_id).await?))
}

/// GET /api/drive/assets?kind=
pub async fn list_assets(
    State(pool): State<PgPool>,
    ctx: TenantContext,
    Query(params): Query<AssetQuery>,
) -> Result<Json<Vec<DriveAsset>>, ApiError> {
    let assets = PostgresDriveRepository::new(pool)
        .list_assets(ctx.tenant_id, params.kind)
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok(Json(assets))
}
