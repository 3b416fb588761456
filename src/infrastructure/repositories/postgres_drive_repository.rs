use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::drive::{AssetKind, DriveAsset, DriveConnection, UpsertOutcome};
use crate::domain::repositories::DriveRepository;

const CONNECTION_COLUMNS: &str =
    "tenant_id, folder_id, access_token, needs_reauth, last_synced_at, last_error, updated_at";

const ASSET_COLUMNS: &str = r#"
    id, tenant_id, drive_file_id, name, mime_type, kind, size_bytes, modified_time,
    web_view_link, thumbnail_link, md5_checksum, ingested_at
"#;

/// PostgreSQL implementation of DriveRepository
pub struct PostgresDriveRepository {
    pool: PgPool,
}

impl PostgresDriveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DriveRepository for PostgresDriveRepository {
    async fn upsert_connection(&self, tenant_id: Uuid, folder_id: &str, access_token: &str) -> Result<DriveConnection, String> {
        let sql = format!(
            r#"
            INSERT INTO drive_connections (tenant_id, folder_id, access_token)
            VALUES ($1, $2, $3)
            ON CONFLICT (tenant_id) DO UPDATE SET
                folder_id = EXCLUDED.folder_id,
                access_token = EXCLUDED.access_token,
                needs_reauth = FALSE,
                last_error = NULL,
                updated_at = NOW()
            RETURNING {}
            "#,
            CONNECTION_COLUMNS
        );

        sqlx::query_as::<_, DriveConnection>(&sql)
            .bind(tenant_id)
            .bind(folder_id)
            .bind(access_token)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| format!("Failed to save drive connection: {}", e))
    }

    async fn find_connection(&self, tenant_id: Uuid) -> Result<Option<DriveConnection>, String> {
        let sql = format!(
            "SELECT {} FROM drive_connections WHERE tenant_id = $1",
            CONNECTION_COLUMNS
        );

        sqlx::query_as::<_, DriveConnection>(&sql)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| format!("Failed to load drive connection: {}", e))
    }

    async fn mark_needs_reauth(&self, tenant_id: Uuid, error: &str) -> Result<(), String> {
        sqlx::query(
            r#"
            UPDATE drive_connections
            SET needs_reauth = TRUE, last_error = $2, updated_at = NOW()
            WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to flag drive connection: {}", e))?;

        Ok(())
    }

    async fn record_sync_error(&self, tenant_id: Uuid, error: &str) -> Result<(), String> {
        sqlx::query("UPDATE drive_connections SET last_error = $2, updated_at = NOW() WHERE tenant_id = $1")
            .bind(tenant_id)
            .bind(error)
            .execute(&self.pool)
            .await
            .map_err(|e| format!("Failed to record drive sync error: {}", e))?;

        Ok(())
    }

    async fn mark_synced(&self, tenant_id: Uuid) -> Result<(), String> {
        sqlx::query(
            r#"
            UPDATE drive_connections
            SET last_synced_at = NOW(), last_error = NULL, updated_at = NOW()
            WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to stamp drive sync: {}", e))?;

        Ok(())
    }

    async fn upsert_asset(&self, asset: &DriveAsset) -> Result<UpsertOutcome, String> {
        // xmax = 0 only for freshly inserted rows; no row back means unchanged
        let inserted = sqlx::query_scalar::<_, bool>(
            r#"
            INSERT INTO drive_assets (
                id, tenant_id, drive_file_id, name, mime_type, kind, size_bytes,
                modified_time, web_view_link, thumbnail_link, md5_checksum, ingested_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (tenant_id, drive_file_id) DO UPDATE SET
                name = EXCLUDED.name,
                mime_type = EXCLUDED.mime_type,
                kind = EXCLUDED.kind,
                size_bytes = EXCLUDED.size_bytes,
                modified_time = EXCLUDED.modified_time,
                web_view_link = EXCLUDED.web_view_link,
                thumbnail_link = EXCLUDED.thumbnail_link,
                md5_checksum = EXCLUDED.md5_checksum,
                ingested_at = EXCLUDED.ingested_at
            WHERE drive_assets.modified_time < EXCLUDED.modified_time
            RETURNING (xmax = 0)
            "#,
        )
        .bind(asset.id)
        .bind(asset.tenant_id)
        .bind(&asset.drive_file_id)
        .bind(&asset.name)
        .bind(&asset.mime_type)
        .bind(asset.kind)
        .bind(asset.size_bytes)
        .bind(asset.modified_time)
        .bind(&asset.web_view_link)
        .bind(&asset.thumbnail_link)
        .bind(&asset.md5_checksum)
        .bind(asset.ingested_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| format!("Failed to upsert drive asset: {}", e))?;

        Ok(match inserted {
            Some(true) => UpsertOutcome::Inserted,
            Some(false) => UpsertOutcome::Updated,
            None => UpsertOutcome::Unchanged,
        })
    }

    async fn list_assets(&self, tenant_id: Uuid, kind: Option<AssetKind>) -> Result<Vec<DriveAsset>, String> {
        let sql = format!(
            r#"
            SELECT {}
            FROM drive_assets
            WHERE tenant_id = $1 AND ($2::asset_kind IS NULL OR kind = $2)
            ORDER BY modified_time DESC
            "#,
            ASSET_COLUMNS
        );

        sqlx::query_as::<_, DriveAsset>(&sql)
            .bind(tenant_id)
            .bind(kind)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| format!("Failed to list drive assets: {}", e))
    }
}
