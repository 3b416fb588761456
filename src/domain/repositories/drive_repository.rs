use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::drive::{AssetKind, DriveAsset, DriveConnection, UpsertOutcome};

/// Repository trait for Drive connections and ingested assets
#[async_trait]
pub trait DriveRepository: Send + Sync {
    /// Store a folder and token; clears any re-auth flag
    async fn upsert_connection(&self, tenant_id: Uuid, folder_id: &str, access_token: &str) -> Result<DriveConnection, String>;

    async fn find_connection(&self, tenant_id: Uuid) -> Result<Option<DriveConnection>, String>;

    async fn mark_needs_reauth(&self, tenant_id: Uuid, error: &str) -> Result<(), String>;

    async fn record_sync_error(&self, tenant_id: Uuid, error: &str) -> Result<(), String>;

    async fn mark_synced(&self, tenant_id: Uuid) -> Result<(), String>;

    /// Insert or refresh an asset; rows only change when Drive's copy is newer
    async fn upsert_asset(&self, asset: &DriveAsset) -> Result<UpsertOutcome, String>;

    async fn list_assets(&self, tenant_id: Uuid, kind: Option<AssetKind>) -> Result<Vec<DriveAsset>, String>;
}
