use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::feed::{FeedProduct, FeedSettings};

/// Read access to the tenant catalog used for feeds
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn feed_settings(&self, tenant_id: Uuid) -> Result<Option<FeedSettings>, String>;

    async fn list_products(&self, tenant_id: Uuid) -> Result<Vec<FeedProduct>, String>;
}
