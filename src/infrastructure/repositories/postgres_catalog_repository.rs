use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::feed::{FeedProduct, FeedSettings};
use crate::domain::repositories::CatalogRepository;

/// PostgreSQL implementation of CatalogRepository
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn feed_settings(&self, tenant_id: Uuid) -> Result<Option<FeedSettings>, String> {
        sqlx::query_as::<_, FeedSettings>(
            r#"
            SELECT store_url, store_name, default_brand, include_out_of_stock
            FROM tenant_feed_settings
            WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| format!("Failed to load feed settings: {}", e))
    }

    async fn list_products(&self, tenant_id: Uuid) -> Result<Vec<FeedProduct>, String> {
        sqlx::query_as::<_, FeedProduct>(
            r#"
            SELECT
                id, variant_id, item_group_id, title, description, handle,
                price, compare_at_price, currency, image_url, additional_images,
                gtin, mpn, brand, inventory_quantity, inventory_policy_continue,
                status, product_type, google_product_category, condition, weight_grams
            FROM products
            WHERE tenant_id = $1
            ORDER BY id
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| format!("Failed to load products: {}", e))
    }
}
