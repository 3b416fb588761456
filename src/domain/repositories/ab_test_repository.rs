use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ab_test::results::VariantStats;
use crate::domain::ab_test::{AbTest, AbVariant, ShippingAttribution};

/// Repository trait for shipping A/B tests
#[async_trait]
pub trait AbTestRepository: Send + Sync {
    /// Insert a test and its variants in one transaction
    async fn create(&self, test: &AbTest, variants: &[AbVariant]) -> Result<(), String>;

    /// Find a test by ID, regardless of tenant
    async fn find_by_id(&self, id: Uuid) -> Result<Option<(AbTest, Vec<AbVariant>)>, String>;

    async fn find_for_tenant(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<(AbTest, Vec<AbVariant>)>, String>;

    async fn list_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<AbTest>, String>;

    /// Persist status and lifecycle timestamps
    async fn update_status(&self, test: &AbTest) -> Result<(), String>;

    /// Record a visitor's variant unless one is already stored
    ///
    /// Returns the variant id actually stored for the visitor.
    async fn assign_visitor(&self, test_id: Uuid, visitor_id: &str, variant_id: Uuid) -> Result<Uuid, String>;

    /// Record an attribution once per order
    ///
    /// Returns false when the order was already attributed.
    async fn record_attribution(&self, attribution: &ShippingAttribution) -> Result<bool, String>;

    /// Per-variant visitor and order aggregates
    async fn variant_stats(&self, test_id: Uuid) -> Result<Vec<VariantStats>, String>;
}
