use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::ab_test::results::VariantStats;
use crate::domain::ab_test::{AbTest, AbTestStatus, AbVariant, ShippingAttribution, VariantSuffix};
use crate::domain::repositories::AbTestRepository;

#[derive(sqlx::FromRow)]
struct AbTestRow {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    status: AbTestStatus,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl From<AbTestRow> for AbTest {
    fn from(r: AbTestRow) -> Self {
        AbTest::from_persistence(r.id, r.tenant_id, r.name, r.status, r.created_at, r.started_at, r.ended_at)
    }
}

#[derive(sqlx::FromRow)]
struct VariantRow {
    id: Uuid,
    test_id: Uuid,
    name: String,
    suffix: String,
    shipping_price: Decimal,
    traffic_weight: i32,
    is_control: bool,
}

impl TryFrom<VariantRow> for AbVariant {
    type Error = String;

    fn try_from(r: VariantRow) -> Result<Self, Self::Error> {
        Ok(AbVariant {
            id: r.id,
            test_id: r.test_id,
            name: r.name,
            suffix: VariantSuffix::parse(&r.suffix)?,
            shipping_price: r.shipping_price,
            traffic_weight: r.traffic_weight,
            is_control: r.is_control,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    variant_id: Uuid,
    name: String,
    suffix: String,
    is_control: bool,
    visitors: i64,
    orders: i64,
    product_revenue: Decimal,
    shipping_revenue: Decimal,
    net_revenue: Decimal,
    mismatches: i64,
}

/// PostgreSQL implementation of AbTestRepository
pub struct PostgresAbTestRepository {
    pool: PgPool,
}

impl PostgresAbTestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_variants(&self, test_id: Uuid) -> Result<Vec<AbVariant>, String> {
        let rows = sqlx::query_as::<_, VariantRow>(
            r#"
            SELECT id, test_id, name, suffix, shipping_price, traffic_weight, is_control
            FROM ab_variants
            WHERE test_id = $1
            ORDER BY suffix
            "#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| format!("Failed to load variants: {}", e))?;

        rows.into_iter().map(AbVariant::try_from).collect()
    }

    async fn load(&self, row: Option<AbTestRow>) -> Result<Option<(AbTest, Vec<AbVariant>)>, String> {
        match row {
            Some(row) => {
                let variants = self.load_variants(row.id).await?;
                Ok(Some((row.into(), variants)))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl AbTestRepository for PostgresAbTestRepository {
    async fn create(&self, test: &AbTest, variants: &[AbVariant]) -> Result<(), String> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| format!("Failed to begin transaction: {}", e))?;

        sqlx::query(
            r#"
            INSERT INTO ab_tests (id, tenant_id, name, status, created_at, started_at, ended_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(test.id())
        .bind(test.tenant_id())
        .bind(test.name())
        .bind(test.status())
        .bind(test.created_at())
        .bind(test.started_at())
        .bind(test.ended_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| format!("Failed to create test: {}", e))?;

        for variant in variants {
            sqlx::query(
                r#"
                INSERT INTO ab_variants (id, test_id, name, suffix, shipping_price, traffic_weight, is_control)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(variant.id)
            .bind(variant.test_id)
            .bind(&variant.name)
            .bind(variant.suffix.to_string())
            .bind(variant.shipping_price)
            .bind(variant.traffic_weight)
            .bind(variant.is_control)
            .execute(&mut *tx)
            .await
            .map_err(|e| format!("Failed to create variant: {}", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| format!("Failed to commit test: {}", e))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<(AbTest, Vec<AbVariant>)>, String> {
        let row = sqlx::query_as::<_, AbTestRow>(
            r#"
            SELECT id, tenant_id, name, status, created_at, started_at, ended_at
            FROM ab_tests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| format!("Failed to find test: {}", e))?;

        self.load(row).await
    }

    async fn find_for_tenant(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<(AbTest, Vec<AbVariant>)>, String> {
        let row = sqlx::query_as::<_, AbTestRow>(
            r#"
            SELECT id, tenant_id, name, status, created_at, started_at, ended_at
            FROM ab_tests
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| format!("Failed to find test: {}", e))?;

        self.load(row).await
    }

    async fn list_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<AbTest>, String> {
        let rows = sqlx::query_as::<_, AbTestRow>(
            r#"
            SELECT id, tenant_id, name, status, created_at, started_at, ended_at
            FROM ab_tests
            WHERE tenant_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| format!("Failed to list tests: {}", e))?;

        Ok(rows.into_iter().map(AbTest::from).collect())
    }

    async fn update_status(&self, test: &AbTest) -> Result<(), String> {
        sqlx::query(
            r#"
            UPDATE ab_tests
            SET status = $2, started_at = $3, ended_at = $4
            WHERE id = $1
            "#,
        )
        .bind(test.id())
        .bind(test.status())
        .bind(test.started_at())
        .bind(test.ended_at())
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to update test status: {}", e))?;

        Ok(())
    }

    async fn assign_visitor(&self, test_id: Uuid, visitor_id: &str, variant_id: Uuid) -> Result<Uuid, String> {
        sqlx::query(
            r#"
            INSERT INTO ab_visitors (test_id, visitor_id, variant_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (test_id, visitor_id) DO NOTHING
            "#,
        )
        .bind(test_id)
        .bind(visitor_id)
        .bind(variant_id)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to assign visitor: {}", e))?;

        sqlx::query_scalar::<_, Uuid>(
            "SELECT variant_id FROM ab_visitors WHERE test_id = $1 AND visitor_id = $2",
        )
        .bind(test_id)
        .bind(visitor_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| format!("Failed to read visitor assignment: {}", e))
    }

    async fn record_attribution(&self, a: &ShippingAttribution) -> Result<bool, String> {
        let result = sqlx::query(
            r#"
            INSERT INTO ab_shipping_attributions (
                id, test_id, variant_id, order_id, product_revenue,
                expected_shipping_price, actual_shipping_price, net_revenue,
                is_mismatch, currency
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (test_id, order_id) DO NOTHING
            "#,
        )
        .bind(a.id)
        .bind(a.test_id)
        .bind(a.variant_id)
        .bind(&a.order_id)
        .bind(a.product_revenue)
        .bind(a.expected_shipping_price)
        .bind(a.actual_shipping_price)
        .bind(a.net_revenue)
        .bind(a.is_mismatch)
        .bind(&a.currency)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to record attribution: {}", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn variant_stats(&self, test_id: Uuid) -> Result<Vec<VariantStats>, String> {
        let rows = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT
                v.id AS variant_id,
                v.name,
                v.suffix,
                v.is_control,
                (SELECT COUNT(*) FROM ab_visitors vi WHERE vi.variant_id = v.id) AS visitors,
                COUNT(a.id) AS orders,
                COALESCE(SUM(a.product_revenue), 0) AS product_revenue,
                COALESCE(SUM(a.actual_shipping_price), 0) AS shipping_revenue,
                COALESCE(SUM(a.net_revenue), 0) AS net_revenue,
                COUNT(a.id) FILTER (WHERE a.is_mismatch) AS mismatches
            FROM ab_variants v
            LEFT JOIN ab_shipping_attributions a ON a.variant_id = v.id
            WHERE v.test_id = $1
            GROUP BY v.id, v.name, v.suffix, v.is_control
            ORDER BY v.suffix
            "#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| format!("Failed to compute variant stats: {}", e))?;

        rows.into_iter()
            .map(|r| {
                Ok(VariantStats {
                    variant_id: r.variant_id,
                    name: r.name,
                    suffix: VariantSuffix::parse(&r.suffix)?,
                    is_control: r.is_control,
                    visitors: r.visitors,
                    orders: r.orders,
                    product_revenue: r.product_revenue,
                    shipping_revenue: r.shipping_revenue,
                    net_revenue: r.net_revenue,
                    mismatches: r.mismatches,
                })
            })
            .collect()
    }
}
