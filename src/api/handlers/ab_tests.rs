use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::TenantContext;
use crate::domain::ab_test::assignment::assign_variant;
use crate::domain::ab_test::delivery::{filter_delivery_options, DeliveryCart, DeliveryOperation};
use crate::domain::ab_test::results::{compute_results, TestResults};
use crate::domain::ab_test::{
    attribute_shipping_order, AbTest, AbTestStatus, AbVariant, AttributionError, NewVariant,
    OrderForAttribution, ShippingAttribution, VariantSuffix,
};
use crate::domain::repositories::AbTestRepository;
use crate::infrastructure::repositories::PostgresAbTestRepository;

#[derive(Debug, Deserialize)]
pub struct CreateAbTestRequest {
    pub name: String,
    pub variants: Vec<NewVariant>,
}

#[derive(Debug, Serialize)]
pub struct AbTestResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub status: AbTestStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<AbVariant>>,
}

impl AbTestResponse {
    fn new(test: &AbTest, variants: Option<Vec<AbVariant>>) -> Self {
        Self {
            id: test.id(),
            tenant_id: test.tenant_id(),
            name: test.name().to_string(),
            status: test.status(),
            created_at: test.created_at(),
            started_at: test.started_at(),
            ended_at: test.ended_at(),
            variants,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AbTestStatus,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub visitor_id: String,
}

#[derive(Debug, Serialize)]
pub struct AssignResponse {
    pub test_id: Uuid,
    pub variant_id: Uuid,
    pub suffix: VariantSuffix,
    pub shipping_price: Decimal,
    /// Tag carried by this variant's shipping rate titles, e.g. `" (B)"`
    pub rate_title_tag: String,
}

#[derive(Debug, Serialize)]
pub struct AttributionResponse {
    pub recorded: bool,
    pub duplicate: bool,
    pub attribution: Option<ShippingAttribution>,
}

#[derive(Debug, Serialize)]
pub struct DeliveryFilterResponse {
    pub operations: Vec<DeliveryOperation>,
}

async fn load_for_tenant(
    repo: &PostgresAbTestRepository,
    tenant_id: Uuid,
    id: Uuid,
) -> Result<(AbTest, Vec<AbVariant>), ApiError> {
    repo.find_for_tenant(tenant_id, id)
        .await
        .map_err(ApiError::internal_server_error)?
        .ok_or_else(|| ApiError::not_found("A/B test not found"))
}

/// Create a draft shipping test
///
/// POST /api/ab-tests
pub async fn create_test(
    State(pool): State<PgPool>,
    ctx: TenantContext,
    Json(req): Json<CreateAbTestRequest>,
) -> Result<(StatusCode, Json<AbTestResponse>), ApiError> {
    ctx.require_manager()?;

    let (test, variants) = AbTest::new(ctx.tenant_id, req.name, req.variants)?;

    PostgresAbTestRepository::new(pool)
        .create(&test, &variants)
        .await
        .map_err(ApiError::internal_server_error)?;

    tracing::info!(test_id = %test.id(), tenant_id = %ctx.tenant_id, "Created shipping A/B test");
    Ok((StatusCode::CREATED, Json(AbTestResponse::new(&test, Some(variants)))))
}

/// GET /api/ab-tests
pub async fn list_tests(
    State(pool): State<PgPool>,
    ctx: TenantContext,
) -> Result<Json<Vec<AbTestResponse>>, ApiError> {
    let tests = PostgresAbTestRepository::new(pool)
        .list_for_tenant(ctx.tenant_id)
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok(Json(tests.iter().map(|t| AbTestResponse::new(t, None)).collect()))
}

/// GET /api/ab-tests/:id
pub async fn get_test(
    State(pool): State<PgPool>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<AbTestResponse>, ApiError> {
    let repo = PostgresAbTestRepository::new(pool);
    let (test, variants) = load_for_tenant(&repo, ctx.tenant_id, id).await?;

    Ok(Json(AbTestResponse::new(&test, Some(variants))))
}

/// Move a test through its lifecycle
///
/// POST /api/ab-tests/:id/status
pub async fn update_status(
    State(pool): State<PgPool>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<AbTestResponse>, ApiError> {
    ctx.require_manager()?;

    let repo = PostgresAbTestRepository::new(pool);
    let (mut test, variants) = load_for_tenant(&repo, ctx.tenant_id, id).await?;

    let previous = test.status();
    test.transition(req.status)?;
    repo.update_status(&test)
        .await
        .map_err(ApiError::internal_server_error)?;

    tracing::info!(test_id = %id, from = %previous, to = %test.status(), "A/B test status changed");
    Ok(Json(AbTestResponse::new(&test, Some(variants))))
}

/// Assign a storefront visitor to a variant
///
/// The first assignment is persisted and returned on every later call.
///
/// POST /api/ab-tests/:id/assign
pub async fn assign_visitor(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<AssignResponse>, ApiError> {
    let visitor_id = req.visitor_id.trim();
    if visitor_id.is_empty() || visitor_id.len() > 128 {
        return Err(ApiError::bad_request("visitor_id must be 1 to 128 characters"));
    }

    let repo = PostgresAbTestRepository::new(pool);
    let (test, variants) = repo
        .find_by_id(id)
        .await
        .map_err(ApiError::internal_server_error)?
        .ok_or_else(|| ApiError::not_found("A/B test not found"))?;

    test.ensure_running()?;

    let candidate = assign_variant(test.id(), visitor_id, &variants)
        .ok_or_else(|| ApiError::internal_server_error("Test has no variants"))?;

    let stored_id = repo
        .assign_visitor(test.id(), visitor_id, candidate.id)
        .await
        .map_err(ApiError::internal_server_error)?;

    let variant = variants
        .iter()
        .find(|v| v.id == stored_id)
        .ok_or_else(|| ApiError::internal_server_error("Stored variant no longer exists"))?;

    Ok(Json(AssignResponse {
        test_id: test.id(),
        variant_id: variant.id,
        suffix: variant.suffix,
        shipping_price: variant.shipping_price,
        rate_title_tag: variant.suffix.rate_title_tag(),
    }))
}

/// GET /api/ab-tests/:id/results
pub async fn get_results(
    State(pool): State<PgPool>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<TestResults>, ApiError> {
    let repo = PostgresAbTestRepository::new(pool);
    let (test, _) = load_for_tenant(&repo, ctx.tenant_id, id).await?;

    let stats = repo
        .variant_stats(test.id())
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok(Json(compute_results(test.id(), stats)))
}

/// Attribute a paid order to the variant recorded on it
///
/// Orders outside any test are acknowledged without a write so the order
/// webhook does not retry them.
///
/// POST /api/ab-tests/shipping/attribute
pub async fn attribute_order(
    State(pool): State<PgPool>,
    ctx: TenantContext,
    Json(order): Json<OrderForAttribution>,
) -> Result<Json<AttributionResponse>, ApiError> {
    let Some(test_id) = order.test_id()? else {
        return Ok(Json(AttributionResponse {
            recorded: false,
            duplicate: false,
            attribution: None,
        }));
    };

    let repo = PostgresAbTestRepository::new(pool);
    let (test, variants) = load_for_tenant(&repo, ctx.tenant_id, test_id).await?;

    let attribution = match attribute_shipping_order(&order, &test, &variants) {
        Ok(attribution) => attribution,
        Err(AttributionError::NotInTest) => {
            return Ok(Json(AttributionResponse {
                recorded: false,
                duplicate: false,
                attribution: None,
            }))
        }
        Err(e) => return Err(e.into()),
    };

    let inserted = repo
        .record_attribution(&attribution)
        .await
        .map_err(ApiError::internal_server_error)?;

    if !inserted {
        tracing::debug!(order_id = %order.order_id, %test_id, "Order already attributed");
    }

    Ok(Json(AttributionResponse {
        recorded: inserted,
        duplicate: !inserted,
        attribution: Some(attribution),
    }))
}

/// Hide delivery options that belong to other variants
///
/// POST /api/ab-tests/shipping/delivery-filter
pub async fn delivery_filter(Json(cart): Json<DeliveryCart>) -> Json<DeliveryFilterResponse> {
    Json(DeliveryFilterResponse {
        operations: filter_delivery_options(&cart),
    })
}
