use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use sqlx::PgPool;

use crate::api::errors::ApiError;
use crate::domain::feed::{generate_feed, FeedError};
use crate::domain::repositories::{CatalogRepository, TenantRepository};
use crate::domain::tenant::TenantSlug;
use crate::infrastructure::repositories::{PostgresCatalogRepository, PostgresTenantRepository};

/// Google Merchant product feed for a store
///
/// The path segment is `<tenant_slug>.xml`.
///
/// GET /api/feeds/google/:file
pub async fn google_feed(
    State(pool): State<PgPool>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    let slug = file
        .strip_suffix(".xml")
        .and_then(|s| TenantSlug::new(s).ok())
        .ok_or_else(|| ApiError::not_found("Feed not found"))?;

    let tenant = PostgresTenantRepository::new(pool.clone())
        .find_by_slug(slug.as_str())
        .await
        .map_err(FeedError::Catalog)?
        .ok_or_else(|| FeedError::UnknownTenant(slug.as_str().to_string()))?;

    let catalog = PostgresCatalogRepository::new(pool);
    let settings = catalog
        .feed_settings(tenant.id)
        .await
        .map_err(FeedError::Catalog)?
        .ok_or(FeedError::NotConfigured)?;
    let products = catalog
        .list_products(tenant.id)
        .await
        .map_err(FeedError::Catalog)?;

    let report = generate_feed(&products, &settings);

    tracing::info!(
        tenant = %tenant.slug,
        included = report.included,
        skipped = report.skipped.len(),
        warnings = report.warnings.len(),
        "Generated Google Merchant feed"
    );
    for warning in &report.warnings {
        tracing::debug!(tenant = %tenant.slug, %warning, "Feed warning");
    }

    Ok((
        [
            (header::CONTENT_TYPE, "application/xml; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=900"),
        ],
        report.xml,
    )
        .into_response())
}
