use axum::{
    extract::{Path, State},
    Json,
};
use sqlx::PgPool;

use crate::api::errors::ApiError;
use crate::domain::contact::{
    classify_keyword, normalize_phone_e164, ContactConsent, InboundSms, InboundSmsReply,
};
use crate::domain::repositories::{ConsentRepository, TenantRepository};
use crate::infrastructure::repositories::{PostgresConsentRepository, PostgresTenantRepository};

const DEFAULT_COUNTRY_CODE: &str = "1";

/// Record compliance keywords from an inbound SMS
///
/// Opt-out and opt-in keywords update the consent table; anything else is
/// only classified.
///
/// POST /api/sms/inbound/:tenant_slug
pub async fn inbound_sms(
    State(pool): State<PgPool>,
    Path(tenant_slug): Path<String>,
    Json(msg): Json<InboundSms>,
) -> Result<Json<InboundSmsReply>, ApiError> {
    let tenant = PostgresTenantRepository::new(pool.clone())
        .find_by_slug(tenant_slug.trim())
        .await
        .map_err(ApiError::internal_server_error)?
        .ok_or_else(|| ApiError::not_found("Unknown tenant"))?;

    let phone = normalize_phone_e164(&msg.from, DEFAULT_COUNTRY_CODE)?;
    let keyword = classify_keyword(&msg.body);

    let opted_out = match ContactConsent::from_keyword(tenant.id, &phone, &msg.body, keyword) {
        Some(consent) => {
            PostgresConsentRepository::new(pool)
                .upsert(&consent)
                .await
                .map_err(ApiError::internal_server_error)?;
            tracing::info!(tenant = %tenant.slug, opted_out = consent.opted_out, "Recorded SMS consent change");
            Some(consent.opted_out)
        }
        None => None,
    };

    Ok(Json(InboundSmsReply {
        phone,
        keyword,
        opted_out,
    }))
}
