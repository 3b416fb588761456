use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::config::AppConfig;
use crate::domain::repositories::VideoRepository;
use crate::domain::video::webhook::{DEFAULT_TOLERANCE_SECS, SIGNATURE_HEADER};
use crate::domain::video::{apply_event, verify_webhook_signature, EventOutcome, MuxWebhookEvent, Video};
use crate::infrastructure::repositories::PostgresVideoRepository;

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    pub applied: bool,
}

/// Finds the video an event refers to
///
/// Passthrough (the video id) is tried first, then the upload id, then the asset id.
async fn locate_video(
    repo: &PostgresVideoRepository,
    event: &MuxWebhookEvent,
) -> Result<Option<Video>, String> {
    let data = &event.data;

    if let Some(id) = data.passthrough().and_then(|p| Uuid::parse_str(p).ok()) {
        if let Some(video) = repo.find_by_id(id).await? {
            return Ok(Some(video));
        }
    }

    let upload_id = if event.event_type.starts_with("video.upload.") {
        Some(data.id.as_str())
    } else {
        data.upload_id.as_deref()
    };
    if let Some(upload_id) = upload_id {
        if let Some(video) = repo.find_by_upload_id(upload_id).await? {
            return Ok(Some(video));
        }
    }

    let asset_id = if event.event_type.starts_with("video.asset.") {
        Some(data.id.as_str())
    } else {
        data.asset_id.as_deref()
    };
    match asset_id {
        Some(asset_id) => repo.find_by_asset_id(asset_id).await,
        None => Ok(None),
    }
}

/// Receive a signed Mux webhook
///
/// Events for unknown videos or of unhandled types are acknowledged so Mux
/// stops redelivering them.
///
/// POST /api/webhooks/mux
pub async fn mux_webhook(
    State(pool): State<PgPool>,
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let secret = config
        .mux_webhook_secret
        .as_deref()
        .ok_or_else(|| ApiError::service_unavailable("Mux webhooks are not configured"))?;

    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    if let Err(e) = verify_webhook_signature(signature, &body, secret, Utc::now(), DEFAULT_TOLERANCE_SECS) {
        tracing::warn!(error = %e, "Rejected Mux webhook");
        return Err(e.into());
    }

    let event = MuxWebhookEvent::parse(&body)?;

    let repo = PostgresVideoRepository::new(pool);
    let Some(mut video) = locate_video(&repo, &event)
        .await
        .map_err(ApiError::internal_server_error)?
    else {
        tracing::warn!(event_id = %event.id, event_type = %event.event_type, "Mux event for unknown video");
        return Ok(Json(WebhookAck {
            received: true,
            applied: false,
        }));
    };

    let outcome = apply_event(&mut video, &event);
    if outcome == EventOutcome::Updated {
        repo.update(&video)
            .await
            .map_err(ApiError::internal_server_error)?;
        tracing::info!(video_id = %video.id, event_type = %event.event_type, status = %video.status, "Applied Mux event");
    } else {
        tracing::debug!(event_type = %event.event_type, "Ignored Mux event");
    }

    Ok(Json(WebhookAck {
        received: true,
        applied: outcome == EventOutcome::Updated,
    }))
}
