use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::webhook::MuxWebhookEvent;
use crate::domain::validation::ValidationErrors;

pub const MAX_TITLE_LENGTH: usize = 200;

/// Processing state of a hosted video
///
/// # Status Transitions
/// ```text
/// Uploading -> Processing -> Ready
///     |            |          |
///     +--------> Errored      +-> Deleted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "video_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Uploading,
    Processing,
    Ready,
    Errored,
    Deleted,
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoStatus::Uploading => write!(f, "uploading"),
            VideoStatus::Processing => write!(f, "processing"),
            VideoStatus::Ready => write!(f, "ready"),
            VideoStatus::Errored => write!(f, "errored"),
            VideoStatus::Deleted => write!(f, "deleted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Video {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub status: VideoStatus,
    pub mux_upload_id: Option<String>,
    pub mux_asset_id: Option<String>,
    pub playback_id: Option<String>,
    pub duration_seconds: Option<f64>,
    pub error_message: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    /// Creates a video awaiting its direct upload
    ///
    /// The id doubles as the Mux passthrough value.
    pub fn new(tenant_id: Uuid, title: &str, created_by: Uuid) -> Result<Self, ValidationErrors> {
        let title = title.trim();
        let mut errors = ValidationErrors::new();
        errors.check(!title.is_empty(), "Title is required");
        errors.check(
            title.chars().count() <= MAX_TITLE_LENGTH,
            format!("Title must be at most {} characters", MAX_TITLE_LENGTH),
        );
        errors.into_result()?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            tenant_id,
            title: title.to_string(),
            status: VideoStatus::Uploading,
            mux_upload_id: None,
            mux_asset_id: None,
            playback_id: None,
            duration_seconds: None,
            error_message: None,
            created_by: Some(created_by),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn passthrough(&self) -> String {
        self.id.to_string()
    }
}

/// Result of applying a webhook event to a video
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Updated,
    Ignored,
}

/// Applies a Mux event to the video, returning whether anything changed
///
/// Unknown event types leave the video untouched.
pub fn apply_event(video: &mut Video, event: &MuxWebhookEvent) -> EventOutcome {
    let data = &event.data;

    match event.event_type.as_str() {
        "video.upload.asset_created" => {
            video.mux_asset_id = data.asset_id.clone().or_else(|| video.mux_asset_id.clone());
            if video.mux_upload_id.is_none() {
                video.mux_upload_id = Some(data.id.clone());
            }
            video.status = VideoStatus::Processing;
        }
        "video.asset.ready" => {
            video.mux_asset_id = Some(data.id.clone());
            if let Some(upload_id) = &data.upload_id {
                video.mux_upload_id = Some(upload_id.clone());
            }
            video.playback_id = data
                .playback_ids
                .iter()
                .find(|p| p.policy == "public")
                .map(|p| p.id.clone());
            video.duration_seconds = data.duration;
            video.error_message = None;
            video.status = VideoStatus::Ready;
        }
        "video.asset.errored" => {
            video.mux_asset_id = Some(data.id.clone());
            let message = data
                .errors
                .as_ref()
                .map(|e| e.messages.join("; "))
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Asset processing failed".to_string());
            video.error_message = Some(message);
            video.status = VideoStatus::Errored;
        }
        "video.asset.deleted" => {
            video.status = VideoStatus::Deleted;
        }
        "video.upload.cancelled" => {
            video.error_message = Some("Upload cancelled".to_string());
            video.status = VideoStatus::Errored;
        }
        "video.upload.errored" => {
            let message = data
                .errors
                .as_ref()
                .map(|e| e.messages.join("; "))
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Upload failed".to_string());
            video.error_message = Some(message);
            video.status = VideoStatus::Errored;
        }
        _ => return EventOutcome::Ignored,
    }

    video.updated_at = Utc::now();
    EventOutcome::Updated
}
