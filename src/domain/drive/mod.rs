// Google Drive asset ingestion domain module
// Connection state, MIME classification and sync bookkeeping

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::validation::ValidationErrors;

pub const GOOGLE_DOC_MIME: &str = "application/vnd.google-apps.document";
pub const GOOGLE_SLIDES_MIME: &str = "application/vnd.google-apps.presentation";
pub const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DriveError {
    #[error("Drive connection not found")]
    NotConnected,

    #[error("Drive access token was rejected; reconnect the folder")]
    Unauthorized,

    #[error("Drive connection needs to be re-authorized")]
    NeedsReauth,

    #[error("Drive API rate limit reached")]
    RateLimited,

    #[error("Drive API error: {0}")]
    Api(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "asset_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Video,
    Audio,
    Document,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Image => write!(f, "image"),
            AssetKind::Video => write!(f, "video"),
            AssetKind::Audio => write!(f, "audio"),
            AssetKind::Document => write!(f, "document"),
        }
    }
}

/// Maps a Drive MIME type to an asset kind
///
/// Folders, shortcuts and unsupported files return `None` and are skipped.
///
/// # Example
/// ```
/// use cgk_platform_api::domain::drive::{classify_mime, AssetKind};
///
/// assert_eq!(classify_mime("image/png"), Some(AssetKind::Image));
/// assert_eq!(classify_mime("application/vnd.google-apps.folder"), None);
/// ```
pub fn classify_mime(mime: &str) -> Option<AssetKind> {
    let mime = mime.trim().to_ascii_lowercase();
    if mime.starts_with("image/") {
        Some(AssetKind::Image)
    } else if mime.starts_with("video/") {
        Some(AssetKind::Video)
    } else if mime.starts_with("audio/") {
        Some(AssetKind::Audio)
    } else if mime == PDF_MIME || mime == GOOGLE_DOC_MIME || mime == GOOGLE_SLIDES_MIME {
        Some(AssetKind::Document)
    } else {
        None
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DriveConnection {
    pub tenant_id: Uuid,
    pub folder_id: String,
    pub access_token: String,
    pub needs_reauth: bool,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Connection details safe to return to clients
#[derive(Debug, Clone, Serialize)]
pub struct DriveConnectionView {
    pub folder_id: String,
    pub connected: bool,
    pub needs_reauth: bool,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl From<&DriveConnection> for DriveConnectionView {
    fn from(conn: &DriveConnection) -> Self {
        Self {
            folder_id: conn.folder_id.clone(),
            connected: !conn.access_token.is_empty(),
            needs_reauth: conn.needs_reauth,
            last_synced_at: conn.last_synced_at,
            last_error: conn.last_error.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectDrive {
    pub folder_id: String,
    pub access_token: String,
}

impl ConnectDrive {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(!self.folder_id.trim().is_empty(), "Folder id is required");
        errors.check(
            !self.folder_id.contains('\''),
            "Folder id contains invalid characters",
        );
        errors.check(!self.access_token.trim().is_empty(), "Access token is required");
        errors.into_result()
    }
}

/// A file as listed by the Drive v3 API
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    /// Drive reports sizes as decimal strings
    pub size: Option<String>,
    pub modified_time: DateTime<Utc>,
    pub web_view_link: Option<String>,
    pub md5_checksum: Option<String>,
    pub thumbnail_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct DriveAsset {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub drive_file_id: String,
    pub name: String,
    pub mime_type: String,
    pub kind: AssetKind,
    pub size_bytes: Option<i64>,
    pub modified_time: DateTime<Utc>,
    pub web_view_link: Option<String>,
    pub thumbnail_link: Option<String>,
    pub md5_checksum: Option<String>,
    pub ingested_at: DateTime<Utc>,
}

impl DriveAsset {
    /// Builds an asset row from a listed file, if its type is supported
    pub fn from_file(tenant_id: Uuid, file: &DriveFile) -> Option<Self> {
        let kind = classify_mime(&file.mime_type)?;
        Some(Self {
            id: Uuid::new_v4(),
            tenant_id,
            drive_file_id: file.id.clone(),
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            kind,
            size_bytes: file.size.as_deref().and_then(|s| s.parse().ok()),
            modified_time: file.modified_time,
            web_view_link: file.web_view_link.clone(),
            thumbnail_link: file.thumbnail_link.clone(),
            md5_checksum: file.md5_checksum.clone(),
            ingested_at: Utc::now(),
        })
    }
}

/// Source of folder listings, implemented by the Drive API client
#[async_trait]
pub trait DriveFileSource: Send + Sync {
    async fn list_folder(
        &self,
        access_token: &str,
        folder_id: &str,
        page_token: Option<&str>,
    ) -> Result<DriveFileList, DriveError>;
}

/// What the repository did with an upserted asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub discovered: usize,
    pub ingested: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

impl IngestSummary {
    pub fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted | UpsertOutcome::Updated => self.ingested += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
        }
    }
}
