use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::video::{ReactionCount, ReactionToggle, Video, VideoComment};

/// Repository trait for videos, comments and reactions
#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create(&self, video: &Video) -> Result<(), String>;

    /// Find by ID across tenants (webhooks carry no tenant)
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>, String>;

    async fn find_for_tenant(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Video>, String>;

    async fn find_by_upload_id(&self, upload_id: &str) -> Result<Option<Video>, String>;

    async fn find_by_asset_id(&self, asset_id: &str) -> Result<Option<Video>, String>;

    async fn list_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<Video>, String>;

    /// Persist Mux state fields and status
    async fn update(&self, video: &Video) -> Result<(), String>;

    async fn add_comment(&self, comment: &VideoComment) -> Result<(), String>;

    async fn find_comment(&self, id: Uuid) -> Result<Option<VideoComment>, String>;

    async fn list_comments(&self, video_id: Uuid) -> Result<Vec<VideoComment>, String>;

    /// Soft delete a comment written by `author_id`; false when nothing matched
    async fn soft_delete_comment(&self, id: Uuid, author_id: Uuid) -> Result<bool, String>;

    async fn toggle_reaction(&self, video_id: Uuid, user_id: Uuid, emoji: &str) -> Result<ReactionToggle, String>;

    async fn reaction_counts(&self, video_id: Uuid, user_id: Uuid) -> Result<Vec<ReactionCount>, String>;
}
