use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::repositories::VideoRepository;
use crate::domain::video::{ReactionCount, ReactionToggle, Video, VideoComment};

const VIDEO_COLUMNS: &str = r#"
    id, tenant_id, title, status, mux_upload_id, mux_asset_id, playback_id,
    duration_seconds, error_message, created_by, created_at, updated_at
"#;

const COMMENT_COLUMNS: &str =
    "id, video_id, author_id, parent_id, body, timestamp_seconds, created_at, deleted_at";

/// PostgreSQL implementation of VideoRepository
pub struct PostgresVideoRepository {
    pool: PgPool,
}

impl PostgresVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_where(&self, condition: &str, value: &str) -> Result<Option<Video>, String> {
        let sql = format!("SELECT {} FROM videos WHERE {} = $1", VIDEO_COLUMNS, condition);
        sqlx::query_as::<_, Video>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| format!("Failed to find video by {}: {}", condition, e))
    }
}

#[async_trait]
impl VideoRepository for PostgresVideoRepository {
    async fn create(&self, video: &Video) -> Result<(), String> {
        sqlx::query(
            r#"
            INSERT INTO videos (
                id, tenant_id, title, status, mux_upload_id, mux_asset_id, playback_id,
                duration_seconds, error_message, created_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(video.id)
        .bind(video.tenant_id)
        .bind(&video.title)
        .bind(video.status)
        .bind(&video.mux_upload_id)
        .bind(&video.mux_asset_id)
        .bind(&video.playback_id)
        .bind(video.duration_seconds)
        .bind(&video.error_message)
        .bind(video.created_by)
        .bind(video.created_at)
        .bind(video.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create video: {}", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>, String> {
        let sql = format!("SELECT {} FROM videos WHERE id = $1", VIDEO_COLUMNS);
        sqlx::query_as::<_, Video>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| format!("Failed to find video: {}", e))
    }

    async fn find_for_tenant(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Video>, String> {
        let sql = format!(
            "SELECT {} FROM videos WHERE id = $1 AND tenant_id = $2",
            VIDEO_COLUMNS
        );
        sqlx::query_as::<_, Video>(&sql)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| format!("Failed to find video: {}", e))
    }

    async fn find_by_upload_id(&self, upload_id: &str) -> Result<Option<Video>, String> {
        self.find_where("mux_upload_id", upload_id).await
    }

    async fn find_by_asset_id(&self, asset_id: &str) -> Result<Option<Video>, String> {
        self.find_where("mux_asset_id", asset_id).await
    }

    async fn list_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<Video>, String> {
        let sql = format!(
            r#"
            SELECT {}
            FROM videos
            WHERE tenant_id = $1 AND status <> 'deleted'
            ORDER BY created_at DESC
            "#,
            VIDEO_COLUMNS
        );
        sqlx::query_as::<_, Video>(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| format!("Failed to list videos: {}", e))
    }

    async fn update(&self, video: &Video) -> Result<(), String> {
        sqlx::query(
            r#"
            UPDATE videos
            SET status = $2, mux_upload_id = $3, mux_asset_id = $4, playback_id = $5,
                duration_seconds = $6, error_message = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(video.id)
        .bind(video.status)
        .bind(&video.mux_upload_id)
        .bind(&video.mux_asset_id)
        .bind(&video.playback_id)
        .bind(video.duration_seconds)
        .bind(&video.error_message)
        .bind(video.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to update video: {}", e))?;

        Ok(())
    }

    async fn add_comment(&self, comment: &VideoComment) -> Result<(), String> {
        sqlx::query(
            r#"
            INSERT INTO video_comments (
                id, video_id, author_id, parent_id, body, timestamp_seconds, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(comment.id)
        .bind(comment.video_id)
        .bind(comment.author_id)
        .bind(comment.parent_id)
        .bind(&comment.body)
        .bind(comment.timestamp_seconds)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to add comment: {}", e))?;

        Ok(())
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<VideoComment>, String> {
        let sql = format!("SELECT {} FROM video_comments WHERE id = $1", COMMENT_COLUMNS);
        sqlx::query_as::<_, VideoComment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| format!("Failed to find comment: {}", e))
    }

    async fn list_comments(&self, video_id: Uuid) -> Result<Vec<VideoComment>, String> {
        let sql = format!(
            "SELECT {} FROM video_comments WHERE video_id = $1 ORDER BY created_at",
            COMMENT_COLUMNS
        );
        sqlx::query_as::<_, VideoComment>(&sql)
            .bind(video_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| format!("Failed to list comments: {}", e))
    }

    async fn soft_delete_comment(&self, id: Uuid, author_id: Uuid) -> Result<bool, String> {
        let result = sqlx::query(
            r#"
            UPDATE video_comments
            SET deleted_at = NOW()
            WHERE id = $1 AND author_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(author_id)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to delete comment: {}", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn toggle_reaction(&self, video_id: Uuid, user_id: Uuid, emoji: &str) -> Result<ReactionToggle, String> {
        let removed = sqlx::query(
            "DELETE FROM video_reactions WHERE video_id = $1 AND user_id = $2 AND emoji = $3",
        )
        .bind(video_id)
        .bind(user_id)
        .bind(emoji)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to remove reaction: {}", e))?;

        if removed.rows_affected() > 0 {
            return Ok(ReactionToggle::Removed);
        }

        sqlx::query(
            r#"
            INSERT INTO video_reactions (video_id, user_id, emoji)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(video_id)
        .bind(user_id)
        .bind(emoji)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to add reaction: {}", e))?;

        Ok(ReactionToggle::Added)
    }

    async fn reaction_counts(&self, video_id: Uuid, user_id: Uuid) -> Result<Vec<ReactionCount>, String> {
        sqlx::query_as::<_, ReactionCount>(
            r#"
            SELECT emoji, COUNT(*) AS count, BOOL_OR(user_id = $2) AS reacted
            FROM video_reactions
            WHERE video_id = $1
            GROUP BY emoji
            ORDER BY COUNT(*) DESC, emoji
            "#,
        )
        .bind(video_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| format!("Failed to count reactions: {}", e))
    }
}
