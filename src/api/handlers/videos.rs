use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::TenantContext;
use crate::config::AppConfig;
use crate::domain::repositories::VideoRepository;
use crate::domain::video::{
    build_threads, validate_reaction, CommentThread, NewComment, ReactionCount, ReactionToggle,
    Video, VideoComment,
};
use crate::infrastructure::clients::MuxClient;
use crate::infrastructure::repositories::PostgresVideoRepository;

#[derive(Debug, Deserialize)]
pub struct CreateVideoRequest {
    pub title: String,
    /// Origin the browser uploads from; any origin when omitted
    pub cors_origin: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateVideoResponse {
    pub video: Video,
    pub upload_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub emoji: String,
}

#[derive(Debug, Serialize)]
pub struct ReactionResponse {
    pub result: ReactionToggle,
    pub reactions: Vec<ReactionCount>,
}

async fn find_video(repo: &PostgresVideoRepository, tenant_id: Uuid, id: Uuid) -> Result<Video, ApiError> {
    repo.find_for_tenant(tenant_id, id)
        .await
        .map_err(ApiError::internal_server_error)?
        .ok_or_else(|| ApiError::not_found("Video not found"))
}

/// Create a video and a Mux direct upload for it
///
/// POST /api/videos
pub async fn create_video(
    State(pool): State<PgPool>,
    State(config): State<Arc<AppConfig>>,
    ctx: TenantContext,
    Json(req): Json<CreateVideoRequest>,
) -> Result<(StatusCode, Json<CreateVideoResponse>), ApiError> {
    ctx.require_writer()?;

    let (Some(token_id), Some(token_secret)) = (&config.mux_token_id, &config.mux_token_secret) else {
        return Err(ApiError::service_unavailable("Video uploads are not configured"));
    };

    let mut video = Video::new(ctx.tenant_id, &req.title, ctx.user_id)?;

    let cors_origin = req.cors_origin.as_deref().unwrap_or("*");
    let upload = MuxClient::new(token_id.as_str(), token_secret.as_str())
        .create_direct_upload(&video.passthrough(), cors_origin)
        .await?;
    video.mux_upload_id = Some(upload.upload_id);

    PostgresVideoRepository::new(pool)
        .create(&video)
        .await
        .map_err(ApiError::internal_server_error)?;

    tracing::info!(video_id = %video.id, tenant_id = %ctx.tenant_id, "Created video upload");
    Ok((
        StatusCode::CREATED,
        Json(CreateVideoResponse {
            video,
            upload_url: upload.url,
        }),
    ))
}

/// GET /api/videos
pub async fn list_videos(
    State(pool): State<PgPool>,
    ctx: TenantContext,
) -> Result<Json<Vec<Video>>, ApiError> {
    let videos = PostgresVideoRepository::new(pool)
        .list_for_tenant(ctx.tenant_id)
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok(Json(videos))
}

/// GET /api/videos/:id
pub async fn get_video(
    State(pool): State<PgPool>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Video>, ApiError> {
    let repo = PostgresVideoRepository::new(pool);
    Ok(Json(find_video(&repo, ctx.tenant_id, id).await?))
}

/// Comments grouped into threads, oldest first
///
/// GET /api/videos/:id/comments
pub async fn list_comments(
    State(pool): State<PgPool>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CommentThread>>, ApiError> {
    let repo = PostgresVideoRepository::new(pool);
    find_video(&repo, ctx.tenant_id, id).await?;

    let comments = repo
        .list_comments(id)
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok(Json(build_threads(comments)))
}

/// POST /api/videos/:id/comments
pub async fn add_comment(
    State(pool): State<PgPool>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(req): Json<NewComment>,
) -> Result<(StatusCode, Json<VideoComment>), ApiError> {
    let repo = PostgresVideoRepository::new(pool);
    find_video(&repo, ctx.tenant_id, id).await?;

    let parent = match req.parent_id {
        Some(parent_id) => Some(
            repo.find_comment(parent_id)
                .await
                .map_err(ApiError::internal_server_error)?
                .ok_or_else(|| ApiError::bad_request("Parent comment not found"))?,
        ),
        None => None,
    };

    let comment = req.into_comment(id, ctx.user_id, parent.as_ref())?;
    repo.add_comment(&comment)
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Soft-delete a comment; only its author may do this
///
/// DELETE /api/videos/:id/comments/:comment_id
pub async fn delete_comment(
    State(pool): State<PgPool>,
    ctx: TenantContext,
    Path((id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let repo = PostgresVideoRepository::new(pool);
    find_video(&repo, ctx.tenant_id, id).await?;

    let comment = repo
        .find_comment(comment_id)
        .await
        .map_err(ApiError::internal_server_error)?
        .filter(|c| c.video_id == id && !c.is_deleted())
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    if comment.author_id != ctx.user_id {
        return Err(ApiError::forbidden("Only the author can delete this comment"));
    }

    repo.soft_delete_comment(comment_id, ctx.user_id)
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Add the reaction, or remove it if the caller already reacted
///
/// POST /api/videos/:id/reactions
pub async fn toggle_reaction(
    State(pool): State<PgPool>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(req): Json<ReactionRequest>,
) -> Result<Json<ReactionResponse>, ApiError> {
    let emoji = validate_reaction(&req.emoji)?;

    let repo = PostgresVideoRepository::new(pool);
    find_video(&repo, ctx.tenant_id, id).await?;

    let result = repo
        .toggle_reaction(id, ctx.user_id, emoji)
        .await
        .map_err(ApiError::internal_server_error)?;
    let reactions = repo
        .reaction_counts(id, ctx.user_id)
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok(Json(ReactionResponse { result, reactions }))
}

/// GET /api/videos/:id/reactions
pub async fn list_reactions(
    State(pool): State<PgPool>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ReactionCount>>, ApiError> {
    let repo = PostgresVideoRepository::new(pool);
    find_video(&repo, ctx.tenant_id, id).await?;

    let reactions = repo
        .reaction_counts(id, ctx.user_id)
        .await
        .map_err(ApiError::internal_server_error)?;

    Ok(Json(reactions))
}
