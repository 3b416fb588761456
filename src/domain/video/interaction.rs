// Comments and emoji reactions on videos

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::validation::ValidationErrors;

pub const MAX_COMMENT_LENGTH: usize = 2000;

pub const ALLOWED_REACTIONS: [&str; 7] = ["👍", "❤️", "😂", "😮", "😢", "🔥", "👏"];

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct VideoComment {
    pub id: Uuid,
    pub video_id: Uuid,
    pub author_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub body: String,
    /// Position in the video the comment refers to
    pub timestamp_seconds: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl VideoComment {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub body: String,
    pub timestamp_seconds: Option<f64>,
    pub parent_id: Option<Uuid>,
}

impl NewComment {
    /// Validates the comment against its (optional) parent
    ///
    /// Replies must target a top-level comment on the same video.
    pub fn into_comment(
        self,
        video_id: Uuid,
        author_id: Uuid,
        parent: Option<&VideoComment>,
    ) -> Result<VideoComment, ValidationErrors> {
        let body = self.body.trim().to_string();
        let mut errors = ValidationErrors::new();

        errors.check(!body.is_empty(), "Comment body is required");
        errors.check(
            body.chars().count() <= MAX_COMMENT_LENGTH,
            format!("Comment must be at most {} characters", MAX_COMMENT_LENGTH),
        );
        if let Some(ts) = self.timestamp_seconds {
            errors.check(ts.is_finite() && ts >= 0.0, "Timestamp must be zero or positive");
        }

        match (self.parent_id, parent) {
            (Some(_), None) => errors.push("Parent comment not found"),
            (Some(_), Some(parent)) => {
                errors.check(parent.video_id == video_id, "Parent comment belongs to another video");
                errors.check(parent.parent_id.is_none(), "Replies cannot be nested");
                errors.check(!parent.is_deleted(), "Cannot reply to a deleted comment");
            }
            (None, _) => {}
        }

        errors.into_result()?;

        Ok(VideoComment {
            id: Uuid::new_v4(),
            video_id,
            author_id,
            parent_id: self.parent_id,
            body,
            timestamp_seconds: self.timestamp_seconds,
            created_at: Utc::now(),
            deleted_at: None,
        })
    }
}

/// A top-level comment with its replies
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentThread {
    pub comment: VideoComment,
    pub replies: Vec<VideoComment>,
}

/// Groups comments into one-level threads, oldest first
///
/// Deleted comments with live replies stay as placeholders with a blank body;
/// otherwise they are dropped.
pub fn build_threads(mut comments: Vec<VideoComment>) -> Vec<CommentThread> {
    comments.sort_by_key(|c| c.created_at);

    let (roots, replies): (Vec<_>, Vec<_>) =
        comments.into_iter().partition(|c| c.parent_id.is_none());

    roots
        .into_iter()
        .filter_map(|mut root| {
            let thread_replies: Vec<VideoComment> = replies
                .iter()
                .filter(|r| r.parent_id == Some(root.id) && !r.is_deleted())
                .cloned()
                .collect();

            if root.is_deleted() {
                if thread_replies.is_empty() {
                    return None;
                }
                root.body.clear();
            }

            Some(CommentThread {
                comment: root,
                replies: thread_replies,
            })
        })
        .collect()
}

pub fn validate_reaction(emoji: &str) -> Result<&'static str, ValidationErrors> {
    let emoji = emoji.trim();
    ALLOWED_REACTIONS
        .iter()
        .copied()
        .find(|allowed| *allowed == emoji || allowed.trim_end_matches('\u{fe0f}') == emoji)
        .ok_or_else(|| {
            let mut errors = ValidationErrors::new();
            errors.push(format!("Unsupported reaction '{}'", emoji));
            errors
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ReactionCount {
    pub emoji: String,
    pub count: i64,
    /// Whether the requesting user has this reaction
    pub reacted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionToggle {
    Added,
    Removed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn comment(video_id: Uuid, parent_id: Option<Uuid>, minutes: i64) -> VideoComment {
        VideoComment {
            id: Uuid::new_v4(),
            video_id,
            author_id: Uuid::new_v4(),
            parent_id,
            body: format!("comment at {}", minutes),
            timestamp_seconds: None,
            created_at: Utc::now() + Duration::minutes(minutes),
            deleted_at: None,
        }
    }

    fn new_comment(body: &str, parent_id: Option<Uuid>) -> NewComment {
        NewComment {
            body: body.into(),
            timestamp_seconds: Some(3.5),
            parent_id,
        }
    }

    #[test]
    fn valid_top_level_comment() {
        let video_id = Uuid::new_v4();
        let c = new_comment("  Great clip  ", None)
            .into_comment(video_id, Uuid::new_v4(), None)
            .unwrap();
        assert_eq!(c.body, "Great clip");
        assert_eq!(c.timestamp_seconds, Some(3.5));
    }

    #[test]
    fn body_length_bounds() {
        let video_id = Uuid::new_v4();
        assert!(new_comment("   ", None)
            .into_comment(video_id, Uuid::new_v4(), None)
            .is_err());
        assert!(new_comment(&"a".repeat(MAX_COMMENT_LENGTH), None)
            .into_comment(video_id, Uuid::new_v4(), None)
            .is_ok());
        assert!(new_comment(&"a".repeat(MAX_COMMENT_LENGTH + 1), None)
            .into_comment(video_id, Uuid::new_v4(), None)
            .is_err());
    }

    #[test]
    fn negative_timestamp_rejected() {
        let mut c = new_comment("hi", None);
        c.timestamp_seconds = Some(-1.0);
        assert!(c.into_comment(Uuid::new_v4(), Uuid::new_v4(), None).is_err());
    }

    #[test]
    fn replies_are_one_level_deep() {
        let video_id = Uuid::new_v4();
        let root = comment(video_id, None, 0);
        let reply = comment(video_id, Some(root.id), 1);

        assert!(new_comment("reply", Some(root.id))
            .into_comment(video_id, Uuid::new_v4(), Some(&root))
            .is_ok());

        let err = new_comment("nested", Some(reply.id))
            .into_comment(video_id, Uuid::new_v4(), Some(&reply))
            .unwrap_err();
        assert_eq!(err.messages(), ["Replies cannot be nested"]);
    }

    #[test]
    fn parent_must_share_video() {
        let root = comment(Uuid::new_v4(), None, 0);
        assert!(new_comment("reply", Some(root.id))
            .into_comment(Uuid::new_v4(), Uuid::new_v4(), Some(&root))
            .is_err());
        assert!(new_comment("reply", Some(Uuid::new_v4()))
            .into_comment(root.video_id, Uuid::new_v4(), None)
            .is_err());
    }

    #[test]
    fn threads_group_oldest_first() {
        let video_id = Uuid::new_v4();
        let first = comment(video_id, None, 0);
        let second = comment(video_id, None, 5);
        let reply_late = comment(video_id, Some(first.id), 10);
        let reply_early = comment(video_id, Some(first.id), 2);

        let threads = build_threads(vec![
            second.clone(),
            reply_late.clone(),
            first.clone(),
            reply_early.clone(),
        ]);

        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].comment.id, first.id);
        assert_eq!(
            threads[0].replies.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![reply_early.id, reply_late.id]
        );
        assert_eq!(threads[1].comment.id, second.id);
        assert!(threads[1].replies.is_empty());
    }

    #[test]
    fn deleted_roots_kept_only_with_replies() {
        let video_id = Uuid::new_v4();
        let mut lonely = comment(video_id, None, 0);
        lonely.deleted_at = Some(Utc::now());
        let mut parent = comment(video_id, None, 1);
        parent.deleted_at = Some(Utc::now());
        let reply = comment(video_id, Some(parent.id), 2);

        let threads = build_threads(vec![lonely, parent.clone(), reply]);

        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].comment.id, parent.id);
        assert!(threads[0].comment.body.is_empty());
        assert_eq!(threads[0].replies.len(), 1);
    }

    #[test]
    fn reactions_allow_listed_emoji_only() {
        assert_eq!(validate_reaction("🔥").unwrap(), "🔥");
        assert_eq!(validate_reaction("❤").unwrap(), "❤️");
        assert!(validate_reaction("🍕").is_err());
        assert!(validate_reaction("").is_err());
    }
}
