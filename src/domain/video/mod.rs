// Video domain module
// Mux-hosted videos, webhook verification, comments and reactions

#![allow(clippy::module_inception)]

pub mod interaction;
pub mod video;
pub mod webhook;

pub use interaction::{
    build_threads, validate_reaction, CommentThread, NewComment, ReactionCount, ReactionToggle,
    VideoComment,
};
pub use video::{apply_event, EventOutcome, Video, VideoStatus};
pub use webhook::{verify_webhook_signature, MuxWebhookEvent, WebhookError};
