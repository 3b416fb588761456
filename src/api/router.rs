use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{
    ab_tests, auth, drive, email, feeds, logs, senders, sms, videos, webhooks,
};
use crate::state::AppState;

/// Builds the full HTTP router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(auth::health_check))
        // Auth routes
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/switch-tenant", post(auth::switch_tenant))
        // Shipping A/B tests
        .route("/api/ab-tests", post(ab_tests::create_test).get(ab_tests::list_tests))
        .route("/api/ab-tests/shipping/attribute", post(ab_tests::attribute_order))
        .route("/api/ab-tests/shipping/delivery-filter", post(ab_tests::delivery_filter))
        .route("/api/ab-tests/:id", get(ab_tests::get_test))
        .route("/api/ab-tests/:id/status", post(ab_tests::update_status))
        .route("/api/ab-tests/:id/assign", post(ab_tests::assign_visitor))
        .route("/api/ab-tests/:id/results", get(ab_tests::get_results))
        // Email queue
        .route("/api/email/queue", post(email::enqueue_email))
        .route("/api/email/queue/stats", get(email::queue_stats))
        .route("/api/email/queue/process", post(email::process_queue))
        // Sender addresses
        .route("/api/senders", get(senders::list_senders).post(senders::create_sender))
        .route("/api/senders/:id", delete(senders::delete_sender))
        .route("/api/senders/:id/default", post(senders::set_default_sender))
        .route("/api/senders/:id/verify", post(senders::verify_sender))
        // Platform logs
        .route("/api/logs", post(logs::ingest_log).get(logs::query_logs))
        .route("/api/logs/errors", get(logs::error_groups))
        .route("/api/logs/purge", post(logs::purge_logs))
        // Merchant feed
        .route("/api/feeds/google/:file", get(feeds::google_feed))
        // Video
        .route("/api/videos", post(videos::create_video).get(videos::list_videos))
        .route("/api/videos/:id", get(videos::get_video))
        .route(
            "/api/videos/:id/comments",
            get(videos::list_comments).post(videos::add_comment),
        )
        .route(
            "/api/videos/:id/comments/:comment_id",
            delete(videos::delete_comment),
        )
        .route(
            "/api/videos/:id/reactions",
            get(videos::list_reactions).post(videos::toggle_reaction),
        )
        .route("/api/webhooks/mux", post(webhooks::mux_webhook))
        // Drive assets
        .route(
            "/api/drive/connection",
            get(drive::get_connection).put(drive::put_connection),
        )
        .route("/api/drive/sync", post(drive::sync_folder))
        .route("/api/drive/assets", get(drive::list_assets))
        // SMS consent
        .route("/api/sms/inbound/:tenant_slug", post(sms::inbound_sms))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Shared state
        .with_state(state)
}
