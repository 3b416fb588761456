use sqlx::postgres::PgPoolOptions;

use cgk_platform_api::api::build_router;
use cgk_platform_api::config::{AppConfig, DEV_JWT_SECRET};
use cgk_platform_api::observability::init_tracing;
use cgk_platform_api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);

    if config.jwt_secret == DEV_JWT_SECRET {
        tracing::warn!("JWT_SECRET not set, using development secret");
    }
    if config.cron_secret.is_none() {
        tracing::warn!("CRON_SECRET not set, queue processing and log purge endpoints are disabled");
    }

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database connected and migrated");

    let addr = config.bind_addr;
    let app = build_router(AppState::new(pool, config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
