// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod postgres_ab_test_repository;
pub mod postgres_catalog_repository;
pub mod postgres_consent_repository;
pub mod postgres_drive_repository;
pub mod postgres_email_repository;
pub mod postgres_platform_log_repository;
pub mod postgres_tenant_repository;
pub mod postgres_user_repository;
pub mod postgres_video_repository;

pub use postgres_ab_test_repository::PostgresAbTestRepository;
pub use postgres_catalog_repository::PostgresCatalogRepository;
pub use postgres_consent_repository::PostgresConsentRepository;
pub use postgres_drive_repository::PostgresDriveRepository;
pub use postgres_email_repository::{PostgresEmailQueueRepository, PostgresSenderRepository};
pub use postgres_platform_log_repository::PostgresPlatformLogRepository;
pub use postgres_tenant_repository::{PostgresSessionRepository, PostgresTenantRepository};
pub use postgres_user_repository::PostgresUserRepository;
pub use postgres_video_repository::PostgresVideoRepository;
