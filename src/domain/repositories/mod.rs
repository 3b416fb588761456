// Repository interfaces (ports)
// Implemented by the Postgres adapters in infrastructure::repositories

pub mod ab_test_repository;
pub mod catalog_repository;
pub mod consent_repository;
pub mod drive_repository;
pub mod email_repository;
pub mod platform_log_repository;
pub mod tenant_repository;
pub mod user_repository;
pub mod video_repository;

pub use ab_test_repository::AbTestRepository;
pub use catalog_repository::CatalogRepository;
pub use consent_repository::ConsentRepository;
pub use drive_repository::DriveRepository;
pub use email_repository::{EmailQueueRepository, SenderRepository};
pub use platform_log_repository::PlatformLogRepository;
pub use tenant_repository::{SessionRepository, TenantRepository};
pub use user_repository::{User, UserRepository};
pub use video_repository::VideoRepository;
