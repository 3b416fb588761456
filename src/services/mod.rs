// Application services
// Orchestrate repositories and outbound clients for multi-step operations

pub mod drive_sync;
pub mod email_dispatch;

pub use drive_sync::DriveSync;
pub use email_dispatch::EmailDispatcher;
