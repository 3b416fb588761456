// Outbound HTTP clients for third-party services

pub mod drive;
pub mod mux;
pub mod resend;

pub use drive::DriveClient;
pub use mux::{DirectUpload, MuxClient, MuxError};
pub use resend::ResendClient;
