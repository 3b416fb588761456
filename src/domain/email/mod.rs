// Transactional email domain module
// Queue rows, retry policy and tenant sender addresses

pub mod delivery;
pub mod queue;
pub mod retry;
pub mod sender;

pub use delivery::{EmailDeliveryError, EmailSender, OutgoingEmail};
pub use queue::{EmailStatus, NewEmail, ProcessSummary, QueueStats, QueuedEmail, ValidatedEmail};
pub use retry::{get_time_until_retry, RetryPolicy};
pub use sender::{resolve_sender, NewSenderAddress, SenderAddress, SenderPurpose};
