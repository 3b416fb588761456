// Outbound delivery port implemented by email providers

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmailDeliveryError {
    /// Worth retrying: rate limits, provider outages, network errors
    #[error("Temporary delivery failure: {0}")]
    Transient(String),

    /// The provider refused the message; retrying will not help
    #[error("Delivery rejected: {0}")]
    Rejected(String),
}

impl EmailDeliveryError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, EmailDeliveryError::Transient(_))
    }
}

/// A fully addressed message ready for the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// `"Display Name <address>"`
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: Option<String>,
    pub text: Option<String>,
    pub reply_to: Option<String>,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Sends one message and returns the provider's message id
    async fn send(&self, email: &OutgoingEmail) -> Result<String, EmailDeliveryError>;
}
