//! Resend email API client
//!
//! `POST https://api.resend.com/emails` with a Bearer API key.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::domain::email::{EmailDeliveryError, EmailSender, OutgoingEmail};

pub const RESEND_API_URL: &str = "https://api.resend.com";

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

pub struct ResendClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ResendClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, RESEND_API_URL)
    }

    /// Points the client at another host (used against local stubs)
    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Maps a non-success Resend status to a delivery error
pub fn classify_status(status: StatusCode, body: &str) -> EmailDeliveryError {
    let message = format!("Resend returned {}: {}", status, body);
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        EmailDeliveryError::Transient(message)
    } else {
        EmailDeliveryError::Rejected(message)
    }
}

#[async_trait]
impl EmailSender for ResendClient {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, EmailDeliveryError> {
        let request = SendRequest {
            from: &email.from,
            to: vec![email.to.as_str()],
            subject: &email.subject,
            html: email.html.as_deref(),
            text: email.text.as_deref(),
            reply_to: email.reply_to.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmailDeliveryError::Transient(format!("Resend request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let parsed: SendResponse = response
            .json()
            .await
            .map_err(|e| EmailDeliveryError::Transient(format!("Invalid Resend response: {}", e)))?;

        Ok(parsed.id)
    }
}
