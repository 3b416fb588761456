use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::sender::SenderPurpose;
use crate::domain::user::value_objects::Email;
use crate::domain::validation::ValidationErrors;

/// RFC 5322 line length limit, applied to subjects
pub const MAX_SUBJECT_LENGTH: usize = 998;

/// Delivery status of a queued email
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "email_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    /// Waiting for `next_attempt_at`
    Pending,
    /// Claimed by a worker
    Processing,
    Sent,
    /// Gave up after exhausting attempts or a permanent rejection
    Failed,
    /// Deliberately not sent (no sender, recipient opted out)
    Skipped,
}

impl EmailStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EmailStatus::Sent | EmailStatus::Failed | EmailStatus::Skipped
        )
    }
}

/// A row of the email queue
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct QueuedEmail {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub to_address: String,
    pub purpose: SenderPurpose,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    pub reply_to: Option<String>,
    pub status: EmailStatus,
    pub attempts: i32,
    pub max_attempts: i32,
    pub next_attempt_at: DateTime<Utc>,
    pub last_error: Option<String>,
    pub claimed_by: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub provider_message_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request to enqueue an email
#[derive(Debug, Clone, Deserialize)]
pub struct NewEmail {
    pub to: String,
    #[serde(default)]
    pub purpose: SenderPurpose,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    pub reply_to: Option<String>,
    /// Deliver no earlier than this time
    pub send_at: Option<DateTime<Utc>>,
}

/// An enqueue request that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedEmail {
    pub to: Email,
    pub purpose: SenderPurpose,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    pub reply_to: Option<Email>,
    pub send_at: Option<DateTime<Utc>>,
}

impl NewEmail {
    /// Validates recipient, subject and bodies, reporting every problem
    pub fn validate(self) -> Result<ValidatedEmail, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let to = Email::new(&self.to).map_err(|e| errors.push(e)).ok();
        let reply_to = match self.reply_to.as_deref().map(Email::new).transpose() {
            Ok(reply_to) => reply_to,
            Err(e) => {
                errors.push(format!("reply_to: {}", e));
                None
            }
        };

        let subject = self.subject.trim().to_string();
        errors.check(!subject.is_empty(), "Subject cannot be empty");
        errors.check(
            subject.chars().count() <= MAX_SUBJECT_LENGTH,
            format!("Subject exceeds {} characters", MAX_SUBJECT_LENGTH),
        );
        errors.check(
            !subject.contains(['\r', '\n']),
            "Subject cannot contain line breaks",
        );

        let html_body = self.html_body.filter(|b| !b.trim().is_empty());
        let text_body = self.text_body.filter(|b| !b.trim().is_empty());
        errors.check(
            html_body.is_some() || text_body.is_some(),
            "Either html_body or text_body is required",
        );

        errors.into_result()?;

        Ok(ValidatedEmail {
            // Only None when an error was recorded above
            to: to.ok_or_else(ValidationErrors::new)?,
            purpose: self.purpose,
            subject,
            html_body,
            text_body,
            reply_to,
            send_at: self.send_at,
        })
    }
}

/// Outcome of one queue processing run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessSummary {
    pub claimed: usize,
    pub sent: usize,
    pub retried: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Count of queue rows per status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub pending: i64,
    pub processing: i64,
    pub sent: i64,
    pub failed: i64,
    pub skipped: i64,
}

impl QueueStats {
    pub fn record(&mut self, status: EmailStatus, count: i64) {
        match status {
            EmailStatus::Pending => self.pending += count,
            EmailStatus::Processing => self.processing += count,
            EmailStatus::Sent => self.sent += count,
            EmailStatus::Failed => self.failed += count,
            EmailStatus::Skipped => self.skipped += count,
        }
    }
}
