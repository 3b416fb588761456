//! Email queue processing
//!
//! Driven by an external cron: each call claims one batch, sends it and
//! records the outcome per message. Nothing runs in the background.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::contact::ContactChannel;
use crate::domain::email::{
    resolve_sender, EmailSender, OutgoingEmail, ProcessSummary, QueuedEmail, RetryPolicy,
    SenderAddress,
};
use crate::domain::repositories::{ConsentRepository, EmailQueueRepository, SenderRepository};

pub struct EmailDispatcher {
    queue: Arc<dyn EmailQueueRepository>,
    senders: Arc<dyn SenderRepository>,
    consents: Arc<dyn ConsentRepository>,
    transport: Arc<dyn EmailSender>,
    policy: RetryPolicy,
    batch_size: i64,
    claim_timeout: Duration,
    worker_id: String,
}

enum Outcome {
    Sent,
    Retried,
    Failed,
    Skipped,
}

impl EmailDispatcher {
    pub fn new(
        queue: Arc<dyn EmailQueueRepository>,
        senders: Arc<dyn SenderRepository>,
        consents: Arc<dyn ConsentRepository>,
        transport: Arc<dyn EmailSender>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            queue,
            senders,
            consents,
            transport,
            policy,
            batch_size: 25,
            claim_timeout: Duration::minutes(15),
            worker_id: format!("api-{}", Uuid::new_v4()),
        }
    }

    pub fn with_batch_size(mut self, batch_size: i64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_claim_timeout(mut self, claim_timeout: Duration) -> Self {
        self.claim_timeout = claim_timeout;
        self
    }

    /// Claims and delivers one batch of due emails
    ///
    /// Claims abandoned by crashed runs are released first. A failure while
    /// recording one message's outcome is logged and leaves the claim to expire.
    pub async fn process_batch(&self) -> Result<ProcessSummary, String> {
        let released = self
            .queue
            .release_stale_claims(Utc::now() - self.claim_timeout)
            .await?;
        if released > 0 {
            tracing::warn!(released, "Released stale email claims");
        }

        let batch = self.queue.claim_batch(&self.worker_id, self.batch_size).await?;
        let mut summary = ProcessSummary {
            claimed: batch.len(),
            ..Default::default()
        };

        let mut sender_cache: HashMap<Uuid, Vec<SenderAddress>> = HashMap::new();

        for email in &batch {
            if !sender_cache.contains_key(&email.tenant_id) {
                match self.senders.list(email.tenant_id).await {
                    Ok(addresses) => {
                        sender_cache.insert(email.tenant_id, addresses);
                    }
                    Err(e) => {
                        tracing::error!(email_id = %email.id, error = %e, "Failed to load sender addresses");
                        match self.release_for_retry(email, &e).await {
                            Ok(()) => summary.retried += 1,
                            Err(e) => {
                                tracing::error!(email_id = %email.id, error = %e, "Failed to record email outcome")
                            }
                        }
                        continue;
                    }
                }
            }
            let addresses = sender_cache
                .get(&email.tenant_id)
                .map(Vec::as_slice)
                .unwrap_or_default();

            match self.deliver(email, addresses).await {
                Ok(Outcome::Sent) => summary.sent += 1,
                Ok(Outcome::Retried) => summary.retried += 1,
                Ok(Outcome::Failed) => summary.failed += 1,
                Ok(Outcome::Skipped) => summary.skipped += 1,
                Err(e) => {
                    tracing::error!(email_id = %email.id, error = %e, "Failed to record email outcome")
                }
            }
        }

        tracing::info!(
            claimed = summary.claimed,
            sent = summary.sent,
            retried = summary.retried,
            failed = summary.failed,
            skipped = summary.skipped,
            "Processed email batch"
        );

        Ok(summary)
    }

    /// Returns a claimed email to the queue without counting a send attempt
    async fn release_for_retry(&self, email: &QueuedEmail, error: &str) -> Result<(), String> {
        let next_attempt_at = self.policy.next_attempt_at(email.attempts, Utc::now());
        self.queue
            .mark_retry(email.id, email.attempts, next_attempt_at, error)
            .await
    }

    async fn deliver(&self, email: &QueuedEmail, addresses: &[SenderAddress]) -> Result<Outcome, String> {
        let Some(sender) = resolve_sender(addresses, email.purpose) else {
            tracing::warn!(email_id = %email.id, purpose = %email.purpose, "No verified sender address");
            self.queue
                .mark_skipped(email.id, &format!("No verified sender for {}", email.purpose))
                .await?;
            return Ok(Outcome::Skipped);
        };

        if self
            .consents
            .is_opted_out(email.tenant_id, ContactChannel::Email, &email.to_address)
            .await?
        {
            self.queue
                .mark_skipped(email.id, "Recipient opted out")
                .await?;
            return Ok(Outcome::Skipped);
        }

        let outgoing = OutgoingEmail {
            from: sender.formatted(),
            to: email.to_address.clone(),
            subject: email.subject.clone(),
            html: email.html_body.clone(),
            text: email.text_body.clone(),
            reply_to: email.reply_to.clone(),
        };

        match self.transport.send(&outgoing).await {
            Ok(message_id) => {
                self.queue.mark_sent(email.id, &message_id).await?;
                Ok(Outcome::Sent)
            }
            Err(err) => {
                let attempts = email.attempts + 1;
                let error = err.to_string();

                if err.is_retryable()
                    && attempts < email.max_attempts
                    && self.policy.can_retry(attempts)
                {
                    let next_attempt_at = self.policy.next_attempt_at(email.attempts, Utc::now());
                    tracing::warn!(
                        email_id = %email.id,
                        attempts,
                        %next_attempt_at,
                        error = %error,
                        "Email send failed, scheduling retry"
                    );
                    self.queue
                        .mark_retry(email.id, attempts, next_attempt_at, &error)
                        .await?;
                    Ok(Outcome::Retried)
                } else {
                    tracing::error!(email_id = %email.id, attempts, error = %error, "Email send failed permanently");
                    self.queue.mark_failed(email.id, attempts, &error).await?;
                    Ok(Outcome::Failed)
                }
            }
        }
    }
}
