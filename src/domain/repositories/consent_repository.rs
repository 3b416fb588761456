use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::contact::{ContactChannel, ContactConsent};

/// Repository trait for per-tenant contact consent
#[async_trait]
pub trait ConsentRepository: Send + Sync {
    async fn upsert(&self, consent: &ContactConsent) -> Result<(), String>;

    async fn is_opted_out(&self, tenant_id: Uuid, channel: ContactChannel, address: &str) -> Result<bool, String>;
}
