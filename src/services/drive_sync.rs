// Pulls a tenant's Drive folder into drive_assets

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::drive::{DriveAsset, DriveError, DriveFileSource, IngestSummary};
use crate::domain::repositories::DriveRepository;

pub struct DriveSync {
    repo: Arc<dyn DriveRepository>,
    source: Arc<dyn DriveFileSource>,
}

impl DriveSync {
    pub fn new(repo: Arc<dyn DriveRepository>, source: Arc<dyn DriveFileSource>) -> Self {
        Self { repo, source }
    }

    /// Lists every page of the connected folder and upserts supported files
    ///
    /// A rejected token flags the connection for re-auth; later syncs refuse
    /// to run until the tenant reconnects.
    pub async fn sync(&self, tenant_id: Uuid) -> Result<IngestSummary, DriveError> {
        let conn = self
            .repo
            .find_connection(tenant_id)
            .await
            .map_err(DriveError::Storage)?
            .ok_or(DriveError::NotConnected)?;

        if conn.needs_reauth {
            return Err(DriveError::NeedsReauth);
        }

        let mut summary = IngestSummary::default();
        let mut page_token: Option<String> = None;

        loop {
            let page = match self
                .source
                .list_folder(&conn.access_token, &conn.folder_id, page_token.as_deref())
                .await
            {
                Ok(page) => page,
                Err(err) => return Err(self.record_failure(tenant_id, err).await),
            };

            for file in &page.files {
                summary.discovered += 1;
                match DriveAsset::from_file(tenant_id, file) {
                    Some(asset) => {
                        let outcome = self
                            .repo
                            .upsert_asset(&asset)
                            .await
                            .map_err(DriveError::Storage)?;
                        summary.record(outcome);
                    }
                    None => {
                        tracing::debug!(file_id = %file.id, mime_type = %file.mime_type, "Skipping unsupported Drive file");
                        summary.skipped += 1;
                    }
                }
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        self.repo
            .mark_synced(tenant_id)
            .await
            .map_err(DriveError::Storage)?;

        tracing::info!(
            %tenant_id,
            discovered = summary.discovered,
            ingested = summary.ingested,
            unchanged = summary.unchanged,
            skipped = summary.skipped,
            "Drive sync finished"
        );

        Ok(summary)
    }

    async fn record_failure(&self, tenant_id: Uuid, err: DriveError) -> DriveError {
        let message = err.to_string();
        let stored = if err == DriveError::Unauthorized {
            tracing::warn!(%tenant_id, "Drive token rejected, connection needs re-auth");
            self.repo.mark_needs_reauth(tenant_id, &message).await
        } else {
            tracing::warn!(%tenant_id, error = %message, "Drive sync failed");
            self.repo.record_sync_error(tenant_id, &message).await
        };

        if let Err(e) = stored {
            tracing::error!(%tenant_id, error = %e, "Failed to record Drive sync failure");
        }
        err
    }
}
