//! Mux Video API client for direct uploads

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MUX_API_URL: &str = "https://api.mux.com";

#[derive(Debug, Error)]
pub enum MuxError {
    #[error("Mux request failed: {0}")]
    Request(String),

    #[error("Mux returned {status}: {body}")]
    Api { status: u16, body: String },
}

#[derive(Debug, Serialize)]
struct CreateUploadRequest<'a> {
    cors_origin: &'a str,
    new_asset_settings: AssetSettings<'a>,
}

#[derive(Debug, Serialize)]
struct AssetSettings<'a> {
    playback_policy: [&'a str; 1],
    passthrough: &'a str,
}

#[derive(Debug, Deserialize)]
struct UploadEnvelope {
    data: UploadData,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    id: String,
    url: String,
}

/// A direct upload URL the browser can PUT the file to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectUpload {
    pub upload_id: String,
    pub url: String,
}

pub struct MuxClient {
    client: Client,
    token_id: String,
    token_secret: String,
    base_url: String,
}

impl MuxClient {
    pub fn new(token_id: impl Into<String>, token_secret: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token_id: token_id.into(),
            token_secret: token_secret.into(),
            base_url: MUX_API_URL.to_string(),
        }
    }

    /// Creates a direct upload whose asset carries `passthrough`
    ///
    /// # Arguments
    /// * `passthrough` - Internal video id echoed back in webhooks
    /// * `cors_origin` - Origin allowed to PUT the file
    pub async fn create_direct_upload(&self, passthrough: &str, cors_origin: &str) -> Result<DirectUpload, MuxError> {
        let request = CreateUploadRequest {
            cors_origin,
            new_asset_settings: AssetSettings {
                playback_policy: ["public"],
                passthrough,
            },
        };

        let response = self
            .client
            .post(format!("{}/video/v1/uploads", self.base_url))
            .basic_auth(&self.token_id, Some(&self.token_secret))
            .json(&request)
            .send()
            .await
            .map_err(|e| MuxError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MuxError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: UploadEnvelope = response
            .json()
            .await
            .map_err(|e| MuxError::Request(format!("Invalid upload response: {}", e)))?;

        Ok(DirectUpload {
            upload_id: envelope.data.id,
            url: envelope.data.url,
        })
    }
}
