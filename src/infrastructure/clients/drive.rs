//! Google Drive v3 `files.list` client

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::domain::drive::{DriveError, DriveFileList, DriveFileSource};

pub const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
pub const PAGE_SIZE: u32 = 100;

const FILE_FIELDS: &str =
    "nextPageToken,files(id,name,mimeType,size,modifiedTime,webViewLink,md5Checksum,thumbnailLink)";

pub struct DriveClient {
    client: Client,
    files_url: String,
}

impl DriveClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            files_url: DRIVE_FILES_URL.to_string(),
        }
    }
}

impl Default for DriveClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Query selecting the live children of a folder
pub fn folder_query(folder_id: &str) -> String {
    format!("'{}' in parents and trashed=false", folder_id)
}

fn classify_status(status: StatusCode, body: String) -> DriveError {
    match status {
        StatusCode::UNAUTHORIZED => DriveError::Unauthorized,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => DriveError::RateLimited,
        _ => DriveError::Api(format!("{}: {}", status, body)),
    }
}

#[async_trait]
impl DriveFileSource for DriveClient {
    async fn list_folder(
        &self,
        access_token: &str,
        folder_id: &str,
        page_token: Option<&str>,
    ) -> Result<DriveFileList, DriveError> {
        let page_size = PAGE_SIZE.to_string();
        let query = folder_query(folder_id);
        let mut params = vec![
            ("q", query.as_str()),
            ("pageSize", page_size.as_str()),
            ("fields", FILE_FIELDS),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response = self
            .client
            .get(&self.files_url)
            .bearer_auth(access_token)
            .query(&params)
            .send()
            .await
            .map_err(|e| DriveError::Api(format!("Drive request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        response
            .json::<DriveFileList>()
            .await
            .map_err(|e| DriveError::Api(format!("Invalid Drive response: {}", e)))
    }
}
