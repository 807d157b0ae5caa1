// Cloudinary storage backend
// Signed video upload through the Cloudinary upload API

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::path::Path;
use tokio_util::io::ReaderStream;

use super::video::Video;
use super::StorageBackend;
use crate::config::CloudinaryConfig;
use crate::error::StorageError;

/// Uploads videos to a Cloudinary account
pub struct CloudinaryBackend {
    client: reqwest::Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    folder: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl CloudinaryBackend {
    pub fn new(config: &CloudinaryConfig, client: reqwest::Client) -> Result<Self, StorageError> {
        for (name, value) in [
            ("cloud_name", &config.cloud_name),
            ("api_key", &config.api_key),
            ("api_secret", &config.api_secret),
        ] {
            if value.trim().is_empty() {
                return Err(StorageError::Misconfigured(format!(
                    "cloudinary {name} is not set"
                )));
            }
        }

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            folder: config.folder.clone(),
        })
    }

    /// SHA-1 over the signed parameters (sorted) followed by the API secret
    fn signature(&self, timestamp: i64) -> String {
        let mut hasher = Sha1::new();
        hasher.update(format!(
            "folder={}&timestamp={timestamp}{}",
            self.folder, self.api_secret
        ));
        hex::encode(hasher.finalize())
    }

    fn upload_url(&self) -> String {
        format!("{}/v1_1/{}/video/upload", self.api_base, self.cloud_name)
    }
}

#[async_trait]
impl StorageBackend for CloudinaryBackend {
    fn name(&self) -> &'static str {
        "cloudinary"
    }

    async fn store(&self, local_file: &Path) -> Result<Video, StorageError> {
        let file = tokio::fs::File::open(local_file).await?;
        let length = file.metadata().await?.len();
        let file_name = local_file
            .file_name()
            .map_or_else(|| "video".to_string(), |n| n.to_string_lossy().into_owned());

        let timestamp = chrono::Utc::now().timestamp();
        let part = Part::stream_with_length(
            reqwest::Body::wrap_stream(ReaderStream::new(file)),
            length,
        )
        .file_name(file_name.clone());

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("folder", self.folder.clone())
            .text("signature", self.signature(timestamp));

        tracing::info!(file = %local_file.display(), bytes = length, "Uploading video to Cloudinary");
        let response = self.client.post(self.upload_url()).multipart(form).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                message: rejection_message(status, &text),
            });
        }

        let body: UploadResponse = serde_json::from_str(&text)
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;
        let url = body
            .secure_url
            .ok_or_else(|| StorageError::InvalidResponse("missing secure_url".to_string()))?;
        Ok(Video::new(file_name, url))
    }
}

/// Cloudinary's own error message when the body carries one, else the raw body
fn rejection_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Some(error) = serde_json::from_str::<UploadResponse>(body)
        .ok()
        .and_then(|b| b.error)
    {
        return error.message;
    }
    match body.trim() {
        "" => status.to_string(),
        text => text.to_string(),
    }
}
