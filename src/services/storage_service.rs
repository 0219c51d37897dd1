use reqwest::header::CONTENT_TYPE;
use uuid::Uuid;

use crate::{
    clients::upstream_error,
    config::StorageConfig,
    dto::media::UploadFile,
    error::{AppError, AppResult},
    services::media_service::sanitize_file_name,
};

/// Proxies validated bytes to the object-storage HTTP API and returns the
/// public URL for the stored object.
#[derive(Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl StorageClient {
    pub fn new(http: reqwest::Client, config: StorageConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            bucket: config.bucket,
        }
    }

    pub async fn upload(&self, file: &UploadFile) -> AppResult<String> {
        let content_type = file.content_type.clone().ok_or_else(|| {
            AppError::BadRequest("Missing content type on uploaded file".to_string())
        })?;

        // Unique key so two uploads of the same filename never collide.
        let sanitized = sanitize_file_name(file.file_name.as_deref());
        let key = format!("{}_{}", Uuid::new_v4(), sanitized);

        let upload_url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, key
        );
        let response = self
            .http
            .put(&upload_url)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, content_type)
            .body(file.bytes.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        Ok(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, key
        ))
    }
}
