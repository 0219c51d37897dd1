use reqwest::multipart::{Form, Part};

use crate::{
    clients::{join_url, upstream_error},
    dto::media::{MediaResponse, UploadFile},
    error::{AppError, AppResult},
    response::ApiResponse,
};

/// REST client for the media service.
#[derive(Clone)]
pub struct MediaClient {
    http: reqwest::Client,
    base: String,
}

impl MediaClient {
    pub fn new(http: reqwest::Client, base: String) -> Self {
        Self { http, base }
    }

    /// Forward one uploaded file, tagged with its owning product.
    pub async fn upload(&self, file: &UploadFile, product_id: &str) -> AppResult<MediaResponse> {
        let mut part = Part::bytes(file.bytes.to_vec());
        if let Some(name) = &file.file_name {
            part = part.file_name(name.clone());
        }
        if let Some(content_type) = &file.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|_| AppError::BadRequest("Invalid content type".to_string()))?;
        }
        let form = Form::new()
            .part("file", part)
            .text("productId", product_id.to_string());

        let url = join_url(&self.base, "/api/media");
        let response = self.http.put(&url).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let body: ApiResponse<MediaResponse> = response.json().await?;
        body.data
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("empty media payload")))
    }

    pub async fn get_by_product_id(&self, product_id: &str) -> AppResult<Vec<MediaResponse>> {
        let url = join_url(&self.base, &format!("/api/media/product/{}", product_id));
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let body: ApiResponse<Vec<MediaResponse>> = response.json().await?;
        Ok(body.data.unwrap_or_default())
    }

    pub async fn delete_by_product_id(&self, product_id: &str) -> AppResult<()> {
        let url = join_url(&self.base, &format!("/api/media/product/{}", product_id));
        let response = self.http.delete(&url).send().await?;
        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }
        Ok(())
    }
}
