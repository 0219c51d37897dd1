use crate::{
    clients::{join_url, upstream_error},
    dto::products::ProductResponse,
    error::{AppError, AppResult},
    response::ApiResponse,
};

/// REST client for the product service.
#[derive(Clone)]
pub struct ProductClient {
    http: reqwest::Client,
    base: String,
}

impl ProductClient {
    pub fn new(http: reqwest::Client, base: String) -> Self {
        Self { http, base }
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<ProductResponse> {
        let url = join_url(&self.base, &format!("/api/products/{}", id));
        tracing::debug!(%url, "fetching product");

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let body: ApiResponse<ProductResponse> = response.json().await?;
        body.data
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("empty product payload")))
    }
}
