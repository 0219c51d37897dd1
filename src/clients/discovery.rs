use crate::{
    clients::{join_url, upstream_error},
    dto::registry::{RegisterInstanceRequest, ServiceInstance},
    error::{AppError, AppResult},
    response::ApiResponse,
};

/// REST client for the discovery registry.
#[derive(Clone)]
pub struct DiscoveryClient {
    http: reqwest::Client,
    base: String,
}

impl DiscoveryClient {
    pub fn new(http: reqwest::Client, base: String) -> Self {
        Self { http, base }
    }

    /// Resolve a service name to the base URL of one live instance.
    pub async fn lookup(&self, name: &str) -> AppResult<String> {
        let url = join_url(&self.base, &format!("/api/registry/{}", name));
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|_| AppError::ServiceUnavailable(name.to_string()))?;
        if !response.status().is_success() {
            return Err(AppError::ServiceUnavailable(name.to_string()));
        }

        let body: ApiResponse<Vec<ServiceInstance>> = response.json().await?;
        body.data
            .unwrap_or_default()
            .first()
            .map(|instance| instance.url.clone())
            .ok_or_else(|| AppError::ServiceUnavailable(name.to_string()))
    }

    pub async fn register(&self, name: &str, service_url: &str) -> AppResult<ServiceInstance> {
        let url = join_url(&self.base, "/api/registry");
        let request = RegisterInstanceRequest {
            name: name.to_string(),
            url: service_url.to_string(),
        };

        let response = self.http.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let body: ApiResponse<ServiceInstance> = response.json().await?;
        body.data
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("empty registry payload")))
    }
}
