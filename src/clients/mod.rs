mod discovery;
mod media;
mod product;

pub use discovery::DiscoveryClient;
pub use media::MediaClient;
pub use product::ProductClient;

use std::env;

use axum::http::StatusCode;

use crate::{
    config::StorageConfig,
    error::{AppError, AppResult},
    services::storage_service::StorageClient,
};

/// Hands out typed peer clients over one pooled HTTP connection set.
/// Explicit `*_SERVICE_URL` variables win over discovery lookup.
#[derive(Clone)]
pub struct ServiceClients {
    http: reqwest::Client,
    product_url: Option<String>,
    media_url: Option<String>,
    discovery_url: Option<String>,
    storage: Option<StorageClient>,
}

impl ServiceClients {
    pub fn new(
        product_url: Option<String>,
        media_url: Option<String>,
        discovery_url: Option<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            product_url,
            media_url,
            discovery_url,
            storage: None,
        }
    }

    pub fn from_env() -> Self {
        let mut clients = Self::new(
            env::var("PRODUCT_SERVICE_URL").ok(),
            env::var("MEDIA_SERVICE_URL").ok(),
            env::var("DISCOVERY_URL").ok(),
        );
        clients.storage = StorageConfig::from_env()
            .ok()
            .map(|config| StorageClient::new(clients.http.clone(), config));
        clients
    }

    pub async fn product(&self) -> AppResult<ProductClient> {
        let base = self.resolve("product-service", &self.product_url).await?;
        Ok(ProductClient::new(self.http.clone(), base))
    }

    pub async fn media(&self) -> AppResult<MediaClient> {
        let base = self.resolve("media-service", &self.media_url).await?;
        Ok(MediaClient::new(self.http.clone(), base))
    }

    pub fn storage(&self) -> AppResult<&StorageClient> {
        self.storage
            .as_ref()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("STORAGE_URL is not set")))
    }

    async fn resolve(&self, name: &str, override_url: &Option<String>) -> AppResult<String> {
        if let Some(url) = override_url {
            return Ok(url.clone());
        }
        if let Some(discovery_url) = &self.discovery_url {
            let discovery = DiscoveryClient::new(self.http.clone(), discovery_url.clone());
            return discovery.lookup(name).await;
        }
        Err(AppError::ServiceUnavailable(name.to_string()))
    }
}

/// Announce this instance to the registry, when one is configured.
/// Registration failure is logged, not fatal; env overrides still work.
pub async fn register_self(name: &str) {
    let (Ok(discovery_url), Ok(service_url)) = (env::var("DISCOVERY_URL"), env::var("SERVICE_URL"))
    else {
        return;
    };

    let discovery = DiscoveryClient::new(reqwest::Client::new(), discovery_url);
    match discovery.register(name, &service_url).await {
        Ok(_) => tracing::info!(service = name, url = %service_url, "registered with discovery"),
        Err(err) => tracing::warn!(service = name, error = %err, "discovery registration failed"),
    }
}

// A peer answered with an error; carry its status and body back verbatim.
pub(crate) async fn upstream_error(response: reqwest::Response) -> AppError {
    let status = StatusCode::from_u16(response.status().as_u16())
        .unwrap_or(StatusCode::BAD_GATEWAY);
    let body = response.text().await.unwrap_or_default();
    AppError::Upstream { status, body }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::join_url;

    #[test]
    fn join_url_handles_trailing_slash() {
        assert_eq!(
            join_url("http://localhost:8082/", "/api/products/1"),
            "http://localhost:8082/api/products/1"
        );
        assert_eq!(
            join_url("http://localhost:8082", "/api/products/1"),
            "http://localhost:8082/api/products/1"
        );
    }
}
