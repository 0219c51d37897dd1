use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::{
    dto::registry::{InstanceList, RegisterInstanceRequest, ServiceInstance},
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
};

/// In-memory service registry. Re-registering renews an instance's lease;
/// expired instances are evicted lazily on read (no background jobs).
#[derive(Clone)]
pub struct RegistryState {
    services: Arc<RwLock<HashMap<String, Vec<ServiceInstance>>>>,
    ttl: Option<Duration>,
}

const DEFAULT_TTL_SECS: i64 = 90;

impl RegistryState {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            services: Arc::new(RwLock::new(HashMap::new())),
            ttl: (ttl_secs > 0).then(|| Duration::seconds(ttl_secs)),
        }
    }

    pub fn from_env() -> Self {
        let ttl_secs = std::env::var("REGISTRY_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(DEFAULT_TTL_SECS);
        Self::new(ttl_secs)
    }

    async fn prune(&self) {
        let Some(ttl) = self.ttl else { return };
        let now = Utc::now();
        let mut services = self.services.write().await;
        for instances in services.values_mut() {
            instances.retain(|instance| !expired(instance.registered_at, ttl, now));
        }
        services.retain(|_, instances| !instances.is_empty());
    }

    pub async fn register(&self, request: RegisterInstanceRequest) -> ServiceInstance {
        let instance = ServiceInstance {
            url: request.url,
            registered_at: Utc::now(),
        };
        let mut services = self.services.write().await;
        let instances = services.entry(request.name).or_default();
        instances.retain(|existing| existing.url != instance.url);
        instances.push(instance.clone());
        instance
    }

    pub async fn all(&self) -> HashMap<String, Vec<ServiceInstance>> {
        self.prune().await;
        self.services.read().await.clone()
    }

    pub async fn lookup(&self, name: &str) -> AppResult<Vec<ServiceInstance>> {
        self.prune().await;
        let services = self.services.read().await;
        match services.get(name) {
            Some(instances) if !instances.is_empty() => Ok(instances.clone()),
            _ => Err(AppError::NotFound),
        }
    }

    pub async fn deregister(&self, name: &str) -> AppResult<()> {
        let mut services = self.services.write().await;
        services.remove(name).map(|_| ()).ok_or(AppError::NotFound)
    }
}

fn expired(registered_at: DateTime<Utc>, ttl: Duration, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(registered_at) > ttl
}

pub async fn register(
    state: &RegistryState,
    request: RegisterInstanceRequest,
) -> AppResult<ApiResponse<ServiceInstance>> {
    if request.name.trim().is_empty() || request.url.trim().is_empty() {
        return Err(AppError::BadRequest(
            "name and url cannot be blank".to_string(),
        ));
    }
    let instance = state.register(request).await;
    Ok(ApiResponse::success(
        "Registered",
        instance,
        Some(Meta::empty()),
    ))
}

pub async fn list_services(
    state: &RegistryState,
) -> AppResult<ApiResponse<HashMap<String, Vec<ServiceInstance>>>> {
    Ok(ApiResponse::success(
        "Services",
        state.all().await,
        Some(Meta::empty()),
    ))
}

pub async fn lookup(state: &RegistryState, name: &str) -> AppResult<ApiResponse<InstanceList>> {
    let items = state.lookup(name).await?;
    Ok(ApiResponse::success(
        "Instances",
        InstanceList { items },
        Some(Meta::empty()),
    ))
}

pub async fn deregister(
    state: &RegistryState,
    name: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state.deregister(name).await?;
    Ok(ApiResponse::success(
        "Deregistered",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, url: &str) -> RegisterInstanceRequest {
        RegisterInstanceRequest {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn register_then_lookup_returns_the_instance() {
        let state = RegistryState::new(0);
        state
            .register(request("product-service", "http://localhost:8082"))
            .await;

        let instances = state.lookup("product-service").await.unwrap();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].url, "http://localhost:8082");
    }

    #[tokio::test]
    async fn reregistering_the_same_url_does_not_duplicate() {
        let state = RegistryState::new(0);
        state
            .register(request("media-service", "http://localhost:8083"))
            .await;
        state
            .register(request("media-service", "http://localhost:8083"))
            .await;

        let instances = state.lookup("media-service").await.unwrap();
        assert_eq!(instances.len(), 1);
    }

    #[tokio::test]
    async fn unknown_service_is_not_found() {
        let state = RegistryState::new(0);
        assert!(matches!(
            state.lookup("order-service").await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn deregister_removes_all_instances() {
        let state = RegistryState::new(0);
        state
            .register(request("user-service", "http://localhost:8081"))
            .await;
        state.deregister("user-service").await.unwrap();
        assert!(state.lookup("user-service").await.is_err());
    }

    #[test]
    fn lease_expiry_is_a_strict_ttl_comparison() {
        let ttl = Duration::seconds(90);
        let now = Utc::now();
        assert!(!expired(now, ttl, now));
        assert!(!expired(now - Duration::seconds(90), ttl, now));
        assert!(expired(now - Duration::seconds(91), ttl, now));
    }
}
