use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};

use crate::{
    dto::registry::{InstanceList, RegisterInstanceRequest, ServiceInstance},
    error::AppResult,
    response::ApiResponse,
    services::registry_service::{self, RegistryState},
};

pub fn router() -> Router<RegistryState> {
    Router::new()
        .route("/", post(register))
        .route("/", get(list_services))
        .route("/{name}", get(lookup))
        .route("/{name}", delete(deregister))
}

#[utoipa::path(
    post,
    path = "/api/registry",
    request_body = RegisterInstanceRequest,
    responses(
        (status = 200, description = "Register or renew an instance", body = ApiResponse<ServiceInstance>),
        (status = 400, description = "Blank name or url"),
    ),
    tag = "Registry"
)]
pub async fn register(
    State(state): State<RegistryState>,
    Json(payload): Json<RegisterInstanceRequest>,
) -> AppResult<Json<ApiResponse<ServiceInstance>>> {
    let resp = registry_service::register(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/registry",
    responses(
        (status = 200, description = "All services with live instances")
    ),
    tag = "Registry"
)]
pub async fn list_services(
    State(state): State<RegistryState>,
) -> AppResult<Json<ApiResponse<HashMap<String, Vec<ServiceInstance>>>>> {
    let resp = registry_service::list_services(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/registry/{name}",
    params(
        ("name" = String, Path, description = "Service name")
    ),
    responses(
        (status = 200, description = "Live instances for one service", body = ApiResponse<InstanceList>),
        (status = 404, description = "No live instances"),
    ),
    tag = "Registry"
)]
pub async fn lookup(
    Path(name): Path<String>,
    State(state): State<RegistryState>,
) -> AppResult<Json<ApiResponse<InstanceList>>> {
    let resp = registry_service::lookup(&state, &name).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/registry/{name}",
    params(
        ("name" = String, Path, description = "Service name")
    ),
    responses(
        (status = 200, description = "Dropped a service's instances"),
        (status = 404, description = "Unknown service"),
    ),
    tag = "Registry"
)]
pub async fn deregister(
    Path(name): Path<String>,
    State(state): State<RegistryState>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = registry_service::deregister(&state, &name).await?;
    Ok(Json(resp))
}
