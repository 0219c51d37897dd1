use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    routing::{delete, get, post, put},
};

use crate::{
    dto::media::{ImageUrlResponse, MediaList, MediaResponse, MediaUploadForm},
    error::AppResult,
    response::{ApiResponse, Meta},
    services::media_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", put(upload_and_save))
        .route("/", post(upload_image))
        .route("/product/{product_id}", get(get_by_product_id))
        .route("/product/{product_id}", delete(delete_by_product_id))
        .route("/{id}", delete(delete_by_id))
}

#[utoipa::path(
    put,
    path = "/api/media",
    responses(
        (status = 200, description = "Upload image and persist record", body = ApiResponse<MediaResponse>),
        (status = 400, description = "Upload failed validation"),
    ),
    tag = "Media"
)]
pub async fn upload_and_save(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<MediaResponse>>> {
    let form = MediaUploadForm::from_multipart(&mut multipart).await?;
    let product_id = form.require_product_id()?.to_string();
    let resp = media_service::upload_and_save(&state, form.file, &product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/media",
    responses(
        (status = 200, description = "Upload image without a record", body = ApiResponse<ImageUrlResponse>),
        (status = 400, description = "Upload failed validation"),
    ),
    tag = "Media"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<ImageUrlResponse>>> {
    let form = MediaUploadForm::from_multipart(&mut multipart).await?;
    let image_url = media_service::upload_image(&state, form.file).await?;
    Ok(Json(ApiResponse::success(
        "Media uploaded",
        ImageUrlResponse { image_url },
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/media/product/{product_id}",
    params(
        ("product_id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "List media for a product", body = ApiResponse<MediaList>)
    ),
    tag = "Media"
)]
pub async fn get_by_product_id(
    Path(product_id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<MediaList>>> {
    let resp = media_service::find_by_product_id(&state, &product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/media/{id}",
    params(
        ("id" = String, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Deleted media"),
        (status = 404, description = "Media not found"),
    ),
    tag = "Media"
)]
pub async fn delete_by_id(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = media_service::delete_by_id(&state, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/media/product/{product_id}",
    params(
        ("product_id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Deleted all media for a product")
    ),
    tag = "Media"
)]
pub async fn delete_by_product_id(
    Path(product_id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = media_service::delete_by_product_id(&state, &product_id).await?;
    Ok(Json(resp))
}
