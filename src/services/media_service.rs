use futures::TryStreamExt;
use mongodb::{Collection, Database, bson::doc, bson::oid::ObjectId};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    dto::media::{MediaList, MediaResponse, UploadFile},
    error::{AppError, AppResult},
    models::Media,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

const FORBIDDEN_NAME_TOKENS: [&str; 10] =
    ["..", "/", "\\", ":", "*", "?", "\"", "<", ">", "|"];

fn media(db: &Database) -> Collection<Media> {
    db.collection::<Media>("media")
}

fn parse_id(id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::BadRequest("Invalid media id".to_string()))
}

// ---------------------------------------------------------------------------
// Validation pipeline: empty -> name -> size -> MIME -> magic bytes.
// First failure wins; nothing reaches storage.
// ---------------------------------------------------------------------------

pub fn validate_file(file: &UploadFile) -> AppResult<()> {
    if file.bytes.is_empty() {
        return Err(AppError::BadRequest(
            "File cannot be null or empty".to_string(),
        ));
    }
    validate_file_name(file.file_name.as_deref())?;
    validate_file_size(file.bytes.len())?;
    let content_type = validate_content_type(file.content_type.as_deref())?;
    validate_signature(&content_type, &file.bytes)
}

fn validate_file_name(name: Option<&str>) -> AppResult<()> {
    let name = name.unwrap_or("").trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("File name cannot be empty".to_string()));
    }
    if name.len() > 255 {
        return Err(AppError::BadRequest(
            "File name too long (max 255 characters)".to_string(),
        ));
    }
    if FORBIDDEN_NAME_TOKENS.iter().any(|token| name.contains(token)) {
        return Err(AppError::BadRequest(
            "File name contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_file_size(size: usize) -> AppResult<()> {
    if size > MAX_FILE_SIZE {
        return Err(AppError::BadRequest(
            "File size exceeds maximum limit of 5MB".to_string(),
        ));
    }
    Ok(())
}

fn validate_content_type(content_type: Option<&str>) -> AppResult<String> {
    let content_type = content_type.unwrap_or("").to_lowercase();
    if !is_supported_image(&content_type) {
        return Err(AppError::BadRequest(
            "Only JPEG, PNG, GIF and WEBP images are allowed.".to_string(),
        ));
    }
    Ok(content_type)
}

fn is_supported_image(content_type: &str) -> bool {
    matches!(
        content_type,
        "image/jpeg" | "image/jpg" | "image/png" | "image/gif" | "image/webp"
    )
}

fn validate_signature(content_type: &str, bytes: &[u8]) -> AppResult<()> {
    if bytes.len() < 4 {
        return Err(AppError::BadRequest(
            "File too small to be a valid image".to_string(),
        ));
    }

    let (matches_signature, label) = match content_type {
        "image/jpeg" | "image/jpg" => (is_jpeg(bytes), "JPEG"),
        "image/png" => (is_png(bytes), "PNG"),
        "image/gif" => (is_gif(bytes), "GIF"),
        "image/webp" => (is_webp(bytes), "WebP"),
        _ => {
            return Err(AppError::BadRequest(
                "Unsupported image format".to_string(),
            ));
        }
    };

    if !matches_signature {
        return Err(AppError::BadRequest(format!(
            "File content does not match {} format",
            label
        )));
    }
    Ok(())
}

fn is_jpeg(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0xFF, 0xD8])
}

fn is_png(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])
}

fn is_gif(bytes: &[u8]) -> bool {
    bytes.len() >= 6
        && bytes.starts_with(b"GIF8")
        && (bytes[4] == b'7' || bytes[4] == b'9')
        && bytes[5] == b'a'
}

fn is_webp(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP"
}

// ---------------------------------------------------------------------------
// Filename sanitization for storage keys.
// ---------------------------------------------------------------------------

static DISALLOWED_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9._-]").unwrap());
static SEPARATOR_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[._-]+").unwrap());
static EDGE_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[._-]+|[._-]+$").unwrap());

/// Strip anything the storage backend rejects (emoji, spaces, path chars),
/// collapse separator runs, cap the stem at 50 chars, keep the extension.
pub fn sanitize_file_name(original: Option<&str>) -> String {
    let original = original.unwrap_or("").trim();
    if original.is_empty() {
        return "file".to_string();
    }

    let (stem, extension) = match original.rfind('.') {
        Some(idx) if idx > 0 => (&original[..idx], &original[idx..]),
        _ => (original, ""),
    };

    let mut stem = DISALLOWED_CHARS.replace_all(stem, "").into_owned();
    stem = SEPARATOR_RUNS.replace_all(&stem, "_").into_owned();
    stem = EDGE_SEPARATORS.replace_all(&stem, "").into_owned();
    if stem.is_empty() {
        stem = "file".to_string();
    }
    if stem.len() > 50 {
        stem.truncate(50);
    }

    format!("{}{}", stem, extension)
}

// ---------------------------------------------------------------------------
// Record operations.
// ---------------------------------------------------------------------------

pub async fn upload_and_save(
    state: &AppState,
    file: UploadFile,
    product_id: &str,
) -> AppResult<ApiResponse<MediaResponse>> {
    validate_file(&file)?;

    let image_url = state.clients.storage()?.upload(&file).await?;
    let record = Media {
        id: None,
        image_url,
        product_id: product_id.to_string(),
    };
    let result = media(&state.db).insert_one(&record, None).await?;
    let id = result
        .inserted_id
        .as_object_id()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("insert returned no ObjectId")))?;
    let saved = Media {
        id: Some(id),
        ..record
    };

    Ok(ApiResponse::success(
        "Media created",
        MediaResponse::from(&saved),
        Some(Meta::empty()),
    ))
}

/// Validate and store the bytes without persisting a record (avatar uploads).
pub async fn upload_image(state: &AppState, file: UploadFile) -> AppResult<String> {
    validate_file(&file)?;
    state.clients.storage()?.upload(&file).await
}

pub async fn find_by_product_id(
    state: &AppState,
    product_id: &str,
) -> AppResult<ApiResponse<MediaList>> {
    let found: Vec<Media> = media(&state.db)
        .find(doc! { "productId": product_id }, None)
        .await?
        .try_collect()
        .await?;
    let items = found.iter().map(MediaResponse::from).collect();
    Ok(ApiResponse::success(
        "Media",
        MediaList { items },
        Some(Meta::empty()),
    ))
}

pub async fn delete_by_id(state: &AppState, id: &str) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = media(&state.db)
        .delete_one(doc! { "_id": parse_id(id)? }, None)
        .await?;
    if result.deleted_count == 0 {
        return Err(AppError::NotFound);
    }
    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn delete_by_product_id(
    state: &AppState,
    product_id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    media(&state.db)
        .delete_many(doc! { "productId": product_id }, None)
        .await?;
    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
