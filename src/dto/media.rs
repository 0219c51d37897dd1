use axum::{
    body::Bytes,
    extract::{Multipart, multipart::Field},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::Media,
};

// An uploaded file pulled out of a multipart body, name and declared MIME
// included so the validation pipeline can inspect them.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadFile {
    pub async fn from_field(field: Field<'_>) -> AppResult<Self> {
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::BadRequest(err.to_string()))?;
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }
}

// `PUT /api/media` carries `file` + `productId`; `POST /api/media` only `file`.
pub struct MediaUploadForm {
    pub file: UploadFile,
    pub product_id: Option<String>,
}

impl MediaUploadForm {
    pub async fn from_multipart(multipart: &mut Multipart) -> AppResult<Self> {
        let mut file = None;
        let mut product_id = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| AppError::BadRequest(err.to_string()))?
        {
            match field.name() {
                Some("file") => file = Some(UploadFile::from_field(field).await?),
                Some("productId") => {
                    product_id = Some(
                        field
                            .text()
                            .await
                            .map_err(|err| AppError::BadRequest(err.to_string()))?,
                    )
                }
                _ => {}
            }
        }

        let file = file.ok_or_else(|| AppError::BadRequest("Missing file part".to_string()))?;
        Ok(Self { file, product_id })
    }

    pub fn require_product_id(&self) -> AppResult<&str> {
        self.product_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("Missing productId part".to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaResponse {
    pub id: String,
    pub image_url: String,
    pub product_id: String,
}

impl From<&Media> for MediaResponse {
    fn from(media: &Media) -> Self {
        Self {
            id: media.id.map(|id| id.to_hex()).unwrap_or_default(),
            image_url: media.image_url.clone(),
            product_id: media.product_id.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageUrlResponse {
    pub image_url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct MediaList {
    #[schema(value_type = Vec<MediaResponse>)]
    pub items: Vec<MediaResponse>,
}
