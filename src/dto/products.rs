use axum::extract::Multipart;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::media::{MediaResponse, UploadFile},
    error::{AppError, AppResult},
    models::Product,
};

// Create and update both take the full field set (an update replaces the
// document, it does not patch it).
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
}

// Multipart form: the scalar fields above plus any number of `images` parts.
pub struct ProductForm {
    pub fields: ProductRequest,
    pub images: Vec<UploadFile>,
}

impl ProductForm {
    pub async fn from_multipart(multipart: &mut Multipart) -> AppResult<Self> {
        let mut name = None;
        let mut description = None;
        let mut price = None;
        let mut quantity = None;
        let mut images = Vec::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| AppError::BadRequest(err.to_string()))?
        {
            match field.name() {
                Some("name") => name = Some(text(field).await?),
                Some("description") => description = Some(text(field).await?),
                Some("price") => {
                    price =
                        Some(text(field).await?.parse::<f64>().map_err(|_| {
                            AppError::BadRequest("price must be a number".to_string())
                        })?)
                }
                Some("quantity") => {
                    quantity = Some(text(field).await?.parse::<i32>().map_err(|_| {
                        AppError::BadRequest("quantity must be an integer".to_string())
                    })?)
                }
                Some("images") => images.push(UploadFile::from_field(field).await?),
                _ => {}
            }
        }

        let fields = ProductRequest {
            name: name.ok_or_else(|| AppError::BadRequest("Missing name field".to_string()))?,
            description: description
                .ok_or_else(|| AppError::BadRequest("Missing description field".to_string()))?,
            price: price.ok_or_else(|| AppError::BadRequest("Missing price field".to_string()))?,
            quantity: quantity
                .ok_or_else(|| AppError::BadRequest("Missing quantity field".to_string()))?,
        };

        Ok(Self { fields, images })
    }
}

async fn text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|err| AppError::BadRequest(err.to_string()))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    pub user_id: String,
    pub images: Vec<MediaResponse>,
}

impl ProductResponse {
    pub fn new(product: &Product, images: Vec<MediaResponse>) -> Self {
        Self {
            id: product.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            quantity: product.quantity,
            user_id: product.user_id.clone(),
            images,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<ProductResponse>)]
    pub items: Vec<ProductResponse>,
}
