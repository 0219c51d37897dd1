use futures::TryStreamExt;
use mongodb::{Collection, Database, bson::doc, bson::oid::ObjectId};

use crate::{
    dto::{
        media::{MediaResponse, UploadFile},
        products::{ProductForm, ProductList, ProductRequest, ProductResponse},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_seller},
    models::Product,
    response::{ApiResponse, Meta},
    state::AppState,
};

fn products(db: &Database) -> Collection<Product> {
    db.collection::<Product>("products")
}

fn parse_id(id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::BadRequest("Invalid product id".to_string()))
}

fn validate(fields: &ProductRequest) -> AppResult<()> {
    if fields.name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Product name cannot be blank".to_string(),
        ));
    }
    if fields.description.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Product description cannot be blank".to_string(),
        ));
    }
    if fields.price <= 0.0 {
        return Err(AppError::BadRequest(
            "Product price must be positive".to_string(),
        ));
    }
    if fields.quantity < 1 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

// Create, then forward each image to the media service tagged with the new
// id. A failed upload fails the request and leaves the product without the
// remaining images; there is no rollback.
pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    form: ProductForm,
) -> AppResult<ApiResponse<ProductResponse>> {
    ensure_seller(user)?;
    validate(&form.fields)?;

    let product = Product {
        id: None,
        name: form.fields.name,
        description: form.fields.description,
        price: form.fields.price,
        quantity: form.fields.quantity,
        user_id: user.user_id.clone(),
    };
    let result = products(&state.db).insert_one(&product, None).await?;
    let id = result
        .inserted_id
        .as_object_id()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("insert returned no ObjectId")))?;
    let saved = Product {
        id: Some(id),
        ..product
    };

    let images = upload_images(state, &form.images, &id.to_hex()).await?;

    Ok(ApiResponse::success(
        "Product created",
        ProductResponse::new(&saved, images),
        Some(Meta::empty()),
    ))
}

pub async fn list_products(state: &AppState) -> AppResult<ApiResponse<ProductList>> {
    let found: Vec<Product> = products(&state.db)
        .find(doc! {}, None)
        .await?
        .try_collect()
        .await?;

    let mut items = Vec::with_capacity(found.len());
    for product in &found {
        let images = fetch_images(state, product).await?;
        items.push(ProductResponse::new(product, images));
    }

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_product(state: &AppState, id: &str) -> AppResult<ApiResponse<ProductResponse>> {
    let product = products(&state.db)
        .find_one(doc! { "_id": parse_id(id)? }, None)
        .await?
        .ok_or(AppError::NotFound)?;

    let images = fetch_images(state, &product).await?;
    Ok(ApiResponse::success(
        "Product",
        ProductResponse::new(&product, images),
        None,
    ))
}

pub async fn list_products_by_user(
    state: &AppState,
    user_id: &str,
) -> AppResult<ApiResponse<ProductList>> {
    let found: Vec<Product> = products(&state.db)
        .find(doc! { "userId": user_id }, None)
        .await?
        .try_collect()
        .await?;

    let mut items = Vec::with_capacity(found.len());
    for product in &found {
        let images = fetch_images(state, product).await?;
        items.push(ProductResponse::new(product, images));
    }

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    form: ProductForm,
) -> AppResult<ApiResponse<ProductResponse>> {
    ensure_seller(user)?;
    validate(&form.fields)?;

    let oid = parse_id(id)?;
    let existing = products(&state.db)
        .find_one(doc! { "_id": oid }, None)
        .await?
        .ok_or(AppError::NotFound)?;

    if existing.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let updated = Product {
        id: Some(oid),
        name: form.fields.name,
        description: form.fields.description,
        price: form.fields.price,
        quantity: form.fields.quantity,
        user_id: existing.user_id,
    };
    products(&state.db)
        .replace_one(doc! { "_id": oid }, &updated, None)
        .await?;

    if !form.images.is_empty() {
        tracing::debug!(product_id = %id, count = form.images.len(), "uploading new images");
        upload_images(state, &form.images, id).await?;
    }

    // Existing plus any newly uploaded.
    let images = fetch_images(state, &updated).await?;

    Ok(ApiResponse::success(
        "Updated",
        ProductResponse::new(&updated, images),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_seller(user)?;

    let oid = parse_id(id)?;
    let existing = products(&state.db)
        .find_one(doc! { "_id": oid }, None)
        .await?
        .ok_or(AppError::NotFound)?;

    if existing.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    products(&state.db)
        .delete_one(doc! { "_id": oid }, None)
        .await?;
    state
        .clients
        .media()
        .await?
        .delete_by_product_id(id)
        .await?;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn upload_images(
    state: &AppState,
    images: &[UploadFile],
    product_id: &str,
) -> AppResult<Vec<MediaResponse>> {
    if images.is_empty() {
        return Ok(Vec::new());
    }
    let media = state.clients.media().await?;
    let mut uploaded = Vec::with_capacity(images.len());
    for file in images {
        uploaded.push(media.upload(file, product_id).await?);
    }
    Ok(uploaded)
}

async fn fetch_images(state: &AppState, product: &Product) -> AppResult<Vec<MediaResponse>> {
    let id = product.id.map(|id| id.to_hex()).unwrap_or_default();
    state.clients.media().await?.get_by_product_id(&id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_fields() -> ProductRequest {
        ProductRequest {
            name: "Keyboard".to_string(),
            description: "65% mechanical".to_string(),
            price: 59.99,
            quantity: 10,
        }
    }

    #[test]
    fn valid_fields_pass() {
        assert!(validate(&valid_fields()).is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut fields = valid_fields();
        fields.name = "   ".to_string();
        assert!(validate(&fields).is_err());
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let mut fields = valid_fields();
        fields.price = 0.0;
        assert!(validate(&fields).is_err());
        fields.price = -1.0;
        assert!(validate(&fields).is_err());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut fields = valid_fields();
        fields.quantity = 0;
        assert!(validate(&fields).is_err());
    }

    #[test]
    fn malformed_id_is_a_bad_request() {
        assert!(matches!(parse_id("not-hex"), Err(AppError::BadRequest(_))));
        assert!(parse_id("64f000000000000000000001").is_ok());
    }
}
