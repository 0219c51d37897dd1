use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{Collection, Database, bson::doc, bson::oid::ObjectId};

use crate::{
    clients::ServiceClients,
    dto::orders::{OrderItemRequest, OrderList, OrderRequest, OrderResponse},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    state::AppState,
};

fn orders(db: &Database) -> Collection<Order> {
    db.collection::<Order>("order")
}

fn parse_id(id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::BadRequest("Invalid order id".to_string()))
}

fn validate(payload: &OrderRequest) -> AppResult<()> {
    if payload.user_id.trim().is_empty() {
        return Err(AppError::BadRequest("userId cannot be blank".to_string()));
    }
    if payload.payment_method.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Order payment method cannot be blank".to_string(),
        ));
    }
    if payload.status.trim().is_empty() {
        return Err(AppError::BadRequest("Status cannot be blank".to_string()));
    }
    if payload.items.is_empty() {
        return Err(AppError::BadRequest(
            "At least one item is required".to_string(),
        ));
    }
    if payload.items.iter().any(|item| item.quantity < 1) {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

pub fn compute_total(items: &[OrderItem]) -> f64 {
    items
        .iter()
        .map(|item| f64::from(item.quantity) * item.unit_price)
        .sum()
}

// Each line item snapshots the product's current price; the stored
// unitPrice never tracks later price changes. Any failed lookup fails the
// whole call.
async fn resolve_items(
    clients: &ServiceClients,
    items: &[OrderItemRequest],
) -> AppResult<Vec<OrderItem>> {
    let product_client = clients.product().await?;
    let mut resolved = Vec::with_capacity(items.len());
    for item in items {
        let product = product_client.get_by_id(&item.product_id).await?;
        resolved.push(OrderItem {
            id: ObjectId::new(),
            product_id: item.product_id.clone(),
            order_id: None,
            quantity: item.quantity,
            unit_price: product.price,
        });
    }
    Ok(resolved)
}

pub async fn create_order(
    state: &AppState,
    payload: OrderRequest,
) -> AppResult<ApiResponse<OrderResponse>> {
    validate(&payload)?;

    let items = resolve_items(&state.clients, &payload.items).await?;
    let order = Order {
        id: None,
        user_id: payload.user_id,
        total: compute_total(&items),
        // New orders always start out pending, whatever the request says.
        status: "pending".to_string(),
        payment_method: payload.payment_method,
        order_item_list: items,
        created_at: Utc::now(),
    };

    let result = orders(&state.db).insert_one(&order, None).await?;
    let id = result
        .inserted_id
        .as_object_id()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("insert returned no ObjectId")))?;
    let saved = Order {
        id: Some(id),
        ..order
    };

    Ok(ApiResponse::success(
        "Order created",
        OrderResponse::from(&saved),
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(state: &AppState) -> AppResult<ApiResponse<OrderList>> {
    let found: Vec<Order> = orders(&state.db)
        .find(doc! {}, None)
        .await?
        .try_collect()
        .await?;
    let items = found.iter().map(OrderResponse::from).collect();
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_order(state: &AppState, id: &str) -> AppResult<ApiResponse<OrderResponse>> {
    let order = orders(&state.db)
        .find_one(doc! { "_id": parse_id(id)? }, None)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Order", OrderResponse::from(&order), None))
}

pub async fn update_order(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: OrderRequest,
) -> AppResult<ApiResponse<OrderResponse>> {
    let oid = parse_id(id)?;
    let existing = orders(&state.db)
        .find_one(doc! { "_id": oid }, None)
        .await?
        .ok_or(AppError::NotFound)?;

    if existing.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    validate(&payload)?;
    let items = resolve_items(&state.clients, &payload.items).await?;
    let updated = Order {
        id: Some(oid),
        user_id: payload.user_id,
        total: compute_total(&items),
        status: payload.status,
        payment_method: payload.payment_method,
        order_item_list: items,
        created_at: existing.created_at,
    };
    orders(&state.db)
        .replace_one(doc! { "_id": oid }, &updated, None)
        .await?;

    Ok(ApiResponse::success(
        "Updated",
        OrderResponse::from(&updated),
        Some(Meta::empty()),
    ))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let oid = parse_id(id)?;
    let existing = orders(&state.db)
        .find_one(doc! { "_id": oid }, None)
        .await?
        .ok_or(AppError::NotFound)?;

    if existing.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    orders(&state.db).delete_one(doc! { "_id": oid }, None).await?;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32, unit_price: f64) -> OrderItem {
        OrderItem {
            id: ObjectId::new(),
            product_id: ObjectId::new().to_hex(),
            order_id: None,
            quantity,
            unit_price,
        }
    }

    #[test]
    fn total_is_sum_of_quantity_times_unit_price() {
        let items = vec![item(2, 10.0), item(3, 1.5)];
        assert_eq!(compute_total(&items), 24.5);
    }

    #[test]
    fn empty_order_totals_zero() {
        assert_eq!(compute_total(&[]), 0.0);
    }

    #[test]
    fn total_is_stable_against_later_price_changes() {
        // The snapshot lives on the item itself; recomputing from the same
        // items must not depend on any live product state.
        let items = vec![item(4, 25.0)];
        let total_at_creation = compute_total(&items);
        assert_eq!(total_at_creation, 100.0);
        assert_eq!(compute_total(&items), total_at_creation);
    }

    fn valid_request() -> OrderRequest {
        OrderRequest {
            user_id: "64f000000000000000000001".to_string(),
            payment_method: "card".to_string(),
            status: "pending".to_string(),
            items: vec![OrderItemRequest {
                product_id: "64f000000000000000000002".to_string(),
                quantity: 1,
            }],
        }
    }

    #[test]
    fn request_requires_items() {
        let mut payload = valid_request();
        payload.items.clear();
        assert!(validate(&payload).is_err());
    }

    #[test]
    fn request_rejects_zero_quantity() {
        let mut payload = valid_request();
        payload.items[0].quantity = 0;
        assert!(validate(&payload).is_err());
    }

    #[test]
    fn request_requires_payment_method() {
        let mut payload = valid_request();
        payload.payment_method = "".to_string();
        assert!(validate(&payload).is_err());
    }
}
