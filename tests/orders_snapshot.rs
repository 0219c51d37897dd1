use axum::{Json, Router, routing::get};
use mongodb::bson::{doc, oid::ObjectId};

use marketplace_services::{
    clients::ServiceClients,
    db,
    dto::{
        media::MediaResponse,
        orders::{OrderItemRequest, OrderRequest},
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::{Order, Product},
    response::ApiResponse,
    routes,
    services::order_service,
    state::AppState,
};

async fn serve(app: Router) -> anyhow::Result<std::net::SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Ok(addr)
}

// Stands in for the media service; the product service asks it for images
// when serving a product.
async fn empty_media_list() -> Json<ApiResponse<Vec<MediaResponse>>> {
    Json(ApiResponse::success("Media", Vec::new(), None))
}

// Integration flow across real HTTP: the order service resolves prices from
// a running product service, snapshots them, and keeps the total stable when
// the live price later changes.
#[tokio::test]
async fn order_total_snapshots_product_prices() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let database = db::connect(&database_url, "marketplace_test").await?;
    let products = database.collection::<Product>("products");
    let orders = database.collection::<Order>("order");
    products.delete_many(doc! {}, None).await?;
    orders.delete_many(doc! {}, None).await?;

    let seller_id = ObjectId::new().to_hex();
    let inserted = products
        .insert_one(
            &Product {
                id: None,
                name: "Ngaya tee".to_string(),
                description: "Organic cotton".to_string(),
                price: 25.0,
                quantity: 10,
                user_id: seller_id,
            },
            None,
        )
        .await?;
    let product_id = inserted
        .inserted_id
        .as_object_id()
        .expect("product id")
        .to_hex();

    let media_addr = serve(Router::new().route(
        "/api/media/product/{product_id}",
        get(empty_media_list),
    ))
    .await?;

    let product_state = AppState {
        db: database.clone(),
        clients: ServiceClients::new(None, Some(format!("http://{}", media_addr)), None),
    };
    let product_addr = serve(
        Router::new()
            .nest("/api/products", routes::products::router())
            .with_state(product_state),
    )
    .await?;

    let order_state = AppState {
        db: database.clone(),
        clients: ServiceClients::new(Some(format!("http://{}", product_addr)), None, None),
    };

    let buyer_id = ObjectId::new().to_hex();
    let created = order_service::create_order(
        &order_state,
        OrderRequest {
            user_id: buyer_id.clone(),
            payment_method: "card".to_string(),
            status: "submitted".to_string(),
            items: vec![OrderItemRequest {
                product_id: product_id.clone(),
                quantity: 2,
            }],
        },
    )
    .await?;
    let created = created.data.expect("created order");
    assert_eq!(created.total, 50.0);
    // Creation always starts an order as pending.
    assert_eq!(created.status, "pending");
    assert_eq!(created.items.len(), 1);
    assert_eq!(created.items[0].unit_price, 25.0);

    // A later price change must not touch the stored snapshot.
    products
        .update_one(
            doc! { "_id": ObjectId::parse_str(&product_id)? },
            doc! { "$set": { "price": 99.0 } },
            None,
        )
        .await?;

    let fetched = order_service::get_order(&order_state, &created.id).await?;
    let fetched = fetched.data.expect("order");
    assert_eq!(fetched.total, 50.0);
    assert_eq!(fetched.items[0].unit_price, 25.0);

    // A dead product reference fails the whole call and persists nothing.
    let failed = order_service::create_order(
        &order_state,
        OrderRequest {
            user_id: buyer_id.clone(),
            payment_method: "card".to_string(),
            status: "submitted".to_string(),
            items: vec![OrderItemRequest {
                product_id: ObjectId::new().to_hex(),
                quantity: 1,
            }],
        },
    )
    .await;
    assert!(failed.is_err());
    assert_eq!(orders.count_documents(doc! {}, None).await?, 1);

    // Ownership gate: a different user may not delete the order.
    let intruder = AuthUser {
        user_id: ObjectId::new().to_hex(),
        email: "other@example.com".to_string(),
        authorities: vec!["CLIENT".to_string()],
    };
    let forbidden = order_service::delete_order(&order_state, &intruder, &created.id).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    let owner = AuthUser {
        user_id: buyer_id,
        email: "buyer@example.com".to_string(),
        authorities: vec!["CLIENT".to_string()],
    };
    order_service::delete_order(&order_state, &owner, &created.id).await?;
    assert_eq!(orders.count_documents(doc! {}, None).await?, 0);

    Ok(())
}
