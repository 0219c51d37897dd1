use axum::{Json, Router, routing::delete, routing::get};
use mongodb::bson::{doc, oid::ObjectId};

use marketplace_services::{
    clients::ServiceClients,
    db,
    dto::{
        media::MediaResponse,
        products::{ProductForm, ProductRequest},
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::Product,
    response::ApiResponse,
    services::product_service,
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

async fn empty_media_list() -> Json<ApiResponse<Vec<MediaResponse>>> {
    Json(ApiResponse::success("Media", Vec::new(), None))
}

async fn deleted() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success("Deleted", serde_json::json!({}), None))
}

fn form(name: &str, price: f64) -> ProductForm {
    ProductForm {
        fields: ProductRequest {
            name: name.to_string(),
            description: "Hand made".to_string(),
            price,
            quantity: 5,
        },
        images: Vec::new(),
    }
}

fn seller(user_id: &str) -> AuthUser {
    AuthUser {
        user_id: user_id.to_string(),
        email: "seller@example.com".to_string(),
        authorities: vec!["SELLER".to_string()],
    }
}

// Integration flow: seller-only creation, non-owner mutation forbidden and
// entity untouched, owner mutation applied, delete cascades to media.
#[tokio::test]
async fn product_mutations_are_ownership_gated() -> anyhow::Result<()> {
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
    products.delete_many(doc! {}, None).await?;

    let media_addr = serve(
        Router::new()
            .route("/api/media/product/{product_id}", get(empty_media_list))
            .route("/api/media/product/{product_id}", delete(deleted)),
    )
    .await?;

    let state = AppState {
        db: database.clone(),
        clients: ServiceClients::new(None, Some(format!("http://{}", media_addr)), None),
    };

    let owner_id = ObjectId::new().to_hex();

    // A plain client may not create products at all.
    let client = AuthUser {
        user_id: ObjectId::new().to_hex(),
        email: "buyer@example.com".to_string(),
        authorities: vec!["CLIENT".to_string()],
    };
    let refused = product_service::create_product(&state, &client, form("Basket", 30.0)).await;
    assert!(matches!(refused, Err(AppError::Forbidden)));

    let created =
        product_service::create_product(&state, &seller(&owner_id), form("Basket", 30.0)).await?;
    let created = created.data.expect("created product");
    assert_eq!(created.user_id, owner_id);
    assert!(created.images.is_empty());

    // Another seller cannot touch it, and nothing changes.
    let other_seller = seller(&ObjectId::new().to_hex());
    let forbidden =
        product_service::update_product(&state, &other_seller, &created.id, form("Stolen", 1.0))
            .await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    let unchanged = product_service::get_product(&state, &created.id).await?;
    let unchanged = unchanged.data.expect("product");
    assert_eq!(unchanged.name, "Basket");
    assert_eq!(unchanged.price, 30.0);

    let updated = product_service::update_product(
        &state,
        &seller(&owner_id),
        &created.id,
        form("Basket XL", 35.0),
    )
    .await?;
    assert_eq!(updated.data.expect("product").price, 35.0);

    let forbidden_delete =
        product_service::delete_product(&state, &other_seller, &created.id).await;
    assert!(matches!(forbidden_delete, Err(AppError::Forbidden)));

    product_service::delete_product(&state, &seller(&owner_id), &created.id).await?;
    assert!(matches!(
        product_service::get_product(&state, &created.id).await,
        Err(AppError::NotFound)
    ));

    Ok(())
}
