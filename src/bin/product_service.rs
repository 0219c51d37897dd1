use axum::{Router, routing::get};

use marketplace_services::{
    clients::{self, ServiceClients},
    config::AppConfig,
    db,
    routes::{self, docs},
    server,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    server::init_tracing();

    let config = AppConfig::from_env(8082)?;
    let database = db::connect(&config.database_url, &config.database_name).await?;

    let state = AppState {
        db: database,
        clients: ServiceClients::from_env(),
    };

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/products", routes::products::router())
        .merge(docs::product_docs())
        .with_state(state);
    // Product create/update carry image parts, same limit as the media service.
    let app = server::apply_base_layers(app, server::UPLOAD_BODY_LIMIT);

    clients::register_self("product-service").await;
    server::serve(app, &config.host, config.port).await
}
