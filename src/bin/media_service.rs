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

    let config = AppConfig::from_env(8083)?;
    let database = db::connect(&config.database_url, &config.database_name).await?;

    let state = AppState {
        db: database,
        clients: ServiceClients::from_env(),
    };

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/media", routes::media::router())
        .merge(docs::media_docs())
        .with_state(state);
    let app = server::apply_base_layers(app, server::UPLOAD_BODY_LIMIT);

    clients::register_self("media-service").await;
    server::serve(app, &config.host, config.port).await
}
