use axum::{Router, routing::get};

use marketplace_services::{
    config::ServerConfig,
    routes::{self, docs},
    server,
    services::registry_service::RegistryState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    server::init_tracing();

    let config = ServerConfig::from_env(8761);
    let state = RegistryState::from_env();

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/registry", routes::registry::router())
        .merge(docs::registry_docs())
        .with_state(state);
    let app = server::apply_base_layers(app, server::DEFAULT_BODY_LIMIT);

    server::serve(app, &config.host, config.port).await
}
