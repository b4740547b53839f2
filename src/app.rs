use crate::attio_client::AttioClient;
use crate::config::Config;
use crate::handlers::{self, AppState};
use crate::obs;
use crate::relay::Relay;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};

/// Fillout payloads are small; anything above this is rejected before parsing.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Wires the configuration into shared state.
pub fn build_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let attio = AttioClient::new(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize Attio client: {}", e))?;
    tracing::info!("✓ Attio client initialized: {}", config.attio_base_url);

    Ok(Arc::new(AppState {
        relay: Relay::new(Arc::new(config), attio),
    }))
}

/// Router shared by every deployment target.
pub fn build_router(state: Arc<AppState>) -> Router {
    let webhook = post(handlers::fillout_webhook).fallback(handlers::webhook_method_fallback);

    let webhook_routes = Router::new()
        .route("/webhook", webhook.clone())
        .route("/api/webhook", webhook)
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(webhook_routes)
        .with_state(state)
        .layer(obs::trace_layer())
        .layer(CorsLayer::permissive())
}
