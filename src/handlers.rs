use crate::errors::AppError;
use crate::relay::Relay;
use crate::webhook_models::WebhookSuccess;
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Relay with its immutable configuration and Attio client.
    pub relay: Relay,
}

/// Plain-text liveness banner.
pub async fn root() -> &'static str {
    "✅ Fillout → Attio webhook relay running"
}

/// Health check endpoint.
///
/// Returns the service status and version.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /webhook
///
/// Receives a Fillout submission and updates the matching Attio list entry.
/// Malformed JSON gets the same error envelope as every other client error.
pub async fn fillout_webhook(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<WebhookSuccess>), AppError> {
    tracing::info!("🔔 Fillout webhook received");

    let payload: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Default::default())
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::InvalidJson(e.to_string()))?
    };
    tracing::debug!("📦 Raw body received from Fillout: {}", payload);

    let outcome = state.relay.process(&payload).await?;

    Ok((StatusCode::OK, Json(outcome)))
}

/// Any non-POST method on the webhook routes.
///
/// GET answers 200 when the probe is enabled so the route can be checked from a browser.
pub async fn webhook_method_fallback(
    State(state): State<Arc<AppState>>,
    method: Method,
) -> Result<(StatusCode, Json<Value>), AppError> {
    tracing::info!("🔔 Webhook route called with method: {}", method);

    if method == Method::GET && state.relay.config().allow_get_probe {
        return Ok((
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "message": "Webhook route exists (GET)"
            })),
        ));
    }

    Err(AppError::MethodNotAllowed)
}
