use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::post,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::AppState;

pub mod handlers;

/// Build the webhook router. CORS is deliberately permissive: preflights are
/// answered unconditionally, matching the webhook surface this replaces.
pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/webhooks/product-approval", post(handlers::product_approval))
        .route("/webhooks/odoo-status-sync", post(handlers::odoo_status_sync))
        .route(
            "/webhooks/send-push-notification",
            post(handlers::send_push_notification),
        )
        .layer(middleware::from_fn_with_state(state, api_key_auth))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Middleware: compares the `x-api-key` header against the configured
/// pre-shared key. Mismatch or absence → 401 `{"error":"Unauthorized"}`.
async fn api_key_auth(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if key == state.config.webhook_api_key => Ok(next.run(req).await),
        Some(_) => {
            tracing::warn!("webhook auth: invalid api key");
            Err(AppError::Unauthorized)
        }
        None => {
            tracing::warn!("webhook auth: missing x-api-key header");
            Err(AppError::Unauthorized)
        }
    }
}
