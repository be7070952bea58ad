use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the webhook surface.
///
/// Validation and authorization errors short-circuit before any network
/// call; not-found errors short-circuit before ERP mirroring. Mirror
/// failures never appear here — they are downgraded inside the sync
/// orchestrator to `odoo_sync: false` on a success response.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("seller not found")]
    SellerNotFound,

    #[error("product not found or doesn't belong to seller")]
    ProductNotFound,

    /// ERP authenticate/search failed during a status check. Fatal: there is
    /// no honest local fallback value to report.
    #[error("reconciliation failed: {0}")]
    ReconciliationFailed(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Unauthorized" }),
            ),
            AppError::MissingFields(fields) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": format!("Missing required fields: {}", fields.join(", ")) }),
            ),
            AppError::SellerNotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Seller not found" }),
            ),
            AppError::ProductNotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Product not found or doesn't belong to seller" }),
            ),
            AppError::ReconciliationFailed(e) => {
                tracing::error!("reconciliation failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "success": false,
                        "error": e,
                        "message": "Failed to check Odoo status",
                    }),
                )
            }
            AppError::Database(e) => {
                tracing::error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_message_lists_fields_in_order() {
        let err = AppError::MissingFields(vec!["product_id", "seller_id"]);
        assert_eq!(
            err.to_string(),
            "missing required fields: product_id, seller_id"
        );
    }

    #[test]
    fn ownership_miss_and_absence_share_one_variant() {
        // A product under the wrong seller must be indistinguishable from an
        // absent product, so both map to the same error.
        let err = AppError::ProductNotFound;
        assert_eq!(
            err.to_string(),
            "product not found or doesn't belong to seller"
        );
    }
}
