use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::errors::AppError;
use crate::models::payloads::{
    ApprovalSyncRequest, ApprovalSyncResponse, PushRequest, PushResponse, StatusSyncRequest,
    StatusSyncResponse, UserRef,
};
use crate::notification::fcm::Target;
use crate::sync;
use crate::AppState;

/// POST /webhooks/product-approval — apply an approval decision locally and
/// mirror the product into the ERP when product data is supplied.
pub async fn product_approval(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ApprovalSyncRequest>,
) -> Result<Json<ApprovalSyncResponse>, AppError> {
    let outcome = sync::approval::run(&state.db, &state.odoo, payload).await?;

    Ok(Json(ApprovalSyncResponse {
        success: true,
        message: "Product approval status updated successfully".into(),
        product_id: outcome.product_id,
        product_type: outcome.product_type,
        status: outcome.status,
        odoo_product_id: outcome.odoo_product_id,
        odoo_sync: outcome.odoo_sync,
    }))
}

/// POST /webhooks/odoo-status-sync — compare local approval status with the
/// ERP record and report (or write back) drift.
pub async fn odoo_status_sync(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<StatusSyncRequest>,
) -> Result<Json<StatusSyncResponse>, AppError> {
    let current_status = payload.current_status;
    let outcome = sync::reconcile::run(&state.db, &state.odoo, payload).await?;

    // validate() ran inside the orchestrator, so current_status is present
    // whenever we get here.
    let current_status = current_status.unwrap_or(outcome.status);

    let message = if !outcome.found {
        "Product not found in Odoo, keeping current status".to_string()
    } else if outcome.status_changed {
        format!("Status changed from {current_status} to {}", outcome.status)
    } else {
        format!("Status unchanged: {current_status}")
    };

    Ok(Json(StatusSyncResponse {
        success: true,
        odoo_status: outcome.status,
        current_status,
        status_changed: outcome.status_changed,
        odoo_product_id: outcome.odoo_product_id,
        odoo_state: outcome.odoo_state,
        odoo_active: outcome.odoo_active,
        message,
    }))
}

/// POST /webhooks/send-push-notification — FCM dispatch to a device or topic.
pub async fn send_push_notification(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PushRequest>,
) -> Response {
    let Some(fcm) = &state.fcm else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": "Missing Firebase service account credentials",
                "message": "FIREBASE_SERVICE_ACCOUNT is not configured",
            })),
        )
            .into_response();
    };

    if payload.title.is_none() && payload.body.is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": "Missing required fields",
                "message": "Either title or body must be provided",
            })),
        )
            .into_response();
    }

    if payload.target_user_id.is_some() && payload.target_user_type.is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": "Invalid target parameters",
                "message": "target_user_type is required when target_user_id is provided",
            })),
        )
            .into_response();
    }

    match dispatch_push(&state, fcm, &payload).await {
        Ok(message_name) => {
            if let Some(admin_id) = payload.admin_id {
                let metadata = json!({
                    "title": payload.title,
                    "target_user_id": payload.target_user_id,
                    "topic": payload.topic,
                    "fcm_message_name": message_name,
                });
                if let Err(e) = state
                    .db
                    .log_admin_action(admin_id, "send_push_notification", metadata)
                    .await
                {
                    // Audit logging never fails the request.
                    tracing::warn!(error = %e, "failed to record admin action log");
                }
            }

            Json(PushResponse {
                success: true,
                message: "Push notification sent successfully".into(),
                message_name: Some(message_name),
                project_id: fcm.project_id().to_string(),
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "push notification failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": e.to_string(),
                    "message": "Failed to send push notification",
                })),
            )
                .into_response()
        }
    }
}

async fn dispatch_push(
    state: &AppState,
    fcm: &crate::notification::fcm::FcmClient,
    payload: &PushRequest,
) -> anyhow::Result<String> {
    let target = match (&payload.target_user_id, payload.target_user_type) {
        (Some(raw), Some(user_type)) => {
            let user = UserRef::parse(raw);
            let token = state
                .db
                .fcm_token_for_user(user_type, &user)
                .await?
                .ok_or_else(|| anyhow::anyhow!("no FCM token found for user {raw}"))?;
            Target::DeviceToken(token)
        }
        _ => match &payload.topic {
            Some(topic) => Target::Topic(topic.clone()),
            None => Target::Topic("all_users".into()),
        },
    };

    fcm.send(
        &target,
        payload.title.as_deref().unwrap_or("Notification"),
        payload.body.as_deref().unwrap_or("You have a new notification"),
        payload.data.as_ref(),
        payload.deep_link_url.as_deref(),
    )
    .await
}
