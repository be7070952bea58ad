//! Typed request/response payloads for the webhook endpoints.
//!
//! Required fields are modeled as `Option` and checked by `validate()`, so a
//! request missing several fields gets one 400 naming all of them, and no
//! external call is made before validation passes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::product::{ApprovalStatus, ProductType, UserType};

// ── Product approval sync ────────────────────────────────────

/// Inbound payload for the product-approval webhook.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ApprovalSyncRequest {
    pub product_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    pub product_type: Option<ProductType>,
    pub approval_status: Option<ApprovalStatus>,
    /// Present iff the product should be mirrored into the ERP.
    pub product_data: Option<ProductData>,
    pub rejection_reason: Option<String>,
}

/// Product fields forwarded to the ERP when mirroring is requested.
///
/// `seller_id` here is the seller's *display name*, not the local key — the
/// ERP record has no structured seller link, so the name is embedded in the
/// mirror record's own name and description.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProductData {
    pub name: Option<String>,
    pub list_price: Option<f64>,
    pub seller_id: Option<String>,
    pub seller_uid: Option<String>,
    pub default_code: Option<String>,
    pub description: Option<String>,
}

/// `ApprovalSyncRequest` after validation, with required fields unwrapped.
#[derive(Debug, Clone)]
pub struct ValidatedSync {
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub product_type: ProductType,
    pub approval_status: ApprovalStatus,
    pub product_data: Option<ProductData>,
    pub rejection_reason: Option<String>,
}

impl ApprovalSyncRequest {
    pub fn validate(self) -> Result<ValidatedSync, AppError> {
        let mut missing = Vec::new();
        if self.product_id.is_none() {
            missing.push("product_id");
        }
        if self.seller_id.is_none() {
            missing.push("seller_id");
        }
        if self.product_type.is_none() {
            missing.push("product_type");
        }
        if self.approval_status.is_none() {
            missing.push("approval_status");
        }
        if let Some(data) = &self.product_data {
            if data.name.as_deref().map_or(true, str::is_empty) {
                missing.push("product_data.name");
            }
        }
        if !missing.is_empty() {
            return Err(AppError::MissingFields(missing));
        }
        Ok(ValidatedSync {
            product_id: self.product_id.unwrap(),
            seller_id: self.seller_id.unwrap(),
            product_type: self.product_type.unwrap(),
            approval_status: self.approval_status.unwrap(),
            product_data: self.product_data,
            rejection_reason: self.rejection_reason,
        })
    }
}

/// Success body for the product-approval webhook.
#[derive(Debug, Serialize)]
pub struct ApprovalSyncResponse {
    pub success: bool,
    pub message: String,
    pub product_id: Uuid,
    pub product_type: ProductType,
    pub status: ApprovalStatus,
    pub odoo_product_id: Option<i64>,
    pub odoo_sync: bool,
}

// ── Status reconciliation ────────────────────────────────────

/// Inbound payload for the status-sync webhook.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StatusSyncRequest {
    pub product_id: Option<Uuid>,
    /// Must follow the mirror-name convention for the name-based fallback
    /// lookup to succeed.
    pub product_name: Option<String>,
    pub current_status: Option<ApprovalStatus>,
    /// Optional: lets the orchestrator load the local row, prefer the
    /// persisted ERP id over the name match, and write back confirmed drift.
    pub product_type: Option<ProductType>,
}

#[derive(Debug, Clone)]
pub struct ValidatedStatusSync {
    pub product_id: Uuid,
    pub product_name: String,
    pub current_status: ApprovalStatus,
    pub product_type: Option<ProductType>,
}

impl StatusSyncRequest {
    pub fn validate(self) -> Result<ValidatedStatusSync, AppError> {
        let mut missing = Vec::new();
        if self.product_id.is_none() {
            missing.push("product_id");
        }
        if self.product_name.as_deref().map_or(true, str::is_empty) {
            missing.push("product_name");
        }
        if self.current_status.is_none() {
            missing.push("current_status");
        }
        if !missing.is_empty() {
            return Err(AppError::MissingFields(missing));
        }
        Ok(ValidatedStatusSync {
            product_id: self.product_id.unwrap(),
            product_name: self.product_name.unwrap(),
            current_status: self.current_status.unwrap(),
            product_type: self.product_type,
        })
    }
}

/// Success body for the status-sync webhook.
#[derive(Debug, Serialize)]
pub struct StatusSyncResponse {
    pub success: bool,
    pub odoo_status: ApprovalStatus,
    pub current_status: ApprovalStatus,
    pub status_changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub odoo_product_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub odoo_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub odoo_active: Option<bool>,
    pub message: String,
}

// ── Push notification ────────────────────────────────────────

/// Inbound payload for the push-notification endpoint.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PushRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    /// User key or phone number; see [`UserRef::parse`].
    pub target_user_id: Option<String>,
    pub target_user_type: Option<UserType>,
    pub topic: Option<String>,
    pub data: Option<serde_json::Map<String, serde_json::Value>>,
    pub deep_link_url: Option<String>,
    /// When present, the send is recorded in the admin action log.
    pub admin_id: Option<Uuid>,
}

/// How a `target_user_id` string resolves: a UUID targets the primary key,
/// anything else is treated as a phone number and matched against the
/// user-type's phone column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    Id(Uuid),
    Phone(String),
}

impl UserRef {
    pub fn parse(raw: &str) -> Self {
        match Uuid::parse_str(raw) {
            Ok(id) => UserRef::Id(id),
            Err(_) => UserRef::Phone(raw.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PushResponse {
    pub success: bool,
    pub message: String,
    pub message_name: Option<String>,
    pub project_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_validation_names_every_missing_field() {
        let req = ApprovalSyncRequest {
            product_data: Some(ProductData::default()),
            ..Default::default()
        };
        let err = req.validate().unwrap_err();
        match err {
            AppError::MissingFields(fields) => {
                assert_eq!(
                    fields,
                    vec![
                        "product_id",
                        "seller_id",
                        "product_type",
                        "approval_status",
                        "product_data.name"
                    ]
                );
            }
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn sync_validation_passes_without_product_data() {
        let req = ApprovalSyncRequest {
            product_id: Some(Uuid::new_v4()),
            seller_id: Some(Uuid::new_v4()),
            product_type: Some(ProductType::Meat),
            approval_status: Some(ApprovalStatus::Approved),
            ..Default::default()
        };
        let valid = req.validate().unwrap();
        assert!(valid.product_data.is_none());
        assert_eq!(valid.approval_status, ApprovalStatus::Approved);
    }

    #[test]
    fn status_sync_rejects_empty_product_name() {
        let req = StatusSyncRequest {
            product_id: Some(Uuid::new_v4()),
            product_name: Some(String::new()),
            current_status: Some(ApprovalStatus::Pending),
            product_type: None,
        };
        match req.validate().unwrap_err() {
            AppError::MissingFields(fields) => assert_eq!(fields, vec!["product_name"]),
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn push_request_accepts_phone_number_target() {
        let req: PushRequest = serde_json::from_str(
            r#"{"title":"Test","body":"hi",
                "target_user_id":"6362924334",
                "target_user_type":"customer"}"#,
        )
        .unwrap();
        assert_eq!(req.target_user_id.as_deref(), Some("6362924334"));
        assert_eq!(
            UserRef::parse(req.target_user_id.as_deref().unwrap()),
            UserRef::Phone("6362924334".into())
        );
    }

    #[test]
    fn user_ref_distinguishes_uuid_from_phone() {
        let id = Uuid::new_v4();
        assert_eq!(UserRef::parse(&id.to_string()), UserRef::Id(id));
        assert_eq!(
            UserRef::parse("+91 6362924334"),
            UserRef::Phone("+91 6362924334".into())
        );
    }

    #[test]
    fn sync_request_tolerates_absent_optional_fields() {
        let req: ApprovalSyncRequest = serde_json::from_str(
            r#"{"product_id":"00000000-0000-0000-0000-000000000001",
                "seller_id":"00000000-0000-0000-0000-000000000002",
                "product_type":"livestock",
                "approval_status":"rejected",
                "rejection_reason":"incomplete listing"}"#,
        )
        .unwrap();
        let valid = req.validate().unwrap();
        assert_eq!(valid.product_type, ProductType::Livestock);
        assert_eq!(valid.rejection_reason.as_deref(), Some("incomplete listing"));
    }
}
