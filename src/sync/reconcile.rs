//! Status Reconciliation Orchestrator: ask the ERP for a product's current
//! record and report whether local and remote approval status disagree.
//!
//! Lookup prefers the ERP id persisted at mirror time; the case-insensitive
//! name match on the mirror-name convention remains as the fallback for
//! legacy/unmirrored records. A zero-match lookup is a success outcome, not
//! an error; any ERP failure aborts the call instead of reporting a
//! misleading status.

use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::payloads::StatusSyncRequest;
use crate::models::product::ApprovalStatus;
use crate::odoo::{OdooClient, OdooError, OdooSession};
use crate::store::ApprovalStore;

const PRODUCT_MODEL: &str = "product.template";
const SEARCH_FIELDS: &[&str] = &["id", "name", "state", "active"];

#[derive(Debug)]
pub struct ReconcileOutcome {
    pub found: bool,
    /// Remote status mapped onto the local vocabulary; the caller's current
    /// status when the product was not found.
    pub status: ApprovalStatus,
    pub status_changed: bool,
    pub odoo_product_id: Option<i64>,
    pub odoo_state: Option<String>,
    pub odoo_active: Option<bool>,
}

/// Collapse the ERP's native record state onto the three-value local enum.
/// Any richer ERP workflow state is lossy-mapped. Precedence: approval
/// markers are checked before rejection markers.
pub fn map_remote_status(state: Option<&str>, active: Option<bool>) -> ApprovalStatus {
    if state == Some("approved") || active == Some(true) {
        ApprovalStatus::Approved
    } else if state == Some("rejected") || active == Some(false) {
        ApprovalStatus::Rejected
    } else {
        ApprovalStatus::Pending
    }
}

pub async fn run<S: ApprovalStore>(
    store: &S,
    odoo: &OdooClient,
    request: StatusSyncRequest,
) -> Result<ReconcileOutcome, AppError> {
    let valid = request.validate()?;

    // The persisted mirror id is the primary correlation key; it is only
    // reachable when the request identifies the product table.
    let mirror_id = match valid.product_type {
        Some(product_type) => store
            .get_product_by_id(product_type, valid.product_id)
            .await?
            .and_then(|row| row.odoo_product_id),
        None => None,
    };

    let session = odoo
        .session()
        .await
        .map_err(|e| AppError::ReconciliationFailed(e.to_string()))?;

    let mut record = match mirror_id {
        Some(id) => {
            let hit = search_one(odoo, &session, json!([["id", "=", id]])).await?;
            if hit.is_none() {
                tracing::warn!(
                    product_id = %valid.product_id,
                    odoo_product_id = id,
                    "persisted mirror id not found in odoo, falling back to name match"
                );
            }
            hit
        }
        None => None,
    };
    if record.is_none() {
        record = search_one(
            odoo,
            &session,
            json!([["name", "ilike", valid.product_name]]),
        )
        .await?;
    }

    let Some(record) = record else {
        tracing::debug!(product_name = %valid.product_name, "product not found in odoo");
        return Ok(ReconcileOutcome {
            found: false,
            status: valid.current_status,
            status_changed: false,
            odoo_product_id: None,
            odoo_state: None,
            odoo_active: None,
        });
    };

    let odoo_state = record
        .get("state")
        .and_then(Value::as_str)
        .map(String::from);
    let odoo_active = record.get("active").and_then(Value::as_bool);
    let odoo_product_id = record.get("id").and_then(Value::as_i64);

    let status = map_remote_status(odoo_state.as_deref(), odoo_active);
    let status_changed = status != valid.current_status;

    if status_changed {
        if let Some(product_type) = valid.product_type {
            store
                .update_product_status(product_type, valid.product_id, status)
                .await?;
            tracing::info!(
                product_id = %valid.product_id,
                from = %valid.current_status,
                to = %status,
                "reconciliation confirmed drift, local status updated"
            );
        }
    }

    Ok(ReconcileOutcome {
        found: true,
        status,
        status_changed,
        odoo_product_id,
        odoo_state,
        odoo_active,
    })
}

/// One limited search; the ERP is assumed to hold at most one match and only
/// the first is taken.
async fn search_one(
    odoo: &OdooClient,
    session: &OdooSession,
    domain: Value,
) -> Result<Option<Value>, AppError> {
    let rows = odoo
        .search_read(session, PRODUCT_MODEL, domain, SEARCH_FIELDS, 1)
        .await
        .map_err(|e: OdooError| AppError::ReconciliationFailed(e.to_string()))?;
    Ok(rows.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_true_maps_to_approved() {
        assert_eq!(
            map_remote_status(None, Some(true)),
            ApprovalStatus::Approved
        );
        assert_eq!(
            map_remote_status(Some("draft"), Some(true)),
            ApprovalStatus::Approved
        );
    }

    #[test]
    fn active_false_maps_to_rejected() {
        assert_eq!(
            map_remote_status(None, Some(false)),
            ApprovalStatus::Rejected
        );
        assert_eq!(
            map_remote_status(Some("draft"), Some(false)),
            ApprovalStatus::Rejected
        );
    }

    #[test]
    fn explicit_state_markers_win_without_active_flag() {
        assert_eq!(
            map_remote_status(Some("approved"), None),
            ApprovalStatus::Approved
        );
        assert_eq!(
            map_remote_status(Some("rejected"), None),
            ApprovalStatus::Rejected
        );
    }

    #[test]
    fn approved_marker_takes_precedence_over_inactive_flag() {
        // Original mapping order: approval markers are checked first.
        assert_eq!(
            map_remote_status(Some("approved"), Some(false)),
            ApprovalStatus::Approved
        );
    }

    #[test]
    fn no_markers_map_to_pending() {
        assert_eq!(map_remote_status(None, None), ApprovalStatus::Pending);
        assert_eq!(
            map_remote_status(Some("draft"), None),
            ApprovalStatus::Pending
        );
    }

    #[test]
    fn mapping_is_deterministic() {
        for _ in 0..3 {
            assert_eq!(
                map_remote_status(Some("draft"), Some(true)),
                ApprovalStatus::Approved
            );
            assert_eq!(map_remote_status(None, None), ApprovalStatus::Pending);
        }
    }
}
