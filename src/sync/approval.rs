//! Product Sync Orchestrator: one approval-status change, synchronized into
//! the local store and, when product data is supplied, mirrored into the ERP.

use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::payloads::ApprovalSyncRequest;
use crate::models::product::{ApprovalStatus, ApprovalUpsert, ProductType};
use crate::odoo::OdooClient;
use crate::store::ApprovalStore;
use crate::sync::mirror;

/// Result of one sync run, returned verbatim to the caller. `odoo_sync` is
/// false whenever mirroring was skipped or failed; the local update happens
/// either way.
#[derive(Debug)]
pub struct SyncOutcome {
    pub product_id: Uuid,
    pub product_type: ProductType,
    pub status: ApprovalStatus,
    pub odoo_product_id: Option<i64>,
    pub odoo_sync: bool,
}

pub async fn run<S: ApprovalStore>(
    store: &S,
    odoo: &OdooClient,
    request: ApprovalSyncRequest,
) -> Result<SyncOutcome, AppError> {
    let valid = request.validate()?;

    if !store.seller_exists(valid.seller_id).await? {
        return Err(AppError::SellerNotFound);
    }

    // Ownership check: an id under a different seller is a miss, identical
    // to a genuinely absent product.
    store
        .get_product(valid.product_type, valid.product_id, valid.seller_id)
        .await?
        .ok_or(AppError::ProductNotFound)?;

    // ERP mirroring is best-effort: local approval bookkeeping is the source
    // of truth for the mobile client and must not be blocked by ERP
    // unavailability.
    let mut odoo_product_id = None;
    if let Some(data) = &valid.product_data {
        match mirror::mirror_product(odoo, data).await {
            Ok(id) => {
                odoo_product_id = Some(id);
                store
                    .set_odoo_product_id(valid.product_type, valid.product_id, id)
                    .await?;
            }
            Err(e) => {
                tracing::warn!(
                    product_id = %valid.product_id,
                    error = %e,
                    "odoo mirroring failed, continuing with local update"
                );
            }
        }
    }

    let now = Utc::now();
    let approved_at = (valid.approval_status == ApprovalStatus::Approved).then_some(now);
    let rejected_at = (valid.approval_status == ApprovalStatus::Rejected).then_some(now);

    store
        .update_product_approval(
            valid.product_type,
            valid.product_id,
            valid.approval_status,
            approved_at,
            now,
        )
        .await?;

    store
        .upsert_approval(
            valid.product_type,
            ApprovalUpsert {
                product_id: valid.product_id,
                approval_status: valid.approval_status,
                approved_at,
                rejected_at,
                rejection_reason: valid.rejection_reason,
                updated_at: now,
            },
        )
        .await?;

    tracing::info!(
        product_id = %valid.product_id,
        product_type = %valid.product_type,
        status = %valid.approval_status,
        odoo_sync = odoo_product_id.is_some(),
        "approval status updated"
    );

    Ok(SyncOutcome {
        product_id: valid.product_id,
        product_type: valid.product_type,
        status: valid.approval_status,
        odoo_product_id,
        odoo_sync: odoo_product_id.is_some(),
    })
}
