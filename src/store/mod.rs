pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::product::{ApprovalStatus, ApprovalUpsert, ProductRow, ProductType};

/// Abstraction over the local record store touched by the orchestrators.
///
/// Production implementation: `postgres::PgStore`. Tests run the
/// orchestrators against an in-memory implementation instead of a live
/// database.
#[async_trait]
pub trait ApprovalStore: Send + Sync {
    /// Seller existence check; sellers are read-only for this subsystem.
    async fn seller_exists(&self, seller_id: Uuid) -> anyhow::Result<bool>;

    /// Fetch a product by `(id, seller_id)` from the type-selected table.
    /// A product owned by a different seller is a miss, same as an absent id.
    async fn get_product(
        &self,
        product_type: ProductType,
        product_id: Uuid,
        seller_id: Uuid,
    ) -> anyhow::Result<Option<ProductRow>>;

    /// Fetch a product by id alone (reconciliation path, ownership already
    /// established at sync time).
    async fn get_product_by_id(
        &self,
        product_type: ProductType,
        product_id: Uuid,
    ) -> anyhow::Result<Option<ProductRow>>;

    /// Write the approval status onto the product row. `approved_at` is set
    /// iff the status is approved, cleared otherwise.
    async fn update_product_approval(
        &self,
        product_type: ProductType,
        product_id: Uuid,
        status: ApprovalStatus,
        approved_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;

    /// Persist the ERP-assigned mirror id on the product row.
    async fn set_odoo_product_id(
        &self,
        product_type: ProductType,
        product_id: Uuid,
        odoo_product_id: i64,
    ) -> anyhow::Result<()>;

    /// Create-or-replace the approval record keyed by product id. Never
    /// produces a second row for the same product.
    async fn upsert_approval(
        &self,
        product_type: ProductType,
        record: ApprovalUpsert,
    ) -> anyhow::Result<()>;

    /// Reconciliation drift write-back: status only, no timestamps touched.
    async fn update_product_status(
        &self,
        product_type: ProductType,
        product_id: Uuid,
        status: ApprovalStatus,
    ) -> anyhow::Result<()>;
}
