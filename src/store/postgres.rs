use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::payloads::UserRef;
use crate::models::product::{ApprovalStatus, ApprovalUpsert, ProductRow, ProductType, UserType};
use crate::store::ApprovalStore;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // -- Notification lookups (outside the ApprovalStore seam) --

    /// Device push token for a user, looked up in the type-selected table by
    /// primary key or phone number.
    pub async fn fcm_token_for_user(
        &self,
        user_type: UserType,
        user: &UserRef,
    ) -> anyhow::Result<Option<String>> {
        let token = match user {
            UserRef::Id(user_id) => {
                let query =
                    format!("SELECT fcm_token FROM {} WHERE id = $1", user_type.table());
                sqlx::query_scalar::<_, Option<String>>(&query)
                    .bind(user_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            UserRef::Phone(phone) => {
                let Some(column) = user_type.phone_column() else {
                    anyhow::bail!(
                        "{} records cannot be targeted by phone number",
                        user_type.table()
                    );
                };
                // Suffix match tolerates stored numbers with a country code.
                let query = format!(
                    "SELECT fcm_token FROM {} WHERE {column} LIKE '%' || $1 LIMIT 1",
                    user_type.table()
                );
                sqlx::query_scalar::<_, Option<String>>(&query)
                    .bind(phone)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        Ok(token.flatten())
    }

    /// Best-effort audit trail for admin-triggered notifications.
    pub async fn log_admin_action(
        &self,
        admin_id: Uuid,
        action: &str,
        metadata: serde_json::Value,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO admin_action_logs (admin_id, action, resource_type, metadata)
               VALUES ($1, $2, 'notification', $3)"#,
        )
        .bind(admin_id)
        .bind(action)
        .bind(metadata)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ApprovalStore for PgStore {
    async fn seller_exists(&self, seller_id: Uuid) -> anyhow::Result<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM sellers WHERE id = $1)")
                .bind(seller_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn get_product(
        &self,
        product_type: ProductType,
        product_id: Uuid,
        seller_id: Uuid,
    ) -> anyhow::Result<Option<ProductRow>> {
        let query = format!(
            "SELECT id, seller_id, name, price, description, approval_status, approved_at, \
             odoo_product_id, updated_at FROM {} WHERE id = $1 AND seller_id = $2",
            product_type.product_table()
        );
        let row = sqlx::query_as::<_, ProductRow>(&query)
            .bind(product_id)
            .bind(seller_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_product_by_id(
        &self,
        product_type: ProductType,
        product_id: Uuid,
    ) -> anyhow::Result<Option<ProductRow>> {
        let query = format!(
            "SELECT id, seller_id, name, price, description, approval_status, approved_at, \
             odoo_product_id, updated_at FROM {} WHERE id = $1",
            product_type.product_table()
        );
        let row = sqlx::query_as::<_, ProductRow>(&query)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_product_approval(
        &self,
        product_type: ProductType,
        product_id: Uuid,
        status: ApprovalStatus,
        approved_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let query = format!(
            "UPDATE {} SET approval_status = $2, approved_at = $3, updated_at = $4 WHERE id = $1",
            product_type.product_table()
        );
        let result = sqlx::query(&query)
            .bind(product_id)
            .bind(status)
            .bind(approved_at)
            .bind(updated_at)
            .execute(&self.pool)
            .await?;
        anyhow::ensure!(
            result.rows_affected() > 0,
            "product {product_id} vanished during update"
        );
        Ok(())
    }

    async fn set_odoo_product_id(
        &self,
        product_type: ProductType,
        product_id: Uuid,
        odoo_product_id: i64,
    ) -> anyhow::Result<()> {
        let query = format!(
            "UPDATE {} SET odoo_product_id = $2 WHERE id = $1",
            product_type.product_table()
        );
        sqlx::query(&query)
            .bind(product_id)
            .bind(odoo_product_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert_approval(
        &self,
        product_type: ProductType,
        record: ApprovalUpsert,
    ) -> anyhow::Result<()> {
        let (table, fk) = product_type.approval_table();
        let query = format!(
            r#"INSERT INTO {table} ({fk}, approval_status, approved_at, rejected_at, rejection_reason, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               ON CONFLICT ({fk}) DO UPDATE SET
                   approval_status = EXCLUDED.approval_status,
                   approved_at = EXCLUDED.approved_at,
                   rejected_at = EXCLUDED.rejected_at,
                   rejection_reason = EXCLUDED.rejection_reason,
                   updated_at = EXCLUDED.updated_at"#
        );
        sqlx::query(&query)
            .bind(record.product_id)
            .bind(record.approval_status)
            .bind(record.approved_at)
            .bind(record.rejected_at)
            .bind(record.rejection_reason)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_product_status(
        &self,
        product_type: ProductType,
        product_id: Uuid,
        status: ApprovalStatus,
    ) -> anyhow::Result<()> {
        let query = format!(
            "UPDATE {} SET approval_status = $2, updated_at = NOW() WHERE id = $1",
            product_type.product_table()
        );
        sqlx::query(&query)
            .bind(product_id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
