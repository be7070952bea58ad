use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Three-valued approval lifecycle flag carried by every product.
///
/// No transition order is enforced here: the ERP (or an admin acting through
/// it) is authoritative and any value may overwrite any value.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminator selecting which product table (and approval table) a record
/// lives in.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Meat,
    Livestock,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Meat => "meat",
            ProductType::Livestock => "livestock",
        }
    }

    /// Table holding the product rows for this type.
    pub fn product_table(&self) -> &'static str {
        match self {
            ProductType::Meat => "meat_products",
            ProductType::Livestock => "livestock_listings",
        }
    }

    /// Approval table and its product foreign-key column.
    pub fn approval_table(&self) -> (&'static str, &'static str) {
        match self {
            ProductType::Meat => ("product_approvals", "meat_product_id"),
            ProductType::Livestock => ("livestock_approvals", "livestock_listing_id"),
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recipient class for push notifications; selects the table the device
/// token is looked up in.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Customer,
    Seller,
    Admin,
}

impl UserType {
    pub fn table(&self) -> &'static str {
        match self {
            UserType::Customer => "customers",
            UserType::Seller => "sellers",
            UserType::Admin => "admin_users",
        }
    }

    /// Phone column for phone-number targeting; admins carry no phone.
    pub fn phone_column(&self) -> Option<&'static str> {
        match self {
            UserType::Customer => Some("phone_number"),
            UserType::Seller => Some("contact_phone"),
            UserType::Admin => None,
        }
    }
}

/// A product row as read from either product table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: String,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub approval_status: ApprovalStatus,
    pub approved_at: Option<DateTime<Utc>>,
    pub odoo_product_id: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

/// One upsert against the type-specific approval table, keyed by product id.
#[derive(Debug, Clone)]
pub struct ApprovalUpsert {
    pub product_id: Uuid,
    pub approval_status: ApprovalStatus,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_status_serde_roundtrip() {
        let s: ApprovalStatus = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(s, ApprovalStatus::Approved);
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"approved\"");
    }

    #[test]
    fn product_type_selects_tables() {
        assert_eq!(ProductType::Meat.product_table(), "meat_products");
        assert_eq!(
            ProductType::Meat.approval_table(),
            ("product_approvals", "meat_product_id")
        );
        assert_eq!(ProductType::Livestock.product_table(), "livestock_listings");
        assert_eq!(
            ProductType::Livestock.approval_table(),
            ("livestock_approvals", "livestock_listing_id")
        );
    }

    #[test]
    fn user_type_selects_token_table() {
        assert_eq!(UserType::Customer.table(), "customers");
        assert_eq!(UserType::Seller.table(), "sellers");
        assert_eq!(UserType::Admin.table(), "admin_users");
    }

    #[test]
    fn user_type_selects_phone_column() {
        assert_eq!(UserType::Customer.phone_column(), Some("phone_number"));
        assert_eq!(UserType::Seller.phone_column(), Some("contact_phone"));
        assert_eq!(UserType::Admin.phone_column(), None);
    }
}
