//! ERP mirroring: create the product's mirror record in Odoo.
//!
//! The mirror carries no structured seller link; the seller's display name
//! is folded into the record name and description instead, and the record
//! name doubles as the legacy correlation key for reconciliation.

use serde_json::json;
use uuid::Uuid;

use crate::models::payloads::ProductData;
use crate::odoo::OdooClient;

/// Fixed ERP category for mirrored products.
const DEFAULT_CATEGORY_ID: i64 = 1;

/// `"<product name> (by <seller display name>)"`.
pub fn mirror_name(name: &str, seller_name: &str) -> String {
    format!("{name} (by {seller_name})")
}

/// Description embedding the seller display name and uid for traceability.
pub fn mirror_description(data: &ProductData) -> String {
    format!(
        "{}\n\nSeller: {} ({})",
        data.description.as_deref().unwrap_or(""),
        data.seller_id.as_deref().unwrap_or("unknown"),
        data.seller_uid.as_deref().unwrap_or("unknown"),
    )
}

fn product_code(data: &ProductData) -> String {
    data.default_code
        .clone()
        .unwrap_or_else(|| format!("PRD-{}", Uuid::new_v4().simple()))
}

/// Create the mirror record in the ERP and return its assigned id.
///
/// Callers treat failure as non-fatal: the error is recorded, never raised
/// past the sync orchestrator.
pub async fn mirror_product(odoo: &OdooClient, data: &ProductData) -> anyhow::Result<i64> {
    let session = odoo.session().await?;

    let name = data.name.as_deref().unwrap_or_default();
    let seller_name = data.seller_id.as_deref().unwrap_or("unknown");

    let values = json!({
        "name": mirror_name(name, seller_name),
        "list_price": data.list_price.unwrap_or(0.0),
        "default_code": product_code(data),
        "description": mirror_description(data),
        "categ_id": DEFAULT_CATEGORY_ID,
        "type": "product",
    });

    let id = odoo.create(&session, "product.template", values).await?;
    tracing::info!(odoo_product_id = id, product = name, "mirrored product into odoo");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_name_embeds_seller_display_name() {
        assert_eq!(
            mirror_name("Goat Curry Cut", "Fresh Farm"),
            "Goat Curry Cut (by Fresh Farm)"
        );
    }

    #[test]
    fn description_carries_seller_traceability() {
        let data = ProductData {
            name: Some("Goat Curry Cut".into()),
            description: Some("1kg pack".into()),
            seller_id: Some("Fresh Farm".into()),
            seller_uid: Some("f4a2".into()),
            ..Default::default()
        };
        assert_eq!(
            mirror_description(&data),
            "1kg pack\n\nSeller: Fresh Farm (f4a2)"
        );
    }

    #[test]
    fn description_tolerates_missing_fields() {
        let data = ProductData::default();
        assert_eq!(mirror_description(&data), "\n\nSeller: unknown (unknown)");
    }

    #[test]
    fn supplied_product_code_wins_over_generated() {
        let data = ProductData {
            default_code: Some("SKU-42".into()),
            ..Default::default()
        };
        assert_eq!(product_code(&data), "SKU-42");

        let generated = product_code(&ProductData::default());
        assert!(generated.starts_with("PRD-"));
    }
}
