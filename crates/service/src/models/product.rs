//! Catalog products and their enriched forms.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{PriceSchedule, PriceScheduleSummary};

/// A catalog product.
///
/// `is_favorite` and `price_schedule` are derived per request by the
/// enrichment pipeline and never come from upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Product {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(
        rename = "DefaultPriceScheduleID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_price_schedule_id: Option<String>,
    #[serde(
        rename = "DefaultSupplierID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_supplier_id: Option<String>,
    #[serde(rename = "OwnerID", default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_multiplier: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_count: Option<i32>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_schedule: Option<PriceSchedule>,
    /// Upstream fields not modelled above (e.g. `xp`, `Inventory`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A product as returned by the seller-center upstream.
///
/// The seller-center wraps the catalog product together with its pricing,
/// specs and variants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductV2 {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_schedule: Option<PriceScheduleSummary>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProductV2 {
    /// Id of the wrapped product, falling back to the wrapper id.
    #[must_use]
    pub fn product_id(&self) -> &str {
        self.product
            .as_ref()
            .map_or(self.id.as_str(), |product| product.id.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserializes_upstream_shape() {
        let product: Product = serde_json::from_str(
            r#"{"ID":"p-1","Name":"Mango","Active":true,"DefaultPriceScheduleID":"p-1","xp":{"Brand":"Sun"}}"#,
        )
        .unwrap();

        assert_eq!(product.id, "p-1");
        assert_eq!(product.name.as_deref(), Some("Mango"));
        assert!(!product.is_favorite);
        assert!(product.price_schedule.is_none());
        assert_eq!(product.extra["xp"]["Brand"], "Sun");
    }

    #[test]
    fn test_missing_price_schedule_is_not_serialized() {
        let product = Product {
            id: "p-1".to_string(),
            ..Product::default()
        };
        let value = serde_json::to_value(&product).unwrap();
        assert!(value.get("PriceSchedule").is_none());
        assert_eq!(value["IsFavorite"], false);
    }

    #[test]
    fn test_v2_product_id_prefers_nested_product() {
        let wrapped: ProductV2 =
            serde_json::from_str(r#"{"ID":"outer","Product":{"ID":"inner"}}"#).unwrap();
        assert_eq!(wrapped.product_id(), "inner");

        let bare: ProductV2 = serde_json::from_str(r#"{"ID":"outer"}"#).unwrap();
        assert_eq!(bare.product_id(), "outer");
    }
}
