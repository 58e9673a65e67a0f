//! Price schedules from the pricing upstream.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A quantity tier within a price schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PriceBreak {
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_price: Option<f64>,
}

/// A price schedule. Its id matches the id of the product it prices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PriceSchedule {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "OwnerID", default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub apply_tax: bool,
    #[serde(default)]
    pub apply_shipping: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_quantity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_quantity: Option<i32>,
    #[serde(default)]
    pub use_cumulative_quantity: bool,
    #[serde(default)]
    pub restricted_quantity: bool,
    #[serde(default)]
    pub price_breaks: Vec<PriceBreak>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_end: Option<String>,
    #[serde(default)]
    pub is_on_sale: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reduced price schedule used by the recommendation response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PriceScheduleSummary {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "OwnerID", default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub apply_tax: bool,
    #[serde(default)]
    pub apply_shipping: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_quantity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_quantity: Option<i32>,
    #[serde(default)]
    pub use_cumulative_quantity: bool,
    #[serde(default)]
    pub restricted_quantity: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_end: Option<String>,
    #[serde(default)]
    pub is_on_sale: bool,
    #[serde(default)]
    pub price_breaks: Vec<PriceBreak>,
}

impl From<PriceSchedule> for PriceScheduleSummary {
    fn from(schedule: PriceSchedule) -> Self {
        Self {
            id: schedule.id,
            owner_id: schedule.owner_id,
            name: schedule.name,
            apply_tax: schedule.apply_tax,
            apply_shipping: schedule.apply_shipping,
            min_quantity: schedule.min_quantity,
            max_quantity: schedule.max_quantity,
            use_cumulative_quantity: schedule.use_cumulative_quantity,
            restricted_quantity: schedule.restricted_quantity,
            currency: schedule.currency,
            sale_start: schedule.sale_start,
            sale_end: schedule.sale_end,
            is_on_sale: schedule.is_on_sale,
            price_breaks: schedule.price_breaks,
        }
    }
}
