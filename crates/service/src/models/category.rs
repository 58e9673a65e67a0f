//! Catalog categories.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A catalog category.
///
/// Upstream returns categories as a flat list; `children` is only populated
/// after the hierarchy has been rebuilt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Category {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "ParentID", default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub child_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default)]
    pub children: Vec<Category>,
    /// Upstream fields not modelled above (e.g. `xp`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Category {
    /// Parent id, with a missing parent reported as `""`.
    #[must_use]
    pub fn parent(&self) -> &str {
        self.parent_id.as_deref().unwrap_or_default()
    }

    /// Whether this category sits at the top of the tree.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent().is_empty()
    }
}

/// Assignment of a product to a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CategoryAssignment {
    #[serde(rename = "CategoryID", default)]
    pub category_id: String,
    #[serde(rename = "ProductID", default)]
    pub product_id: String,
    #[serde(default)]
    pub list_order: i32,
}
