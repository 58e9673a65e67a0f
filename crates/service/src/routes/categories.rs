//! Category route handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::error::Result;
use crate::models::CategoryPage;
use crate::state::AppState;

/// Category tree query parameters. Blank values fall back to the configured
/// defaults.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryParams {
    #[serde(rename = "catalogID")]
    pub catalog_id: Option<String>,
    pub depth: Option<String>,
}

/// GET /api/categories
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<CategoryParams>,
) -> Result<Json<CategoryPage>> {
    let page = state
        .categories()
        .category_tree(params.catalog_id.as_deref(), params.depth.as_deref())
        .await?;
    Ok(Json(page))
}
