//! Favorite route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::CurrentUser;
use crate::models::ProductFavorite;
use crate::state::AppState;

/// Request body for marking or unmarking a favorite.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub is_favorite: bool,
}

/// PUT /api/favorites/{product_id}
///
/// Returns the stored favorite when marking, `null` when unmarking. Marking a
/// product twice is a `409 Conflict`.
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(product_id): Path<String>,
    Json(body): Json<FavoriteRequest>,
) -> Result<Json<Option<ProductFavorite>>> {
    let message = if body.is_favorite {
        "Marked product favorite"
    } else {
        "Unmarked product favorite"
    };
    add_breadcrumb("favorites", message, Some(&[("product_id", product_id.as_str())]));

    let favorite = state
        .products()
        .set_favorite(&user_id, &product_id, body.is_favorite)
        .await?;
    Ok(Json(favorite))
}
