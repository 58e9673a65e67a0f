//! Recent search route handlers.

use axum::{
    Json,
    extract::{Query, State},
};

use super::products::PageParams;
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::RecentSearch;
use crate::state::AppState;

/// GET /api/recent-searches
pub async fn index(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(paging): Query<PageParams>,
) -> Result<Json<Vec<RecentSearch>>> {
    let searches = state
        .recent_searches()
        .list(&user_id, paging.page, paging.page_size)
        .await?;
    Ok(Json(searches))
}
