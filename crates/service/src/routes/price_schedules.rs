//! Price schedule route handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::PriceSchedulePage;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceScheduleParams {
    #[serde(rename = "productID")]
    pub product_id: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// GET /api/price-schedules?productID=...
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<PriceScheduleParams>,
) -> Result<Json<PriceSchedulePage>> {
    let product_id = params
        .product_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("productID is required".to_string()))?;

    let page = state
        .price_schedules()
        .price_schedules(&product_id, params.page, params.page_size)
        .await?;
    Ok(Json(page))
}
