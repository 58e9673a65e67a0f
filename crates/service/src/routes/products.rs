//! Product route handlers.
//!
//! List endpoints accept the upstream query vocabulary (`catalogID`,
//! `categoryID`, `supplierID`, `search`, `searchOn`, `sortBy`, `page`,
//! `pageSize`) plus `isFavorite`; every other parameter is passed through as
//! an upstream filter.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{Product, ProductPage, ProductPageV2, ProductV2};
use crate::services::ProductListRequest;
use crate::state::AppState;

/// Pagination query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Product filter query parameters.
#[derive(Debug, Deserialize)]
pub struct FilterParams {
    #[serde(default, alias = "Search")]
    pub search: String,
}

/// Build a listing request from raw query parameters.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for a non-numeric page, page size or a
/// non-boolean `isFavorite`.
pub fn product_list_request(params: HashMap<String, String>) -> Result<ProductListRequest> {
    let mut request = ProductListRequest::default();

    for (key, value) in params {
        let query = &mut request.query;
        match key.as_str() {
            "catalogID" => query.catalog_id = Some(value),
            "categoryID" => query.category_id = Some(value),
            "supplierID" => query.supplier_id = Some(value),
            "search" => query.search = Some(value),
            "searchOn" => query.search_on = Some(value),
            "sortBy" => query.sort_by = Some(value),
            "page" => query.page = Some(parse_param(&key, &value)?),
            "pageSize" => query.page_size = Some(parse_param(&key, &value)?),
            "isFavorite" => request.favorites_only = parse_param(&key, &value)?,
            _ => query.set_filter(key, value),
        }
    }

    Ok(request)
}

fn parse_param<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid value for {key}: {value}")))
}

/// GET /api/products
pub async fn index(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ProductPage>> {
    let request = product_list_request(params)?;
    Ok(Json(state.products().products(&user_id, request).await?))
}

/// GET /api/products/{id}
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(product_id): Path<String>,
) -> Result<Json<Product>> {
    Ok(Json(state.products().product(&user_id, &product_id).await?))
}

/// GET /api/products/{id}/similar
pub async fn similar(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(product_id): Path<String>,
    Query(paging): Query<PageParams>,
) -> Result<Json<ProductPage>> {
    let page = state
        .products()
        .similar_products(&user_id, &product_id, paging.page, paging.page_size)
        .await?;
    Ok(Json(page))
}

/// GET /api/products/{id}/recommendations
pub async fn recommendations(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Query(paging): Query<PageParams>,
) -> Result<Json<ProductPageV2>> {
    let page = state
        .products()
        .recommended_products(&product_id, paging.page, paging.page_size)
        .await?;
    Ok(Json(page))
}

/// GET /api/products/trending
pub async fn trending(State(state): State<AppState>) -> Result<Json<ProductPage>> {
    Ok(Json(state.products().trending_products().await?))
}

/// GET /api/products/filters
pub async fn filters(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Vec<serde_json::Value>>> {
    Ok(Json(state.products().product_filters(&params.search).await?))
}

/// GET /api/v2/products
pub async fn index_v2(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ProductPageV2>> {
    let request = product_list_request(params)?;
    Ok(Json(state.products().products_v2(&user_id, request).await?))
}

/// GET /api/v2/products/{id}
pub async fn show_v2(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(product_id): Path<String>,
) -> Result<Json<ProductV2>> {
    Ok(Json(
        state.products().product_v2(&user_id, &product_id).await?,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ordercloud::ProductQuery;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_known_params_map_to_query_fields() {
        let request = product_list_request(params(&[
            ("catalogID", "zp-sg"),
            ("categoryID", "fruit"),
            ("search", "mango"),
            ("page", "2"),
            ("pageSize", "30"),
            ("isFavorite", "true"),
        ]))
        .unwrap();

        assert!(request.favorites_only);
        assert_eq!(
            request.query,
            ProductQuery {
                catalog_id: Some("zp-sg".to_string()),
                category_id: Some("fruit".to_string()),
                search: Some("mango".to_string()),
                page: Some(2),
                page_size: Some(30),
                ..ProductQuery::default()
            }
        );
    }

    #[test]
    fn test_unknown_params_become_filters() {
        let request =
            product_list_request(params(&[("xp.Brand", "Sun"), ("Active", "false")])).unwrap();

        assert_eq!(request.query.filters.get("xp.Brand").unwrap(), "Sun");
        assert_eq!(request.query.filters.get("Active").unwrap(), "false");
        assert!(!request.favorites_only);
    }

    #[test]
    fn test_invalid_numbers_are_bad_requests() {
        for bad in [("page", "two"), ("pageSize", "-1"), ("isFavorite", "yes")] {
            let err = product_list_request(params(&[bad])).unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)), "{bad:?}");
        }
    }
}
