//! HTTP route handlers for the catalog service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                            - Liveness check
//! GET  /health/ready                      - Readiness check (database)
//!
//! # Categories
//! GET  /api/categories                    - Category tree (?catalogID, ?depth)
//!
//! # Products (user required unless noted)
//! GET  /api/products                      - Enriched product listing
//! GET  /api/products/trending             - Trending products (no user)
//! GET  /api/products/filters              - Filter facets (?search, no user)
//! GET  /api/products/{id}                 - Enriched product
//! GET  /api/products/{id}/similar         - Products in the same category
//! GET  /api/products/{id}/recommendations - Recommendations (no user)
//! GET  /api/v2/products                   - Seller-center listing
//! GET  /api/v2/products/{id}              - Seller-center product
//!
//! # Favorites (user required)
//! PUT  /api/favorites/{product_id}        - Mark or unmark ({"isFavorite": bool})
//!
//! # Pricing
//! GET  /api/price-schedules               - Schedules for ?productID
//!
//! # Recent searches (user required)
//! GET  /api/recent-searches               - Newest first
//! ```

pub mod categories;
pub mod favorites;
pub mod price_schedules;
pub mod products;
pub mod recent_searches;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/trending", get(products::trending))
        .route("/filters", get(products::filters))
        .route("/{id}", get(products::show))
        .route("/{id}/similar", get(products::similar))
        .route("/{id}/recommendations", get(products::recommendations))
}

/// Create the seller-center product routes router.
pub fn product_v2_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index_v2))
        .route("/{id}", get(products::show_v2))
}

/// Create all API routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(categories::index))
        .nest("/products", product_routes())
        .nest("/v2/products", product_v2_routes())
        .route("/favorites/{product_id}", put(favorites::update))
        .route("/price-schedules", get(price_schedules::index))
        .route("/recent-searches", get(recent_searches::index))
}

/// Create all routes for the catalog service.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
