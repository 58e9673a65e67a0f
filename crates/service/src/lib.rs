//! Catalog aggregation service library.
//!
//! Sits between storefront clients and the upstream catalog API: rebuilds
//! category trees, enriches product listings with per-user favorites and
//! batch-fetched pricing, and serves a trending list refreshed in the
//! background from local order statistics.
//!
//! The binary in `main.rs` wires these modules together; they are exposed
//! here so they can be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod ordercloud;
pub mod routes;
pub mod services;
pub mod state;
