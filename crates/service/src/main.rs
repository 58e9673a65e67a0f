//! Catalog aggregation service.
//!
//! # Architecture
//!
//! - Axum JSON API behind a token-verifying gateway (`x-user-id`)
//! - Upstream catalog API for products, categories and pricing
//! - `PostgreSQL` for favorites, recent searches and order statistics
//! - In-process TTL cache for the trending list
//!
//! # Background tasks
//!
//! - Credential refresher: keeps the upstream access token current
//! - Trending refresher: recomputes the trending list hourly
//!
//! Both stop on SIGINT/SIGTERM; the server drains before they are joined.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::from_fn;
use catalog_service::cache::TtlCache;
use catalog_service::config::CatalogConfig;
use catalog_service::db::{self, TrendingRepository};
use catalog_service::middleware::request_id_middleware;
use catalog_service::ordercloud::{AccessCredential, OrderCloudClient, PasswordGrant};
use catalog_service::routes;
use catalog_service::services::{CredentialRefresher, TrendingRefresher};
use catalog_service::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CatalogConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = CatalogConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "catalog_service=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p catalog-cli -- migrate

    let credential = AccessCredential::new();
    let client = OrderCloudClient::new(&config.ordercloud, &config.catalog, credential.clone())
        .expect("Failed to build upstream client");
    let cache = TtlCache::new(config.cache_max_cost_bytes);

    let shutdown = CancellationToken::new();

    let credential_refresher = CredentialRefresher::new(
        Arc::new(PasswordGrant::new(client.http(), &config.ordercloud)),
        credential,
        config.ordercloud.token_refresh_interval,
    );
    let trending_refresher = TrendingRefresher::new(
        Arc::new(TrendingRepository::new(pool.clone())),
        cache.clone(),
        config.trending.clone(),
    );
    let background = vec![
        ("credential refresher", tokio::spawn(credential_refresher.run(shutdown.clone()))),
        ("trending refresher", tokio::spawn(trending_refresher.run(shutdown.clone()))),
    ];

    let state = AppState::new(pool, client, cache, config.catalog.clone());

    let app = routes::routes()
        .with_state(state)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .layer(CorsLayer::permissive())
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("catalog service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .expect("Server error");

    join_background(background).await;
    tracing::info!("Shutdown complete");
}

/// Wait for each background task, logging any that panicked.
async fn join_background(tasks: Vec<(&'static str, JoinHandle<()>)>) {
    for (name, handle) in tasks {
        if let Err(e) = handle.await {
            tracing::error!(task = name, error = %e, "Background task ended abnormally");
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM), then cancel background tasks.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
    shutdown.cancel();
}
