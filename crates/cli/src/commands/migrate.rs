//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! catalog-cli migrate run
//!
//! # List migrations and whether they have been applied
//! catalog-cli migrate status
//! ```
//!
//! # Environment Variables
//!
//! - `CATALOG_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! Migrations live in `crates/service/migrations/` and are embedded at build
//! time:
//! ```text
//! migrations/
//! ├── 20240301000001_create_catalog_schema.sql
//! ├── 20240301000002_create_recent_searches.sql
//! └── 20240301000003_create_trending_products.sql
//! ```

use std::collections::HashSet;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::migrate::{Migrate, Migrator};

static MIGRATOR: Migrator = sqlx::migrate!("../service/migrations");

/// Errors from migration commands.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

fn database_url() -> Result<SecretString, MigrationError> {
    dotenvy::dotenv().ok();

    std::env::var("CATALOG_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("CATALOG_DATABASE_URL"))
}

async fn connect() -> Result<PgPool, MigrationError> {
    let database_url = database_url()?;
    tracing::info!("Connecting to catalog database...");
    Ok(PgPool::connect(database_url.expose_secret()).await?)
}

/// Apply pending catalog migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails, or
/// a migration fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running catalog migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Catalog migrations complete!");
    Ok(())
}

/// Log every known migration and whether it has been applied.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the migrations table
/// cannot be read.
pub async fn status() -> Result<(), MigrationError> {
    let pool = connect().await?;
    let mut conn = pool.acquire().await?;

    conn.ensure_migrations_table().await?;
    let applied: HashSet<i64> = conn
        .list_applied_migrations()
        .await?
        .into_iter()
        .map(|m| m.version)
        .collect();

    for migration in MIGRATOR.iter() {
        let state = if applied.contains(&migration.version) {
            "applied"
        } else {
            "pending"
        };
        tracing::info!(
            version = migration.version,
            description = %migration.description,
            state,
            "Migration"
        );
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_migrations_are_ordered() {
        let versions: Vec<i64> = MIGRATOR.iter().map(|m| m.version).collect();
        assert_eq!(versions.len(), 3);
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
    }
}
