//! Session table migrations.
//!
//! # Usage
//!
//! ```bash
//! # Storefront sessions (tower_sessions.session)
//! souk-cli migrate storefront
//!
//! # Admin sessions (admin.session)
//! souk-cli migrate admin
//!
//! # Both
//! souk-cli migrate all
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for the storefront
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string for the admin console
//!
//! Both fall back to `DATABASE_URL`. The two stores may share a database:
//! they live in different schemas.

use secrecy::SecretString;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0} (or DATABASE_URL)")]
    MissingEnvVar(&'static str),

    /// Database connection or DDL error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Session store misconfiguration.
    #[error("Session store error: {0}")]
    Store(String),
}

fn database_url(key: &'static str) -> Result<SecretString, MigrationError> {
    std::env::var(key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar(key))
}

/// Create the storefront session table.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the DDL fails.
pub async fn storefront() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();
    let url = database_url("STOREFRONT_DATABASE_URL")?;

    tracing::info!("Connecting to storefront database...");
    let pool = souk_storefront::db::create_pool(&url).await?;

    tracing::info!("Creating storefront session table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Storefront migrations complete");
    Ok(())
}

/// Create the admin session table in its own schema.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the DDL fails.
pub async fn admin() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();
    let url = database_url("ADMIN_DATABASE_URL")?;

    tracing::info!("Connecting to admin database...");
    let pool = souk_admin::db::create_pool(&url).await?;

    tracing::info!(
        schema = souk_admin::db::SESSION_SCHEMA,
        table = souk_admin::db::SESSION_TABLE,
        "Creating admin session table..."
    );
    souk_admin::db::session_store(pool)
        .map_err(MigrationError::Store)?
        .migrate()
        .await?;

    tracing::info!("Admin migrations complete");
    Ok(())
}
