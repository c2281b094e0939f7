//! Database configuration module.

use crate::config::env::APP_CONFIG;
use crate::error::AppResult;
use once_cell::sync::OnceCell;
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

static DB_POOL: OnceCell<PgPool> = OnceCell::new();

/// Initializes the database connection pool.
///
/// The pool is stored in a global `OnceCell`; subsequent calls return the same pool.
pub async fn init_db() -> AppResult<PgPool> {
    if let Some(pool) = DB_POOL.get() {
        return Ok(pool.clone());
    }

    let pool = PgPoolOptions::new()
        .max_connections(APP_CONFIG.db_max_connections)
        .min_connections(APP_CONFIG.db_min_connections)
        .acquire_timeout(Duration::from_secs(APP_CONFIG.db_acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(APP_CONFIG.db_idle_timeout_secs))
        .max_lifetime(Duration::from_secs(APP_CONFIG.db_max_lifetime_secs))
        .acquire_slow_threshold(Duration::from_millis(500))
        .connect(&APP_CONFIG.database_url)
        .await?;

    DB_POOL.set(pool.clone()).ok();
    tracing::info!(
        max_connections = APP_CONFIG.db_max_connections,
        min_connections = APP_CONFIG.db_min_connections,
        "Database connection pool established"
    );

    Ok(pool)
}

/// Runs the embedded schema migrations. Called once at startup.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Closes the database connection pool.
pub async fn close_db() {
    if let Some(pool) = DB_POOL.get() {
        pool.close().await;
        tracing::info!("Database connection closed");
    }
}
