pub mod models;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Connect the process-wide pool and bring the schema up to date.
///
/// The pool bounds concurrent database sessions; excess demand queues on
/// acquire rather than failing immediately.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_url())
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    info!(
        "connected to database {} ({} max connections)",
        config.name, config.max_connections
    );
    Ok(pool)
}
