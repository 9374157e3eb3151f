//! Database migrations.
//!
//! Migrations live in `migrations/` at the workspace root and are embedded
//! at compile time. Neither server runs them on startup.

use thiserror::Error;

use super::{ConnectError, connect};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply every pending migration.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;
    let migrator = sqlx::migrate!("../../migrations");

    tracing::info!(available = migrator.iter().count(), "Running migrations");
    migrator.run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
