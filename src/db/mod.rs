//! Local persistence layer: accounts, card catalog, and score history.

use diesel::Connection;
use diesel::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{info, instrument};

mod accounts;
mod catalog;
mod error;
mod models;
mod schema; // Diesel generated schema - internal use only

pub use accounts::AccountStore;
pub use catalog::CatalogStore;
pub use error::DbError;
pub use models::{
    ATTEMPTS_SENTINEL, Account, CatalogCard, NewAccount, NewCatalogCard, NewScoreRecord,
    ScoreRecord,
};

/// Embedded schema migrations, applied at bootstrap.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Applies any pending migrations to the database at the given path.
///
/// # Errors
///
/// Returns [`DbError`] if the connection or a migration fails.
#[instrument(skip(db_path), fields(db_path = %db_path))]
pub fn apply_migrations(db_path: &str) -> Result<(), DbError> {
    let mut conn = SqliteConnection::establish(db_path)
        .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", db_path, e)))?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DbError::new(format!("Migration error: {}", e)))?;

    info!(count = applied.len(), "Migrations applied");
    Ok(())
}
