//! Local account store.
//!
//! This is the authoritative side of the account data: every service
//! operation reads and writes here first, and remote mirroring happens
//! after the fact without ever rolling a local write back.

use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::db::models::ATTEMPTS_SENTINEL;
use crate::db::{Account, DbError, NewAccount, schema};

/// Maximum number of entries served by the ranking view.
const RANKING_LIMIT: i64 = 10;

/// SQLite-backed account store.
#[derive(Debug, Clone)]
pub struct AccountStore {
    db_path: String,
}

impl AccountStore {
    /// Creates a store connected to the database at the given path.
    ///
    /// Use `":memory:"` only for throwaway work; tests use tempfile paths
    /// so every connection sees the same database.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        info!(path = %db_path, "Creating AccountStore");
        Ok(Self { db_path })
    }

    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    /// Inserts a new account row, replacing any existing row with the same
    /// id (remote materialization reuses the remote document's id).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, account), fields(account_id = %account.id()))]
    pub fn upsert(&self, account: &NewAccount) -> Result<Account, DbError> {
        debug!("Upserting account");
        let mut conn = self.connection()?;

        diesel::replace_into(schema::accounts::table)
            .values(account)
            .execute(&mut conn)?;

        let stored = schema::accounts::table
            .find(account.id())
            .first::<Account>(&mut conn)?;

        info!(account_id = %stored.id(), email = %stored.email(), "Account stored");
        Ok(stored)
    }

    /// Gets an account by id, active or not. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: &str) -> Result<Option<Account>, DbError> {
        debug!(account_id = %id, "Looking up account by id");
        let mut conn = self.connection()?;

        let account = schema::accounts::table
            .find(id)
            .first::<Account>(&mut conn)
            .optional()?;

        Ok(account)
    }

    /// Gets the active account with the given email. Returns `None` if no
    /// active account uses it; deactivated rows are invisible here.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_active_by_email(&self, email: &str) -> Result<Option<Account>, DbError> {
        debug!(email = %email, "Looking up active account by email");
        let mut conn = self.connection()?;

        let account = schema::accounts::table
            .filter(schema::accounts::email.eq(email))
            .filter(schema::accounts::active.eq(true))
            .first::<Account>(&mut conn)
            .optional()?;

        if account.is_some() {
            debug!("Account found");
        } else {
            debug!("No active account for email");
        }

        Ok(account)
    }

    /// Lists all active accounts, ordered by display name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_active(&self) -> Result<Vec<Account>, DbError> {
        debug!("Listing active accounts");
        let mut conn = self.connection()?;

        let accounts = schema::accounts::table
            .filter(schema::accounts::active.eq(true))
            .order(schema::accounts::name.asc())
            .load::<Account>(&mut conn)?;

        info!(count = accounts.len(), "Active accounts loaded");
        Ok(accounts)
    }

    /// Returns true if an active account already uses the email.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn email_taken(&self, email: &str) -> Result<bool, DbError> {
        let mut conn = self.connection()?;

        let count: i64 = schema::accounts::table
            .filter(schema::accounts::email.eq(email))
            .filter(schema::accounts::active.eq(true))
            .count()
            .get_result(&mut conn)?;

        Ok(count > 0)
    }

    /// Stamps the last-login timestamp (epoch milliseconds).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn touch_last_login(&self, id: &str, timestamp_ms: i64) -> Result<(), DbError> {
        debug!(account_id = %id, "Stamping last login");
        let mut conn = self.connection()?;

        diesel::update(schema::accounts::table.find(id))
            .set(schema::accounts::last_login.eq(timestamp_ms))
            .execute(&mut conn)?;

        Ok(())
    }

    /// Raises the best score, applying only a strict improvement.
    ///
    /// The guard lives in the UPDATE itself, so a caller holding a stale
    /// account snapshot can never regress a better stored value. Returns
    /// true if the row changed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn raise_best_score(&self, id: &str, score: i32) -> Result<bool, DbError> {
        debug!(account_id = %id, score, "Raising best score");
        let mut conn = self.connection()?;

        let changed = diesel::update(
            schema::accounts::table
                .find(id)
                .filter(schema::accounts::best_score.lt(score)),
        )
        .set(schema::accounts::best_score.eq(score))
        .execute(&mut conn)?;

        if changed > 0 {
            info!(account_id = %id, score, "Best score improved");
        }
        Ok(changed > 0)
    }

    /// Lowers the fewest-attempts record, applying only a strict
    /// improvement; the sentinel counts as "always improvable". Returns
    /// true if the row changed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn lower_fewest_attempts(&self, id: &str, attempts: i32) -> Result<bool, DbError> {
        debug!(account_id = %id, attempts, "Lowering fewest attempts");
        let mut conn = self.connection()?;

        let changed = diesel::update(
            schema::accounts::table.find(id).filter(
                schema::accounts::fewest_attempts
                    .gt(attempts)
                    .or(schema::accounts::fewest_attempts.eq(ATTEMPTS_SENTINEL)),
            ),
        )
        .set(schema::accounts::fewest_attempts.eq(attempts))
        .execute(&mut conn)?;

        if changed > 0 {
            info!(account_id = %id, attempts, "Fewest attempts improved");
        }
        Ok(changed > 0)
    }

    /// Soft-deletes an account, freeing its email for re-registration.
    /// Returns true if a row was found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn deactivate(&self, id: &str) -> Result<bool, DbError> {
        debug!(account_id = %id, "Deactivating account");
        let mut conn = self.connection()?;

        let changed = diesel::update(schema::accounts::table.find(id))
            .set(schema::accounts::active.eq(false))
            .execute(&mut conn)?;

        if changed > 0 {
            info!(account_id = %id, "Account deactivated");
        }
        Ok(changed > 0)
    }

    /// Hard-deletes an account row. Returns true if a row was found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete(&self, id: &str) -> Result<bool, DbError> {
        debug!(account_id = %id, "Deleting account");
        let mut conn = self.connection()?;

        let changed = diesel::delete(schema::accounts::table.find(id)).execute(&mut conn)?;

        if changed > 0 {
            info!(account_id = %id, "Account deleted");
        }
        Ok(changed > 0)
    }

    /// Ranking view: active accounts with a recorded fewest-attempts
    /// value, ascending, capped at 10 entries.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn ranking(&self) -> Result<Vec<Account>, DbError> {
        debug!("Loading ranking");
        let mut conn = self.connection()?;

        let accounts = schema::accounts::table
            .filter(schema::accounts::active.eq(true))
            .filter(schema::accounts::fewest_attempts.ne(ATTEMPTS_SENTINEL))
            .order(schema::accounts::fewest_attempts.asc())
            .limit(RANKING_LIMIT)
            .load::<Account>(&mut conn)?;

        info!(count = accounts.len(), "Ranking loaded");
        Ok(accounts)
    }

    /// Removes every account row. Full local reset.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn clear(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let removed = diesel::delete(schema::accounts::table).execute(&mut conn)?;
        info!(removed, "Local accounts cleared");
        Ok(())
    }
}
