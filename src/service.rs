//! Account business logic: local-first authentication with best-effort
//! remote mirroring.
//!
//! The local store is authoritative. Every remote call made on behalf of
//! a local write is wrapped so that a timeout or transport failure is
//! logged and swallowed; the two stores are allowed to diverge.

use std::sync::Arc;

use chrono::Utc;
use derive_more::{Display, Error};
use tracing::{debug, info, instrument, warn};

use crate::db::{Account, AccountStore, DbError, NewAccount};
use crate::remote::{AccountDoc, RemoteStore};

/// Minimum accepted password length for registration.
const MIN_PASSWORD_LEN: usize = 6;

/// Account operation error.
#[derive(Debug, Clone, Display, Error)]
pub enum AuthError {
    /// Malformed registration input.
    #[display("Invalid input: {message}")]
    Validation {
        /// Human-readable description of the rejected field.
        #[error(not(source))]
        message: String,
    },
    /// An active account already uses the email.
    #[display("This email is already registered")]
    DuplicateEmail,
    /// No active account matches the email and password.
    #[display("Incorrect email or password")]
    InvalidCredentials,
    /// Operation referenced an unknown account id.
    #[display("No account with id '{id}'")]
    NotFound {
        /// The id that missed.
        #[error(not(source))]
        id: String,
    },
    /// Local store failure.
    #[display("Storage failure: {_0}")]
    Store(DbError),
}

impl AuthError {
    fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<DbError> for AuthError {
    fn from(err: DbError) -> Self {
        Self::Store(err)
    }
}

/// Account service: login, registration, record keeping, and the ranking
/// view, mirroring each local write to the remote store best-effort.
#[derive(Clone)]
pub struct AccountService {
    accounts: AccountStore,
    remote: Arc<dyn RemoteStore>,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("accounts", &self.accounts)
            .finish_non_exhaustive()
    }
}

impl AccountService {
    /// Creates a service over the given local store and remote mirror.
    #[instrument(skip_all)]
    pub fn new(accounts: AccountStore, remote: Arc<dyn RemoteStore>) -> Self {
        info!("Creating AccountService");
        Self { accounts, remote }
    }

    /// Authenticates an account.
    ///
    /// Local first: an active local account whose password verifies wins
    /// outright (its last-login is stamped and the row is mirrored). On a
    /// local miss the remote store is consulted; a remote document whose
    /// password matches is materialized into the local store and accepted.
    /// Anything else is [`AuthError::InvalidCredentials`] — a wrong
    /// password never creates or overwrites anything.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] when both lookups miss,
    /// [`AuthError::Store`] on local store failure.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        debug!("Attempting login");

        if let Some(account) = self.accounts.find_active_by_email(email)? {
            if account.verify_password(password) {
                self.accounts
                    .touch_last_login(account.id(), Utc::now().timestamp_millis())?;
                let account = self
                    .accounts
                    .find_by_id(account.id())?
                    .ok_or_else(|| DbError::new("Account vanished during login"))?;

                info!(account_id = %account.id(), "Local login succeeded");
                self.mirror_account(&account).await;
                return Ok(account);
            }
            debug!("Local account found but password did not verify");
        }

        // Local miss: the remote record is authoritative if its password
        // matches. Remote failure here degrades to a plain credential miss.
        debug!("Local miss, consulting remote store");
        match self.remote.find_account_by_email(email).await {
            Ok(Some(doc)) => {
                if doc.password == password {
                    let account = self.accounts.upsert(&doc.into_new_account())?;
                    info!(account_id = %account.id(), "Remote account materialized locally");
                    return Ok(account);
                }
                debug!("Remote account found but password did not match");
            }
            Ok(None) => debug!("No remote account for email"),
            Err(err) => warn!(%err, "Remote lookup failed, continuing with local data only"),
        }

        Err(AuthError::InvalidCredentials)
    }

    /// Registers a new account.
    ///
    /// Validation: non-blank name, email containing '@', password of at
    /// least six characters matching its confirmation. The email must not
    /// be used by any *active* account; a deactivated account's email may
    /// be reused. The row is created locally first, then mirrored.
    ///
    /// # Errors
    ///
    /// [`AuthError::Validation`], [`AuthError::DuplicateEmail`], or
    /// [`AuthError::Store`].
    #[instrument(skip(self, password, confirm_password), fields(email = %email))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Account, AuthError> {
        debug!("Registering account");

        if name.trim().is_empty() {
            return Err(AuthError::validation("Name is required"));
        }
        if email.trim().is_empty() || !email.contains('@') {
            return Err(AuthError::validation("A valid email is required"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::validation(
                "Password must be at least 6 characters",
            ));
        }
        if password != confirm_password {
            return Err(AuthError::validation("Passwords do not match"));
        }

        if self.accounts.email_taken(email)? {
            debug!("Email already in use by an active account");
            return Err(AuthError::DuplicateEmail);
        }

        let new_account = NewAccount::fresh(
            name.to_string(),
            email.to_string(),
            password.to_string(),
            false,
        );
        let account = self.accounts.upsert(&new_account)?;
        info!(account_id = %account.id(), "Account registered locally");

        self.mirror_account(&account).await;
        Ok(account)
    }

    /// Applies a best-score improvement. Only a strictly greater score
    /// changes the stored value; the improved row is mirrored. Returns
    /// true if the record improved.
    ///
    /// # Errors
    ///
    /// [`AuthError::NotFound`] for an unknown id, [`AuthError::Store`] on
    /// store failure.
    #[instrument(skip(self))]
    pub async fn update_best_score(&self, id: &str, score: i32) -> Result<bool, AuthError> {
        self.require_account(id)?;

        let improved = self.accounts.raise_best_score(id, score)?;
        if improved {
            if let Some(account) = self.accounts.find_by_id(id)? {
                self.mirror_account(&account).await;
            }
        } else {
            debug!(account_id = %id, score, "Best score unchanged");
        }
        Ok(improved)
    }

    /// Applies a fewest-attempts improvement. The first recorded game
    /// always applies (the sentinel yields to any real value); after that
    /// only strictly lower counts do. Returns true if the record improved.
    ///
    /// # Errors
    ///
    /// [`AuthError::NotFound`] for an unknown id, [`AuthError::Store`] on
    /// store failure.
    #[instrument(skip(self))]
    pub async fn update_fewest_attempts(&self, id: &str, attempts: i32) -> Result<bool, AuthError> {
        self.require_account(id)?;

        let improved = self.accounts.lower_fewest_attempts(id, attempts)?;
        if improved {
            if let Some(account) = self.accounts.find_by_id(id)? {
                self.mirror_account(&account).await;
            }
        } else {
            debug!(account_id = %id, attempts, "Fewest attempts unchanged");
        }
        Ok(improved)
    }

    /// Soft-deletes an account and mirrors the deactivated row.
    ///
    /// # Errors
    ///
    /// [`AuthError::NotFound`] for an unknown id, [`AuthError::Store`] on
    /// store failure.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, id: &str) -> Result<(), AuthError> {
        if !self.accounts.deactivate(id)? {
            return Err(AuthError::NotFound { id: id.to_string() });
        }

        if let Some(account) = self.accounts.find_by_id(id)? {
            self.mirror_account(&account).await;
        }
        Ok(())
    }

    /// Hard-deletes an account locally and best-effort remotely. A failed
    /// remote delete is not rolled back: the stores may diverge.
    ///
    /// # Errors
    ///
    /// [`AuthError::NotFound`] for an unknown id, [`AuthError::Store`] on
    /// store failure.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), AuthError> {
        if !self.accounts.delete(id)? {
            return Err(AuthError::NotFound { id: id.to_string() });
        }

        if let Err(err) = self.remote.delete_account(id).await {
            warn!(account_id = %id, %err, "Remote delete failed; stores now diverge");
        }
        Ok(())
    }

    /// Ranking view: active accounts with a recorded game, ascending by
    /// fewest attempts, at most ten entries.
    ///
    /// # Errors
    ///
    /// [`AuthError::Store`] on store failure.
    #[instrument(skip(self))]
    pub async fn ranking(&self) -> Result<Vec<Account>, AuthError> {
        Ok(self.accounts.ranking()?)
    }

    /// Lists all active accounts ordered by display name.
    ///
    /// # Errors
    ///
    /// [`AuthError::Store`] on store failure.
    #[instrument(skip(self))]
    pub async fn list_accounts(&self) -> Result<Vec<Account>, AuthError> {
        Ok(self.accounts.list_active()?)
    }

    /// Gets an account by id (active or not).
    ///
    /// # Errors
    ///
    /// [`AuthError::Store`] on store failure.
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Account>, AuthError> {
        Ok(self.accounts.find_by_id(id)?)
    }

    /// Returns true if an active account uses the email.
    ///
    /// # Errors
    ///
    /// [`AuthError::Store`] on store failure.
    #[instrument(skip(self))]
    pub async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        Ok(self.accounts.email_taken(email)?)
    }

    /// Pulls remote accounts whose email is locally unknown into the
    /// local store. Remote failure is swallowed (zero imported); this is
    /// a catch-up convenience, not a reconciliation protocol.
    ///
    /// # Errors
    ///
    /// [`AuthError::Store`] on local store failure.
    #[instrument(skip(self))]
    pub async fn sync_from_remote(&self) -> Result<usize, AuthError> {
        let docs = match self.remote.load_accounts().await {
            Ok(docs) => docs,
            Err(err) => {
                warn!(%err, "Remote account sync unavailable");
                return Ok(0);
            }
        };

        let mut imported = 0;
        for doc in docs {
            if self.accounts.find_active_by_email(&doc.email)?.is_none() {
                let account = self.accounts.upsert(&doc.into_new_account())?;
                debug!(account_id = %account.id(), "Account imported from remote");
                imported += 1;
            }
        }

        info!(imported, "Remote account sync finished");
        Ok(imported)
    }

    fn require_account(&self, id: &str) -> Result<Account, AuthError> {
        self.accounts
            .find_by_id(id)?
            .ok_or_else(|| AuthError::NotFound { id: id.to_string() })
    }

    /// Best-effort mirror of one account row. Failure is logged and
    /// dropped; the local result this call follows is already final.
    async fn mirror_account(&self, account: &Account) {
        let doc = AccountDoc::from(account);
        if let Err(err) = self.remote.put_account(&doc).await {
            warn!(
                account_id = %account.id(),
                %err,
                "Remote mirror failed; local store remains authoritative"
            );
        }
    }
}
