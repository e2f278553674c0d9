//! Remote document-store mirror.
//!
//! The remote side is strictly a best-effort secondary: every caller in
//! the service layer catches [`RemoteError`], logs it, and moves on. The
//! local store never waits on, nor rolls back for, the mirror.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::db::{Account, NewAccount};
use crate::error::located_error;

mod http;

pub use http::HttpRemote;

located_error!(
    /// Remote mirror error: transport failure, bad status, or timeout. All
    /// three are handled identically (logged and swallowed) by callers.
    RemoteError,
    "Remote error"
);

impl From<reqwest::Error> for RemoteError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(format!("Request timed out: {}", err))
        } else {
            Self::new(format!("Transport error: {}", err))
        }
    }
}

/// Account document as stored in the remote `accounts` collection.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccountDoc {
    /// Document key, same opaque id as the local row.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Password verifier, carried so a remote hit can be checked on login.
    pub password: String,
    /// Admin flag.
    pub is_admin: bool,
    /// Creation timestamp, epoch milliseconds.
    pub created_at: i64,
    /// Last-login timestamp, epoch milliseconds (0 = never).
    pub last_login: i64,
    /// Soft-delete marker.
    pub active: bool,
    /// Best score, higher is better.
    pub best_score: i32,
    /// Fewest attempts, lower is better, `i32::MAX` = unset.
    pub fewest_attempts: i32,
}

impl std::fmt::Debug for AccountDoc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountDoc")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl From<&Account> for AccountDoc {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id().clone(),
            name: account.name().clone(),
            email: account.email().clone(),
            password: account.password_verifier().to_string(),
            is_admin: *account.is_admin(),
            created_at: *account.created_at(),
            last_login: *account.last_login(),
            active: *account.active(),
            best_score: *account.best_score(),
            fewest_attempts: *account.fewest_attempts(),
        }
    }
}

impl AccountDoc {
    /// Converts the document into an insertable local row, keeping the
    /// remote id so both sides stay keyed identically.
    pub fn into_new_account(self) -> NewAccount {
        NewAccount::new(
            self.id,
            self.name,
            self.email,
            self.password,
            self.is_admin,
            self.created_at,
            self.last_login,
            self.active,
            self.best_score,
            self.fewest_attempts,
        )
    }
}

/// Card document as stored in the remote `cards` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardDoc {
    /// Document key.
    pub id: String,
    /// Card name.
    pub name: String,
    /// Image reference.
    pub image_url: String,
}

/// The remote mirroring seam.
///
/// Implementations must bound every call by a fixed timeout; exceeding it
/// is reported as an ordinary [`RemoteError`].
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Writes (or overwrites) an account document.
    async fn put_account(&self, doc: &AccountDoc) -> Result<(), RemoteError>;

    /// Deletes an account document.
    async fn delete_account(&self, id: &str) -> Result<(), RemoteError>;

    /// Looks up the active account document with the given email.
    async fn find_account_by_email(&self, email: &str)
    -> Result<Option<AccountDoc>, RemoteError>;

    /// Loads every account document.
    async fn load_accounts(&self) -> Result<Vec<AccountDoc>, RemoteError>;

    /// Loads every card document.
    async fn load_cards(&self) -> Result<Vec<CardDoc>, RemoteError>;

    /// Writes (or overwrites) a card document.
    async fn put_card(&self, doc: &CardDoc) -> Result<(), RemoteError>;

    /// Deletes a card document.
    async fn delete_card(&self, id: &str) -> Result<(), RemoteError>;
}
