//! Local store models and domain types.

use chrono::Utc;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use rand::Rng;

use crate::db::schema;

/// Reserved `fewest_attempts` value meaning "no completed game yet".
///
/// Accounts carrying the sentinel are excluded from the ranking.
pub const ATTEMPTS_SENTINEL: i32 = i32::MAX;

/// Account database model.
///
/// The password column is deliberately not exposed through a getter;
/// use [`Account::verify_password`] instead.
#[derive(Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::accounts)]
pub struct Account {
    id: String,
    name: String,
    email: String,
    #[getter(skip)]
    password: String,
    is_admin: bool,
    created_at: i64,
    last_login: i64,
    active: bool,
    best_score: i32,
    fewest_attempts: i32,
}

impl Account {
    /// Compares a candidate password against the stored verifier.
    ///
    /// The comparison does not short-circuit on the first differing byte.
    pub fn verify_password(&self, candidate: &str) -> bool {
        let stored = self.password.as_bytes();
        let given = candidate.as_bytes();
        if stored.len() != given.len() {
            return false;
        }
        stored
            .iter()
            .zip(given)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    /// Returns true if the account has recorded at least one completed game.
    pub fn has_recorded_attempts(&self) -> bool {
        self.fewest_attempts != ATTEMPTS_SENTINEL
    }

    pub(crate) fn password_verifier(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("is_admin", &self.is_admin)
            .field("created_at", &self.created_at)
            .field("last_login", &self.last_login)
            .field("active", &self.active)
            .field("best_score", &self.best_score)
            .field("fewest_attempts", &self.fewest_attempts)
            .finish()
    }
}

/// Insertable account model.
#[derive(Clone, Insertable, new)]
#[diesel(table_name = schema::accounts)]
pub struct NewAccount {
    id: String,
    name: String,
    email: String,
    password: String,
    is_admin: bool,
    created_at: i64,
    last_login: i64,
    active: bool,
    best_score: i32,
    fewest_attempts: i32,
}

impl NewAccount {
    /// Creates a freshly registered account: random id, current creation
    /// timestamp, never logged in, active, no recorded games.
    pub fn fresh(name: String, email: String, password: String, is_admin: bool) -> Self {
        Self::new(
            generate_account_id(),
            name,
            email,
            password,
            is_admin,
            Utc::now().timestamp_millis(),
            0,
            true,
            0,
            ATTEMPTS_SENTINEL,
        )
    }

    /// The generated or carried-over account id.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Generates an opaque 32-hex-char account identifier.
fn generate_account_id() -> String {
    let mut rng = rand::thread_rng();
    (0..32)
        .map(|_| std::char::from_digit(rng.gen_range(0..16u32), 16).unwrap_or('0'))
        .collect()
}

/// Admin card catalog database model.
///
/// The catalog is decoupled from gameplay: the board generates its own
/// ephemeral pairs and never reads these rows.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::cards)]
pub struct CatalogCard {
    id: i32,
    name: String,
    image_url: String,
    revealed: bool,
    matched: bool,
}

/// Insertable card catalog model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::cards)]
pub struct NewCatalogCard {
    name: String,
    image_url: String,
}

/// Score history database model (append-only log).
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::scores)]
pub struct ScoreRecord {
    id: i32,
    name: String,
    points: i32,
}

/// Insertable score history model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::scores)]
pub struct NewScoreRecord {
    name: String,
    points: i32,
}
