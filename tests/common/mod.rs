//! Shared test fixtures: temp databases and remote-store doubles.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use diesel::Connection;
use diesel::SqliteConnection;
use diesel_migrations::MigrationHarness;
use tempfile::NamedTempFile;

use matchbook::{AccountDoc, CardDoc, MIGRATIONS, RemoteError, RemoteStore};

/// Creates a temporary database file with the schema applied. The file
/// handle must stay in scope to keep the database alive.
pub fn setup_db() -> (NamedTempFile, String) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let mut conn = SqliteConnection::establish(&db_path).expect("Failed to connect");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Migrations failed");

    (db_file, db_path)
}

/// In-memory remote store double.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    pub accounts: Mutex<HashMap<String, AccountDoc>>,
    pub cards: Mutex<HashMap<String, CardDoc>>,
}

impl MemoryRemote {
    pub fn with_account(doc: AccountDoc) -> Self {
        let remote = Self::default();
        remote.accounts.lock().unwrap().insert(doc.id.clone(), doc);
        remote
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }

    pub fn card_count(&self) -> usize {
        self.cards.lock().unwrap().len()
    }

    pub fn account_by_email(&self, email: &str) -> Option<AccountDoc> {
        self.accounts
            .lock()
            .unwrap()
            .values()
            .find(|d| d.email == email)
            .cloned()
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn put_account(&self, doc: &AccountDoc) -> Result<(), RemoteError> {
        self.accounts
            .lock()
            .unwrap()
            .insert(doc.id.clone(), doc.clone());
        Ok(())
    }

    async fn delete_account(&self, id: &str) -> Result<(), RemoteError> {
        self.accounts.lock().unwrap().remove(id);
        Ok(())
    }

    async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountDoc>, RemoteError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|d| d.email == email && d.active)
            .cloned())
    }

    async fn load_accounts(&self) -> Result<Vec<AccountDoc>, RemoteError> {
        Ok(self.accounts.lock().unwrap().values().cloned().collect())
    }

    async fn load_cards(&self) -> Result<Vec<CardDoc>, RemoteError> {
        Ok(self.cards.lock().unwrap().values().cloned().collect())
    }

    async fn put_card(&self, doc: &CardDoc) -> Result<(), RemoteError> {
        self.cards
            .lock()
            .unwrap()
            .insert(doc.id.clone(), doc.clone());
        Ok(())
    }

    async fn delete_card(&self, id: &str) -> Result<(), RemoteError> {
        self.cards.lock().unwrap().remove(id);
        Ok(())
    }
}

/// Remote store double where every call fails, exercising the
/// swallow-and-log mirroring policy.
#[derive(Debug, Default)]
pub struct FailingRemote;

#[async_trait]
impl RemoteStore for FailingRemote {
    async fn put_account(&self, _doc: &AccountDoc) -> Result<(), RemoteError> {
        Err(RemoteError::new("remote down"))
    }

    async fn delete_account(&self, _id: &str) -> Result<(), RemoteError> {
        Err(RemoteError::new("remote down"))
    }

    async fn find_account_by_email(
        &self,
        _email: &str,
    ) -> Result<Option<AccountDoc>, RemoteError> {
        Err(RemoteError::new("remote down"))
    }

    async fn load_accounts(&self) -> Result<Vec<AccountDoc>, RemoteError> {
        Err(RemoteError::new("remote down"))
    }

    async fn load_cards(&self) -> Result<Vec<CardDoc>, RemoteError> {
        Err(RemoteError::new("remote down"))
    }

    async fn put_card(&self, _doc: &CardDoc) -> Result<(), RemoteError> {
        Err(RemoteError::new("remote down"))
    }

    async fn delete_card(&self, _id: &str) -> Result<(), RemoteError> {
        Err(RemoteError::new("remote down"))
    }
}

/// Builds a remote account document for tests.
pub fn account_doc(id: &str, name: &str, email: &str, password: &str) -> AccountDoc {
    AccountDoc {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        is_admin: false,
        created_at: 1_700_000_000_000,
        last_login: 0,
        active: true,
        best_score: 0,
        fewest_attempts: i32::MAX,
    }
}
