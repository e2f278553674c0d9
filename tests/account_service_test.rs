//! Tests for the account service: validation, the login fallback chain,
//! and the best-effort mirroring policy.

mod common;

use std::sync::Arc;

use common::{FailingRemote, MemoryRemote, account_doc, setup_db};
use matchbook::{AccountService, AccountStore, AuthError, RemoteStore};

fn service_with(db_path: &str, remote: Arc<dyn RemoteStore>) -> AccountService {
    let store = AccountStore::new(db_path.to_string()).expect("Failed to create store");
    AccountService::new(store, remote)
}

#[tokio::test]
async fn test_register_validation_errors() {
    let (_db, path) = setup_db();
    let service = service_with(&path, Arc::new(MemoryRemote::default()));

    let cases = [
        ("", "a@b.c", "secret1", "secret1"),
        ("   ", "a@b.c", "secret1", "secret1"),
        ("Ana", "", "secret1", "secret1"),
        ("Ana", "no-at-sign", "secret1", "secret1"),
        ("Ana", "a@b.c", "short", "short"),
        ("Ana", "a@b.c", "secret1", "secret2"),
    ];
    for (name, email, password, confirm) in cases {
        let result = service.register(name, email, password, confirm).await;
        assert!(
            matches!(result, Err(AuthError::Validation { .. })),
            "Expected validation error for ({name:?}, {email:?})"
        );
    }
}

#[tokio::test]
async fn test_register_duplicate_email_and_reuse_after_deactivation() {
    let (_db, path) = setup_db();
    let service = service_with(&path, Arc::new(MemoryRemote::default()));

    let first = service
        .register("Ana", "ana@example.com", "secret1", "secret1")
        .await
        .expect("Register failed");

    let dup = service
        .register("Other", "ana@example.com", "secret2", "secret2")
        .await;
    assert!(matches!(dup, Err(AuthError::DuplicateEmail)));

    service.deactivate(first.id()).await.expect("Deactivate failed");

    let reused = service
        .register("Other", "ana@example.com", "secret2", "secret2")
        .await
        .expect("Re-registration after deactivation should succeed");
    assert_ne!(reused.id(), first.id());
}

#[tokio::test]
async fn test_register_mirrors_to_remote() {
    let (_db, path) = setup_db();
    let remote = Arc::new(MemoryRemote::default());
    let service = service_with(&path, remote.clone());

    let account = service
        .register("Ana", "ana@example.com", "secret1", "secret1")
        .await
        .expect("Register failed");

    let doc = remote
        .account_by_email("ana@example.com")
        .expect("Account should be mirrored");
    assert_eq!(&doc.id, account.id());
    assert!(doc.active);
}

#[tokio::test]
async fn test_register_survives_remote_failure() {
    let (_db, path) = setup_db();
    let service = service_with(&path, Arc::new(FailingRemote));

    let account = service
        .register("Ana", "ana@example.com", "secret1", "secret1")
        .await
        .expect("Local registration must not depend on the remote");

    let found = service
        .find_by_id(account.id())
        .await
        .expect("Query failed");
    assert!(found.is_some());
}

#[tokio::test]
async fn test_login_local_hit_stamps_last_login() {
    let (_db, path) = setup_db();
    let service = service_with(&path, Arc::new(MemoryRemote::default()));

    let registered = service
        .register("Ana", "ana@example.com", "secret1", "secret1")
        .await
        .expect("Register failed");
    assert_eq!(*registered.last_login(), 0);

    let logged_in = service
        .login("ana@example.com", "secret1")
        .await
        .expect("Login failed");
    assert_eq!(logged_in.id(), registered.id());
    assert!(*logged_in.last_login() > 0);
}

#[tokio::test]
async fn test_login_wrong_password_fails_without_touching_remote_copy() {
    let (_db, path) = setup_db();
    let remote = Arc::new(MemoryRemote::default());
    let service = service_with(&path, remote.clone());

    service
        .register("Ana", "ana@example.com", "secret1", "secret1")
        .await
        .expect("Register failed");

    let result = service.login("ana@example.com", "wrongpass").await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));

    // Exactly the one mirrored account on both sides, nothing created.
    assert_eq!(remote.account_count(), 1);
    assert_eq!(
        service.list_accounts().await.expect("List failed").len(),
        1
    );
}

#[tokio::test]
async fn test_login_materializes_matching_remote_account() {
    let (_db, path) = setup_db();
    let remote = Arc::new(MemoryRemote::with_account(account_doc(
        "remote-id-1",
        "Remota",
        "remota@example.com",
        "secret1",
    )));
    let service = service_with(&path, remote);

    let account = service
        .login("remota@example.com", "secret1")
        .await
        .expect("Remote fallback login failed");
    assert_eq!(account.id().as_str(), "remote-id-1");
    assert_eq!(account.name().as_str(), "Remota");

    let local = service
        .find_by_id("remote-id-1")
        .await
        .expect("Query failed");
    assert!(local.is_some());
}

#[tokio::test]
async fn test_login_remote_password_mismatch_not_materialized() {
    let (_db, path) = setup_db();
    let remote = Arc::new(MemoryRemote::with_account(account_doc(
        "remote-id-1",
        "Remota",
        "remota@example.com",
        "secret1",
    )));
    let service = service_with(&path, remote);

    let result = service.login("remota@example.com", "another1").await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));

    let local = service
        .find_by_id("remote-id-1")
        .await
        .expect("Query failed");
    assert!(local.is_none(), "Mismatched remote account must not be materialized");
}

#[tokio::test]
async fn test_login_with_remote_down_is_a_plain_miss() {
    let (_db, path) = setup_db();
    let service = service_with(&path, Arc::new(FailingRemote));

    let result = service.login("nobody@example.com", "secret1").await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_record_updates_not_found() {
    let (_db, path) = setup_db();
    let service = service_with(&path, Arc::new(MemoryRemote::default()));

    let result = service.update_best_score("missing", 10).await;
    assert!(matches!(result, Err(AuthError::NotFound { .. })));

    let result = service.update_fewest_attempts("missing", 10).await;
    assert!(matches!(result, Err(AuthError::NotFound { .. })));
}

#[tokio::test]
async fn test_record_updates_mirror_only_improvements() {
    let (_db, path) = setup_db();
    let remote = Arc::new(MemoryRemote::default());
    let service = service_with(&path, remote.clone());

    let account = service
        .register("Ana", "ana@example.com", "secret1", "secret1")
        .await
        .expect("Register failed");

    assert!(service.update_best_score(account.id(), 40).await.expect("Update failed"));
    assert!(!service.update_best_score(account.id(), 40).await.expect("Update failed"));
    assert!(service.update_fewest_attempts(account.id(), 7).await.expect("Update failed"));

    let doc = remote
        .account_by_email("ana@example.com")
        .expect("Mirror missing");
    assert_eq!(doc.best_score, 40);
    assert_eq!(doc.fewest_attempts, 7);
}

#[tokio::test]
async fn test_delete_diverges_when_remote_fails() {
    let (_db, path) = setup_db();
    let service = service_with(&path, Arc::new(FailingRemote));

    let account = service
        .register("Ana", "ana@example.com", "secret1", "secret1")
        .await
        .expect("Register failed");

    service
        .delete(account.id())
        .await
        .expect("Local delete must succeed even when the remote is down");

    let local = service.find_by_id(account.id()).await.expect("Query failed");
    assert!(local.is_none());
}

#[tokio::test]
async fn test_deactivate_mirrors_inactive_row() {
    let (_db, path) = setup_db();
    let remote = Arc::new(MemoryRemote::default());
    let service = service_with(&path, remote.clone());

    let account = service
        .register("Ana", "ana@example.com", "secret1", "secret1")
        .await
        .expect("Register failed");

    service.deactivate(account.id()).await.expect("Deactivate failed");

    let doc = remote
        .account_by_email("ana@example.com")
        .expect("Mirror missing");
    assert!(!doc.active);
}

#[tokio::test]
async fn test_sync_from_remote_imports_unknown_emails_only() {
    let (_db, path) = setup_db();
    let remote = Arc::new(MemoryRemote::default());
    let service = service_with(&path, remote.clone());

    service
        .register("Known", "known@example.com", "secret1", "secret1")
        .await
        .expect("Register failed");

    remote
        .put_account(&account_doc("r1", "New1", "new1@example.com", "pw111111"))
        .await
        .expect("Seed failed");
    remote
        .put_account(&account_doc("r2", "New2", "new2@example.com", "pw222222"))
        .await
        .expect("Seed failed");

    let imported = service.sync_from_remote().await.expect("Sync failed");
    assert_eq!(imported, 2);

    let accounts = service.list_accounts().await.expect("List failed");
    assert_eq!(accounts.len(), 3);

    // Running again imports nothing new.
    let imported = service.sync_from_remote().await.expect("Sync failed");
    assert_eq!(imported, 0);
}

#[tokio::test]
async fn test_sync_from_remote_swallows_remote_failure() {
    let (_db, path) = setup_db();
    let service = service_with(&path, Arc::new(FailingRemote));

    let imported = service.sync_from_remote().await.expect("Sync must not fail");
    assert_eq!(imported, 0);
}
