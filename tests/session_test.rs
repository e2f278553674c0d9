//! Tests for the published session state and completion recording.

mod common;

use std::sync::Arc;

use common::{MemoryRemote, setup_db};
use matchbook::{ATTEMPTS_SENTINEL, AppConfig, AppContext, GameComplete};

fn app(db_path: &str) -> AppContext {
    let config = AppConfig::new(db_path.to_string(), "http://unused".to_string(), 5000);
    AppContext::wire(config, Arc::new(MemoryRemote::default())).expect("Wire failed")
}

#[tokio::test]
async fn test_initial_state_is_logged_out() {
    let (_db, path) = setup_db();
    let app = app(&path);

    let state = app.session().current();
    assert!(state.account.is_none());
    assert!(!state.logged_in);
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert!(!state.registered);
}

#[tokio::test]
async fn test_register_publishes_account_and_flag() {
    let (_db, path) = setup_db();
    let app = app(&path);
    let session = app.session();

    session
        .register("Ana", "ana@example.com", "secret1", "secret1")
        .await;

    let state = session.current();
    assert!(state.logged_in);
    assert!(state.registered);
    assert!(!state.loading);
    assert!(state.error.is_none());
    let account = state.account.expect("Account expected in state");
    assert_eq!(account.name().as_str(), "Ana");

    session.clear_registered();
    assert!(!session.current().registered);
}

#[tokio::test]
async fn test_failed_login_publishes_error() {
    let (_db, path) = setup_db();
    let app = app(&path);
    let session = app.session();

    session.login("ghost@example.com", "secret1").await;

    let state = session.current();
    assert!(!state.logged_in);
    assert!(!state.loading);
    assert_eq!(
        state.error.as_deref(),
        Some("Incorrect email or password")
    );

    session.clear_error();
    assert!(session.current().error.is_none());
}

#[tokio::test]
async fn test_blank_credentials_rejected_before_store() {
    let (_db, path) = setup_db();
    let app = app(&path);
    let session = app.session();

    session.login("", "").await;

    let state = session.current();
    assert_eq!(
        state.error.as_deref(),
        Some("Email and password are required")
    );
}

#[tokio::test]
async fn test_subscribers_observe_published_state() {
    let (_db, path) = setup_db();
    let app = app(&path);
    let session = app.session();
    let mut rx = session.subscribe();

    session
        .register("Ana", "ana@example.com", "secret1", "secret1")
        .await;

    rx.changed().await.expect("State change expected");
    assert!(rx.borrow().logged_in);
}

#[tokio::test]
async fn test_logout_clears_everything() {
    let (_db, path) = setup_db();
    let app = app(&path);
    let session = app.session();

    session
        .register("Ana", "ana@example.com", "secret1", "secret1")
        .await;
    assert!(session.current().logged_in);

    session.logout();

    let state = session.current();
    assert!(state.account.is_none());
    assert!(!state.logged_in);
    assert!(!state.registered);
}

#[tokio::test]
async fn test_completion_records_score_and_improves_account() {
    let (_db, path) = setup_db();
    let app = app(&path);
    let session = app.session();

    session
        .register("Ana", "ana@example.com", "secret1", "secret1")
        .await;

    session
        .record_completion(GameComplete {
            score: 30,
            attempts: 4,
        })
        .await;

    let account = session.current().account.expect("Account expected");
    assert_eq!(*account.best_score(), 30);
    assert_eq!(*account.fewest_attempts(), 4);

    let scores = app.catalog().high_scores().await.expect("Scores failed");
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].name().as_str(), "Ana");
    assert_eq!(*scores[0].points(), 30);

    // A worse game appends to the log but improves no record.
    session
        .record_completion(GameComplete {
            score: 20,
            attempts: 9,
        })
        .await;

    let account = session.current().account.expect("Account expected");
    assert_eq!(*account.best_score(), 30);
    assert_eq!(*account.fewest_attempts(), 4);
    assert_eq!(
        app.catalog().high_scores().await.expect("Scores failed").len(),
        2
    );

    // Fewer attempts improves that record alone.
    session
        .record_completion(GameComplete {
            score: 10,
            attempts: 3,
        })
        .await;
    let account = session.current().account.expect("Account expected");
    assert_eq!(*account.best_score(), 30);
    assert_eq!(*account.fewest_attempts(), 3);
}

#[tokio::test]
async fn test_completion_without_session_is_dropped() {
    let (_db, path) = setup_db();
    let app = app(&path);

    app.session()
        .record_completion(GameComplete {
            score: 50,
            attempts: 2,
        })
        .await;

    let scores = app.catalog().high_scores().await.expect("Scores failed");
    assert!(scores.is_empty());
}

#[tokio::test]
async fn test_session_accessors() {
    let (_db, path) = setup_db();
    let app = app(&path);
    let session = app.session();

    assert!(!session.is_admin());
    assert!(session.account_id().is_none());
    assert_eq!(session.display_name(), "Player");

    session
        .register("Ana", "ana@example.com", "secret1", "secret1")
        .await;

    assert!(!session.is_admin());
    assert!(session.account_id().is_some());
    assert_eq!(session.display_name(), "Ana");
}

#[tokio::test]
async fn test_fresh_registration_has_unset_records() {
    let (_db, path) = setup_db();
    let app = app(&path);
    let session = app.session();

    session
        .register("Ana", "ana@example.com", "secret1", "secret1")
        .await;

    let account = session.current().account.expect("Account expected");
    assert_eq!(*account.best_score(), 0);
    assert_eq!(*account.fewest_attempts(), ATTEMPTS_SENTINEL);

    let ranking = app.accounts().ranking().await.expect("Ranking failed");
    assert!(ranking.is_empty(), "Unplayed accounts never rank");
}
