//! Published session state and the manager that drives it.
//!
//! The presentation layer never gets return values from these operations;
//! it subscribes to the state cell and reacts to what the manager
//! publishes after each one.

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::catalog::CatalogService;
use crate::db::Account;
use crate::game::GameComplete;
use crate::service::AccountService;

/// Snapshot of the authenticated-user session, published after every
/// operation.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// The logged-in account, if any.
    pub account: Option<Account>,
    /// True while an account is logged in.
    pub logged_in: bool,
    /// True while an operation is in flight.
    pub loading: bool,
    /// Message from the last failed operation, cleared on the next one.
    pub error: Option<String>,
    /// Set once after a successful registration until cleared.
    pub registered: bool,
}

/// Owns the session state cell and runs account operations against it.
///
/// Constructed with its service dependencies injected; there is no
/// ambient global instance.
#[derive(Debug, Clone)]
pub struct SessionManager {
    service: AccountService,
    catalog: CatalogService,
    state: watch::Sender<SessionState>,
}

impl SessionManager {
    /// Creates a manager publishing the default (logged-out) state.
    #[instrument(skip_all)]
    pub fn new(service: AccountService, catalog: CatalogService) -> Self {
        info!("Creating SessionManager");
        let (state, _) = watch::channel(SessionState::default());
        Self {
            service,
            catalog,
            state,
        }
    }

    /// Subscribes to session state updates.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// The current session state snapshot.
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// The account service this manager drives.
    pub fn service(&self) -> &AccountService {
        &self.service
    }

    /// Logs in. The outcome surfaces only through the published state:
    /// the account and `logged_in` on success, an error message otherwise.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) {
        self.publish(|s| {
            s.loading = true;
            s.error = None;
        });

        if email.trim().is_empty() || password.is_empty() {
            self.publish(|s| {
                s.loading = false;
                s.error = Some("Email and password are required".to_string());
            });
            return;
        }

        match self.service.login(email, password).await {
            Ok(account) => {
                info!(account_id = %account.id(), "Session opened");
                self.publish(|s| {
                    s.loading = false;
                    s.account = Some(account.clone());
                    s.logged_in = true;
                    s.error = None;
                });
            }
            Err(err) => {
                debug!(%err, "Login failed");
                self.publish(|s| {
                    s.loading = false;
                    s.error = Some(err.to_string());
                });
            }
        }
    }

    /// Registers an account and opens a session for it on success,
    /// setting the `registered` flag.
    #[instrument(skip(self, password, confirm_password), fields(email = %email))]
    pub async fn register(&self, name: &str, email: &str, password: &str, confirm_password: &str) {
        self.publish(|s| {
            s.loading = true;
            s.error = None;
            s.registered = false;
        });

        match self
            .service
            .register(name, email, password, confirm_password)
            .await
        {
            Ok(account) => {
                info!(account_id = %account.id(), "Registered and session opened");
                self.publish(|s| {
                    s.loading = false;
                    s.account = Some(account.clone());
                    s.logged_in = true;
                    s.error = None;
                    s.registered = true;
                });
            }
            Err(err) => {
                debug!(%err, "Registration failed");
                self.publish(|s| {
                    s.loading = false;
                    s.error = Some(err.to_string());
                });
            }
        }
    }

    /// Clears the session unconditionally. No persistence side effect.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        info!("Session closed");
        self.state.send_replace(SessionState::default());
    }

    /// Clears a published error message.
    pub fn clear_error(&self) {
        self.publish(|s| s.error = None);
    }

    /// Clears the registration-success flag.
    pub fn clear_registered(&self) {
        self.publish(|s| s.registered = false);
    }

    /// Consumes a game-completion event: appends the score to the history
    /// log under the player's name and applies both monotonic record
    /// improvements, then republishes the refreshed account.
    ///
    /// A completion with no session logged in is dropped with a warning;
    /// persistence failures are logged, not surfaced — the game result on
    /// screen is already final.
    #[instrument(skip(self))]
    pub async fn record_completion(&self, result: GameComplete) {
        let Some(account) = self.current().account else {
            warn!("Game completed with no session; result dropped");
            return;
        };
        let id = account.id().clone();

        if let Err(err) = self.catalog.record_score(account.name(), result.score).await {
            warn!(%err, "Failed to append score history");
        }
        if let Err(err) = self.service.update_best_score(&id, result.score).await {
            warn!(%err, "Failed to update best score");
        }
        if let Err(err) = self
            .service
            .update_fewest_attempts(&id, result.attempts)
            .await
        {
            warn!(%err, "Failed to update fewest attempts");
        }

        match self.service.find_by_id(&id).await {
            Ok(Some(refreshed)) => self.publish(|s| s.account = Some(refreshed.clone())),
            Ok(None) => warn!(account_id = %id, "Account gone after completion"),
            Err(err) => warn!(%err, "Failed to refresh session account"),
        }
    }

    /// True if the logged-in account has the admin flag.
    pub fn is_admin(&self) -> bool {
        self.current()
            .account
            .map(|a| *a.is_admin())
            .unwrap_or(false)
    }

    /// The logged-in account id, if any.
    pub fn account_id(&self) -> Option<String> {
        self.current().account.map(|a| a.id().clone())
    }

    /// The logged-in display name, or a placeholder.
    pub fn display_name(&self) -> String {
        self.current()
            .account
            .map(|a| a.name().clone())
            .unwrap_or_else(|| "Player".to_string())
    }

    fn publish(&self, update: impl FnOnce(&mut SessionState)) {
        self.state.send_modify(update);
    }
}
