//! Application composition root.
//!
//! Everything is wired here by explicit injection: stores, the remote
//! client, services, and the session manager. Nothing in the crate
//! reaches for a process-wide singleton.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::catalog::CatalogService;
use crate::config::{AppConfig, ConfigError};
use crate::db::{self, AccountStore, CatalogStore};
use crate::remote::{HttpRemote, RemoteStore};
use crate::service::AccountService;
use crate::session::SessionManager;

/// Fully wired application context.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: AppConfig,
    session: SessionManager,
    accounts: AccountService,
    catalog: CatalogService,
}

impl AppContext {
    /// Bootstraps the application: loads `.env`, applies migrations, and
    /// wires the stores through an HTTP remote mirror.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if migrations fail or the remote client
    /// cannot be built.
    #[instrument(skip(config), fields(db_path = %config.db_path()))]
    pub fn bootstrap(config: AppConfig) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        info!("Bootstrapping application context");

        db::apply_migrations(config.db_path())
            .map_err(|e| ConfigError::new(format!("Migration failure: {}", e)))?;

        let remote: Arc<dyn RemoteStore> = Arc::new(
            HttpRemote::new(config.remote_url().clone(), *config.remote_timeout_ms())
                .map_err(|e| ConfigError::new(format!("Remote client failure: {}", e)))?,
        );

        Self::wire(config, remote)
    }

    /// Wires a context over an externally supplied remote store. Tests
    /// and alternative backends enter here.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a store cannot be created.
    #[instrument(skip_all)]
    pub fn wire(config: AppConfig, remote: Arc<dyn RemoteStore>) -> Result<Self, ConfigError> {
        let account_store = AccountStore::new(config.db_path().clone())
            .map_err(|e| ConfigError::new(format!("Account store failure: {}", e)))?;
        let catalog_store = CatalogStore::new(config.db_path().clone())
            .map_err(|e| ConfigError::new(format!("Catalog store failure: {}", e)))?;

        let accounts = AccountService::new(account_store, Arc::clone(&remote));
        let catalog = CatalogService::new(catalog_store, remote);
        let session = SessionManager::new(accounts.clone(), catalog.clone());

        Ok(Self {
            config,
            session,
            accounts,
            catalog,
        })
    }

    /// The configuration this context was built from.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The session manager driving the published session state.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// The account service.
    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    /// The catalog/score service.
    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }
}
