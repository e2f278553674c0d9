//! Matchbook - memory-matching card game core
//!
//! A local-first game backend: accounts and scores live in a SQLite
//! store that is always authoritative, with every write mirrored to a
//! remote document store on a best-effort basis (failures are logged and
//! swallowed, never surfaced). The match engine runs the reveal →
//! compare → resolve cycle for one board at a time.
//!
//! # Architecture
//!
//! - **AccountService**: login / registration / record keeping over the
//!   local store, with best-effort remote mirroring
//! - **SessionManager**: publishes session state through a watch channel;
//!   the presentation layer subscribes instead of reading return values
//! - **MatchEngine**: four-phase turn sequencer (idle → first pick →
//!   comparison pending → resolve) with a fixed reveal delay
//! - **CatalogService**: admin card catalog and the append-only score log
//!
//! # Example
//!
//! ```no_run
//! use matchbook::{AppConfig, AppContext, MatchEngine, SelectOutcome};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = AppContext::bootstrap(AppConfig::default())?;
//!
//! app.session().register("Ana", "ana@example.com", "hunter22", "hunter22").await;
//!
//! let mut engine = MatchEngine::new();
//! if engine.select_card(0) == SelectOutcome::FirstRevealed {
//!     engine.select_card(1);
//!     if let Some(resolution) = engine.resolve_after_delay().await {
//!         if let Some(done) = resolution.completed {
//!             app.session().record_completion(done).await;
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod app;
mod catalog;
mod config;
mod db;
mod error;
mod game;
mod remote;
mod service;
mod session;
mod telemetry;

// Crate-level exports - composition root
pub use app::AppContext;

// Crate-level exports - configuration
pub use config::{AppConfig, ConfigError};

// Crate-level exports - local store
pub use db::{
    ATTEMPTS_SENTINEL, Account, AccountStore, CatalogCard, CatalogStore, DbError, MIGRATIONS,
    NewAccount, NewCatalogCard, NewScoreRecord, ScoreRecord, apply_migrations,
};

// Crate-level exports - remote mirror
pub use remote::{AccountDoc, CardDoc, HttpRemote, RemoteError, RemoteStore};

// Crate-level exports - services
pub use catalog::CatalogService;
pub use service::{AccountService, AuthError};

// Crate-level exports - session state
pub use session::{SessionManager, SessionState};

// Crate-level exports - game engine
pub use game::{
    Board, BoardError, GameComplete, MATCH_POINTS, MatchEngine, Phase, REVEAL_DELAY, Resolution,
    SYMBOLS, SelectOutcome, Slot,
};

// Crate-level exports - telemetry
pub use telemetry::init as init_telemetry;
