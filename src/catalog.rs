//! Card catalog administration and the score history log.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::db::{CatalogCard, CatalogStore, DbError, NewCatalogCard, NewScoreRecord, ScoreRecord};
use crate::remote::{CardDoc, RemoteStore};

/// Service for the admin-managed card catalog and the append-only score
/// log. Catalog writes land locally first and mirror best-effort, same
/// policy as accounts.
#[derive(Clone)]
pub struct CatalogService {
    store: CatalogStore,
    remote: Arc<dyn RemoteStore>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl CatalogService {
    /// Creates a service over the given local store and remote mirror.
    #[instrument(skip_all)]
    pub fn new(store: CatalogStore, remote: Arc<dyn RemoteStore>) -> Self {
        info!("Creating CatalogService");
        Self { store, remote }
    }

    /// Adds a card to the catalog and mirrors it best-effort.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the local insert fails.
    #[instrument(skip(self))]
    pub async fn add_card(&self, name: &str, image_url: &str) -> Result<CatalogCard, DbError> {
        let card = self
            .store
            .insert_card(&NewCatalogCard::new(name.to_string(), image_url.to_string()))?;

        self.mirror_card(&card).await;
        Ok(card)
    }

    /// Updates a card's name and image reference, mirroring best-effort.
    /// Returns true if the card existed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the local update fails.
    #[instrument(skip(self))]
    pub async fn update_card(
        &self,
        id: i32,
        name: &str,
        image_url: &str,
    ) -> Result<bool, DbError> {
        let changed = self.store.update_card(id, name, image_url)?;
        if changed {
            if let Some(card) = self.store.list_cards()?.into_iter().find(|c| *c.id() == id) {
                self.mirror_card(&card).await;
            }
        }
        Ok(changed)
    }

    /// Removes a card locally and best-effort remotely. Returns true if
    /// the card existed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the local delete fails.
    #[instrument(skip(self))]
    pub async fn remove_card(&self, id: i32) -> Result<bool, DbError> {
        let removed = self.store.delete_card(id)?;
        if removed {
            if let Err(err) = self.remote.delete_card(&id.to_string()).await {
                warn!(card_id = id, %err, "Remote card delete failed");
            }
        }
        Ok(removed)
    }

    /// Lists the card catalog.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the local read fails.
    #[instrument(skip(self))]
    pub async fn list_cards(&self) -> Result<Vec<CatalogCard>, DbError> {
        self.store.list_cards()
    }

    /// Replaces the local catalog with the remote card set.
    ///
    /// When the remote store is unreachable the local catalog is left
    /// untouched and zero is returned; a timed-out pull must not wipe
    /// working local data.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a local write fails.
    #[instrument(skip(self))]
    pub async fn sync_cards(&self) -> Result<usize, DbError> {
        let docs = match self.remote.load_cards().await {
            Ok(docs) => docs,
            Err(err) => {
                warn!(%err, "Remote card sync unavailable; keeping local catalog");
                return Ok(0);
            }
        };

        self.store.clear_cards()?;
        for doc in &docs {
            self.store
                .insert_card(&NewCatalogCard::new(doc.name.clone(), doc.image_url.clone()))?;
        }

        info!(count = docs.len(), "Catalog replaced from remote");
        Ok(docs.len())
    }

    /// Appends a score to the history log.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the local insert fails.
    #[instrument(skip(self))]
    pub async fn record_score(&self, name: &str, points: i32) -> Result<ScoreRecord, DbError> {
        self.store
            .insert_score(&NewScoreRecord::new(name.to_string(), points))
    }

    /// Score history, highest points first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the local read fails.
    #[instrument(skip(self))]
    pub async fn high_scores(&self) -> Result<Vec<ScoreRecord>, DbError> {
        self.store.list_scores()
    }

    /// Wipes the score history log. Local only; the history is never
    /// mirrored.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the local delete fails.
    #[instrument(skip(self))]
    pub async fn clear_scores(&self) -> Result<(), DbError> {
        self.store.clear_scores()
    }

    async fn mirror_card(&self, card: &CatalogCard) {
        let doc = CardDoc {
            id: card.id().to_string(),
            name: card.name().clone(),
            image_url: card.image_url().clone(),
        };
        if let Err(err) = self.remote.put_card(&doc).await {
            warn!(card_id = %doc.id, %err, "Remote card mirror failed; local catalog remains authoritative");
        }
    }
}
