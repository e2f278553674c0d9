//! Local card catalog and score history store.

use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::db::{CatalogCard, DbError, NewCatalogCard, NewScoreRecord, ScoreRecord, schema};

/// SQLite-backed store for the admin card catalog and the append-only
/// score log. Gameplay never reads the catalog; the board builds its own
/// ephemeral pairs.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    db_path: String,
}

impl CatalogStore {
    /// Creates a store connected to the database at the given path.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        info!(path = %db_path, "Creating CatalogStore");
        Ok(Self { db_path })
    }

    fn connection(&self) -> Result<SqliteConnection, DbError> {
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    /// Inserts a catalog card.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, card))]
    pub fn insert_card(&self, card: &NewCatalogCard) -> Result<CatalogCard, DbError> {
        debug!("Inserting catalog card");
        let mut conn = self.connection()?;

        let card = diesel::insert_into(schema::cards::table)
            .values(card)
            .returning(CatalogCard::as_returning())
            .get_result(&mut conn)?;

        info!(card_id = card.id(), name = %card.name(), "Catalog card inserted");
        Ok(card)
    }

    /// Updates a catalog card's name and image reference. Returns true if
    /// a row was found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn update_card(&self, id: i32, name: &str, image_url: &str) -> Result<bool, DbError> {
        debug!(card_id = id, "Updating catalog card");
        let mut conn = self.connection()?;

        let changed = diesel::update(schema::cards::table.find(id))
            .set((
                schema::cards::name.eq(name),
                schema::cards::image_url.eq(image_url),
            ))
            .execute(&mut conn)?;

        Ok(changed > 0)
    }

    /// Deletes a catalog card. Returns true if a row was found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete_card(&self, id: i32) -> Result<bool, DbError> {
        debug!(card_id = id, "Deleting catalog card");
        let mut conn = self.connection()?;

        let changed = diesel::delete(schema::cards::table.find(id)).execute(&mut conn)?;
        Ok(changed > 0)
    }

    /// Lists the full card catalog.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_cards(&self) -> Result<Vec<CatalogCard>, DbError> {
        let mut conn = self.connection()?;
        let cards = schema::cards::table.load::<CatalogCard>(&mut conn)?;
        debug!(count = cards.len(), "Catalog cards loaded");
        Ok(cards)
    }

    /// Removes every catalog card (the replace-local sync path).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn clear_cards(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let removed = diesel::delete(schema::cards::table).execute(&mut conn)?;
        info!(removed, "Catalog cleared");
        Ok(())
    }

    /// Appends a score record to the history log.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, record))]
    pub fn insert_score(&self, record: &NewScoreRecord) -> Result<ScoreRecord, DbError> {
        debug!("Appending score record");
        let mut conn = self.connection()?;

        let record = diesel::insert_into(schema::scores::table)
            .values(record)
            .returning(ScoreRecord::as_returning())
            .get_result(&mut conn)?;

        info!(score_id = record.id(), points = record.points(), "Score recorded");
        Ok(record)
    }

    /// Lists score history, highest points first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_scores(&self) -> Result<Vec<ScoreRecord>, DbError> {
        let mut conn = self.connection()?;
        let records = schema::scores::table
            .order(schema::scores::points.desc())
            .load::<ScoreRecord>(&mut conn)?;
        debug!(count = records.len(), "Score history loaded");
        Ok(records)
    }

    /// Removes the entire score history.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn clear_scores(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let removed = diesel::delete(schema::scores::table).execute(&mut conn)?;
        info!(removed, "Score history cleared");
        Ok(())
    }
}
