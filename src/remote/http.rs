//! HTTP document-store client.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::{AccountDoc, CardDoc, RemoteError, RemoteStore};

/// Remote mirror backed by a JSON document API.
///
/// Documents live under `{base_url}/{collection}/{id}`; collection reads
/// return JSON arrays, and the account email lookup is an
/// equality-filtered query on `(email, active)`.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRemote {
    /// Creates a client with the given base URL and per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the underlying client cannot be built.
    #[instrument(skip(base_url), fields(base_url = %base_url))]
    pub fn new(base_url: String, timeout_ms: u64) -> Result<Self, RemoteError> {
        info!(timeout_ms, "Creating HttpRemote");
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(RemoteError::from)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.base_url, collection)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection, id)
    }
}

#[async_trait]
impl RemoteStore for HttpRemote {
    #[instrument(skip(self, doc), fields(account_id = %doc.id))]
    async fn put_account(&self, doc: &AccountDoc) -> Result<(), RemoteError> {
        debug!("Putting account document");
        self.client
            .put(self.document_url("accounts", &doc.id))
            .json(doc)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_account(&self, id: &str) -> Result<(), RemoteError> {
        debug!(account_id = %id, "Deleting account document");
        self.client
            .delete(self.document_url("accounts", id))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountDoc>, RemoteError> {
        debug!(email = %email, "Querying account documents by email");
        let docs: Vec<AccountDoc> = self
            .client
            .get(self.collection_url("accounts"))
            .query(&[("email", email), ("active", "true")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(docs.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn load_accounts(&self) -> Result<Vec<AccountDoc>, RemoteError> {
        debug!("Loading account documents");
        let docs: Vec<AccountDoc> = self
            .client
            .get(self.collection_url("accounts"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        info!(count = docs.len(), "Account documents loaded");
        Ok(docs)
    }

    #[instrument(skip(self))]
    async fn load_cards(&self) -> Result<Vec<CardDoc>, RemoteError> {
        debug!("Loading card documents");
        let docs: Vec<CardDoc> = self
            .client
            .get(self.collection_url("cards"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        info!(count = docs.len(), "Card documents loaded");
        Ok(docs)
    }

    #[instrument(skip(self, doc), fields(card_id = %doc.id))]
    async fn put_card(&self, doc: &CardDoc) -> Result<(), RemoteError> {
        debug!("Putting card document");
        self.client
            .put(self.document_url("cards", &doc.id))
            .json(doc)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_card(&self, id: &str) -> Result<(), RemoteError> {
        debug!(card_id = %id, "Deleting card document");
        self.client
            .delete(self.document_url("cards", id))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
