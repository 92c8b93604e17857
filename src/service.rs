use crate::capture::{SignatureCapture, capture_signature};
use crate::config::Config;
use crate::document::{Document, NewDocument};
use crate::error::DocsignError;
use crate::simulation::{Operation, Simulation};
use crate::storage::KeyValueStore;
use crate::store::{
    DocumentStore, RecipientLink, RecipientLinking, RecipientSummary, Reporting, StatusCounts,
    StatusTransitions,
};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub const DEFAULT_SIGNING_BASE_URL: &str = "http://localhost:8080";

/// Async facade over the document store that behaves like a slow, flaky
/// backend: each action waits out its simulated latency and may fail.
///
/// Latency is awaited before the store lock is taken, and a cancelled or
/// failed action never reaches the store.
#[derive(Clone)]
pub struct SigningService {
    store: Arc<Mutex<DocumentStore>>,
    simulation: Simulation,
    base_url: String,
}

impl SigningService {
    pub fn new(store: DocumentStore, simulation: Simulation, base_url: impl Into<String>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            simulation,
            base_url: base_url.into(),
        }
    }

    /// Opens the store on `backend` and applies the config's seeding,
    /// latency, failure rate and link base url.
    pub fn from_config(
        config: &Config,
        backend: Arc<dyn KeyValueStore>,
    ) -> Result<Self, DocsignError> {
        let seed = config.docsign_seed_demo_data().unwrap_or(true);
        let store = DocumentStore::open(backend, seed)?;
        let base_url = config
            .docsign_signing_base_url()
            .clone()
            .unwrap_or_else(|| DEFAULT_SIGNING_BASE_URL.to_string());
        Ok(Self::new(store, Simulation::from_config(config), base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn with_store<R>(
        &self,
        f: impl FnOnce(&mut DocumentStore) -> Result<R, DocsignError>,
    ) -> Result<R, DocsignError> {
        let mut guard = self.store.lock().map_err(|e| {
            DocsignError::StorageError(format!("document store lock poisoned: {}", e))
        })?;
        f(&mut guard)
    }

    /// Creates every document after the upload latency. Nothing is created
    /// when the upload is cancelled or fails.
    pub async fn upload(
        &self,
        documents: Vec<NewDocument>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Document>, DocsignError> {
        if documents.is_empty() {
            return Err(DocsignError::ValidationError(
                "select at least one document to upload".to_string(),
            ));
        }
        self.simulation.delay(Operation::Upload, cancel).await?;
        self.simulation.check_failure(Operation::Upload)?;

        let created = self.with_store(|store| store.create_many(documents))?;
        info!("uploaded {} document(s)", created.len());
        Ok(created)
    }

    /// Sends `ids` to one recipient under a single new link.
    pub fn send_for_signature(
        &self,
        ids: &[String],
        recipient_name: &str,
        recipient_email: &str,
    ) -> Result<RecipientLink, DocsignError> {
        let name = recipient_name.trim();
        let email = recipient_email.trim();
        if name.is_empty() {
            return Err(DocsignError::ValidationError(
                "recipient name is required".to_string(),
            ));
        }
        if email.is_empty() {
            return Err(DocsignError::ValidationError(
                "recipient email is required".to_string(),
            ));
        }
        if ids.is_empty() {
            return Err(DocsignError::ValidationError(
                "select at least one document to send".to_string(),
            ));
        }

        self.with_store(|store| {
            if let Some(missing) = ids.iter().find(|id| store.get(id).is_none()) {
                return Err(DocsignError::DocumentNotFound { id: missing.clone() });
            }
            if let Some(signed) = ids
                .iter()
                .find(|id| store.get(id).is_some_and(|d| d.status.is_signed()))
            {
                return Err(DocsignError::InvalidTransition {
                    id: signed.clone(),
                    from: "signed".to_string(),
                    to: "sent".to_string(),
                });
            }
            store
                .issue_link(ids, name, email, &self.base_url)?
                .ok_or_else(|| DocsignError::ValidationError("no documents to send".to_string()))
        })
    }

    pub fn resend(&self, recipient_id: &str) -> Result<RecipientLink, DocsignError> {
        self.with_store(|store| {
            store
                .resend(recipient_id, &self.base_url)?
                .ok_or_else(|| DocsignError::RecipientNotFound {
                    recipient_id: recipient_id.to_string(),
                })
        })
    }

    /// Loads one document; a `sent` document becomes `viewed`.
    pub async fn open_document(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Document, DocsignError> {
        self.simulation.delay(Operation::View, cancel).await?;
        self.with_store(|store| {
            store
                .mark_viewed(id)?
                .map(|outcome| outcome.into_document())
                .ok_or_else(|| DocsignError::DocumentNotFound { id: id.to_string() })
        })
    }

    /// Loads every document behind a recipient link and marks the `sent`
    /// ones `viewed`.
    pub async fn open_recipient_view(
        &self,
        recipient_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Document>, DocsignError> {
        self.simulation.delay(Operation::View, cancel).await?;
        let documents = self.with_store(|store| store.mark_recipient_viewed(recipient_id))?;
        if documents.is_empty() {
            warn!("no documents behind recipient link {}", recipient_id);
            return Err(DocsignError::RecipientNotFound {
                recipient_id: recipient_id.to_string(),
            });
        }
        Ok(documents)
    }

    /// Validates the capture, waits out the signing latency, then signs the
    /// document in one write.
    pub async fn submit_signature(
        &self,
        id: &str,
        signer_name: &str,
        capture: SignatureCapture,
        cancel: &CancellationToken,
    ) -> Result<Document, DocsignError> {
        let signature = capture_signature(signer_name, capture)?;
        self.with_store(|store| match store.get(id) {
            None => Err(DocsignError::DocumentNotFound { id: id.to_string() }),
            Some(doc) if doc.recipient().is_none() || doc.status.is_signed() => {
                Err(DocsignError::InvalidTransition {
                    id: id.to_string(),
                    from: doc.status.name().to_string(),
                    to: "signed".to_string(),
                })
            }
            Some(_) => Ok(()),
        })?;

        self.simulation.delay(Operation::Signing, cancel).await?;
        self.simulation.check_failure(Operation::Signing)?;
        self.with_store(|store| store.mark_signed(id, signature))
    }

    pub fn get(&self, id: &str) -> Result<Document, DocsignError> {
        self.with_store(|store| {
            store
                .get(id)
                .cloned()
                .ok_or_else(|| DocsignError::DocumentNotFound { id: id.to_string() })
        })
    }

    pub fn documents(&self) -> Result<Vec<Document>, DocsignError> {
        self.with_store(|store| Ok(store.documents().to_vec()))
    }

    pub fn documents_for_recipient(
        &self,
        recipient_id: &str,
    ) -> Result<Vec<Document>, DocsignError> {
        self.with_store(|store| {
            Ok(store
                .get_by_recipient(recipient_id)
                .into_iter()
                .cloned()
                .collect())
        })
    }

    pub fn stats(&self) -> Result<StatusCounts, DocsignError> {
        self.with_store(|store| Ok(store.status_counts()))
    }

    pub fn recipients(&self) -> Result<Vec<RecipientSummary>, DocsignError> {
        self.with_store(|store| Ok(store.recipients()))
    }

    pub fn search(&self, term: &str) -> Result<Vec<Document>, DocsignError> {
        self.with_store(|store| Ok(store.search(term).into_iter().cloned().collect()))
    }

    /// Re-reads persisted state, as a restarted process would.
    pub fn reload(&self) -> Result<(), DocsignError> {
        self.with_store(|store| store.reload())
    }

    pub fn flush(&self) -> Result<(), DocsignError> {
        self.with_store(|store| store.flush())
    }
}
