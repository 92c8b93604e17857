use crate::document::demo::sample_documents;
use crate::document::{
    Document, DocumentPatch, DocumentStatus, NewDocument, decode_documents, encode_documents,
};
use crate::error::DocsignError;
use crate::storage::{DOCUMENTS_KEY, KeyValueStore};
use crate::time_utils::{now_rfc3339, time_derived_id};
use std::sync::Arc;
use tracing::{debug, info};

pub mod linking;
pub mod reporting;
pub mod transitions;

pub use linking::{RecipientLink, RecipientLinking};
pub use reporting::{RecipientSummary, Reporting, StatusCounts};
pub use transitions::{StatusTransitions, TransitionOutcome};

/// The document collection and sole source of truth for document status.
///
/// Every successful mutation rewrites the whole collection under
/// [`DOCUMENTS_KEY`] before it becomes visible in memory.
pub struct DocumentStore {
    backend: Arc<dyn KeyValueStore>,
    documents: Vec<Document>,
}

impl DocumentStore {
    /// Loads the persisted collection, or seeds the demo dataset when nothing
    /// is stored and `seed_demo_data` is set. An empty unseeded store is not
    /// written until its first mutation.
    pub fn open(
        backend: Arc<dyn KeyValueStore>,
        seed_demo_data: bool,
    ) -> Result<Self, DocsignError> {
        let documents = match backend.get(DOCUMENTS_KEY)? {
            Some(bytes) => {
                let documents = decode_documents(&bytes)?;
                debug!("loaded {} documents", documents.len());
                documents
            }
            None if seed_demo_data => {
                let documents = sample_documents();
                backend.put(DOCUMENTS_KEY, &encode_documents(&documents)?)?;
                info!("seeded store with {} demo documents", documents.len());
                documents
            }
            None => Vec::new(),
        };
        Ok(Self { backend, documents })
    }

    /// Assigns id and upload timestamp and appends an unsigned document.
    /// Titles are not validated; empty and duplicate titles are allowed.
    pub fn create(&mut self, new_document: NewDocument) -> Result<Document, DocsignError> {
        let mut created = self.create_many(vec![new_document])?;
        created
            .pop()
            .ok_or_else(|| DocsignError::StorageError("document was not created".to_string()))
    }

    /// Creates every document of `new_documents` with a single write. Either
    /// all of them are committed or none are.
    pub fn create_many(
        &mut self,
        new_documents: Vec<NewDocument>,
    ) -> Result<Vec<Document>, DocsignError> {
        let created: Vec<Document> = new_documents
            .into_iter()
            .map(|new_document| Document {
                id: time_derived_id(),
                title: new_document.title,
                url: new_document.url,
                uploaded: now_rfc3339(),
                status: DocumentStatus::Unsigned,
            })
            .collect();
        if created.is_empty() {
            return Ok(created);
        }
        let appended = created.clone();
        self.apply_batch(move |docs| {
            docs.extend(appended);
            true
        })?;
        for document in &created {
            info!("created document {} '{}'", document.id, document.title);
        }
        Ok(created)
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Every document issued under `recipient_id`, in creation order.
    pub fn get_by_recipient(&self, recipient_id: &str) -> Vec<&Document> {
        self.documents
            .iter()
            .filter(|d| d.recipient_id() == Some(recipient_id))
            .collect()
    }

    /// Shallow-merges `patch` into the document. Returns `None` without
    /// writing anything when `id` is unknown.
    pub fn update(
        &mut self,
        id: &str,
        patch: DocumentPatch,
    ) -> Result<Option<Document>, DocsignError> {
        let Some(index) = self.position(id) else {
            debug!("update skipped: no document {}", id);
            return Ok(None);
        };
        self.apply_batch(|docs| {
            docs[index].apply(patch);
            true
        })?;
        Ok(self.documents.get(index).cloned())
    }

    /// Runs `mutate` on a working copy of the collection. When it returns
    /// true the copy is persisted with a single write and then committed;
    /// on a failed write the in-memory collection is unchanged.
    pub fn apply_batch<F>(&mut self, mutate: F) -> Result<bool, DocsignError>
    where
        F: FnOnce(&mut Vec<Document>) -> bool,
    {
        let mut working = self.documents.clone();
        if !mutate(&mut working) {
            return Ok(false);
        }
        self.persist(&working)?;
        self.documents = working;
        Ok(true)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Re-reads the persisted collection, as a restarted process would.
    pub fn reload(&mut self) -> Result<(), DocsignError> {
        self.documents = match self.backend.get(DOCUMENTS_KEY)? {
            Some(bytes) => decode_documents(&bytes)?,
            None => Vec::new(),
        };
        debug!("reloaded {} documents", self.documents.len());
        Ok(())
    }

    /// Writes the current collection even when nothing changed.
    pub fn flush(&self) -> Result<(), DocsignError> {
        self.persist(&self.documents)
    }

    /// Flushes and releases the store.
    pub fn close(self) -> Result<(), DocsignError> {
        self.flush()?;
        debug!("document store closed");
        Ok(())
    }

    pub(crate) fn position(&self, id: &str) -> Option<usize> {
        self.documents.iter().position(|d| d.id == id)
    }

    fn persist(&self, documents: &[Document]) -> Result<(), DocsignError> {
        let bytes = encode_documents(documents)?;
        self.backend.put(DOCUMENTS_KEY, &bytes)?;
        debug!("persisted {} documents", documents.len());
        Ok(())
    }
}
