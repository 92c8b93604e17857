use super::DocumentStore;
use crate::document::{Document, DocumentStatus, Signature};
use crate::error::DocsignError;
use tracing::{debug, info};

/// Result of a transition request that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The document moved forward and was persisted.
    Advanced(Document),
    /// The document was already past the requested stage; nothing was written.
    Unchanged(Document),
}

impl TransitionOutcome {
    pub fn document(&self) -> &Document {
        match self {
            TransitionOutcome::Advanced(doc) | TransitionOutcome::Unchanged(doc) => doc,
        }
    }

    pub fn into_document(self) -> Document {
        match self {
            TransitionOutcome::Advanced(doc) | TransitionOutcome::Unchanged(doc) => doc,
        }
    }

    pub fn advanced(&self) -> bool {
        matches!(self, TransitionOutcome::Advanced(_))
    }
}

pub trait StatusTransitions {
    /// sent -> viewed. Viewing a document in any other status is a no-op.
    /// `None` when `id` is unknown.
    fn mark_viewed(&mut self, id: &str) -> Result<Option<TransitionOutcome>, DocsignError>;

    /// Advances every `sent` document of the batch to `viewed` with one
    /// write. Returns the batch after the transition, in creation order.
    fn mark_recipient_viewed(&mut self, recipient_id: &str) -> Result<Vec<Document>, DocsignError>;

    /// sent|viewed -> signed, attaching `signature` in the same write.
    fn mark_signed(&mut self, id: &str, signature: Signature) -> Result<Document, DocsignError>;
}

impl StatusTransitions for DocumentStore {
    fn mark_viewed(&mut self, id: &str) -> Result<Option<TransitionOutcome>, DocsignError> {
        let Some(current) = self.get(id).cloned() else {
            return Ok(None);
        };
        let DocumentStatus::Sent { recipient } = &current.status else {
            debug!("document {} is {}, view does not change it", id, current.status);
            return Ok(Some(TransitionOutcome::Unchanged(current)));
        };

        let mut next = current.clone();
        next.status = DocumentStatus::Viewed {
            recipient: recipient.clone(),
        };
        let index = self.position(id);
        let replacement = next.clone();
        self.apply_batch(move |docs| match index {
            Some(i) => {
                docs[i] = replacement;
                true
            }
            None => false,
        })?;
        info!("document {} viewed by {}", id, recipient.email);
        Ok(Some(TransitionOutcome::Advanced(next)))
    }

    fn mark_recipient_viewed(&mut self, recipient_id: &str) -> Result<Vec<Document>, DocsignError> {
        let advanced = self.apply_batch(|docs| {
            let mut changed = false;
            for doc in docs.iter_mut() {
                if doc.recipient_id() != Some(recipient_id) {
                    continue;
                }
                if let DocumentStatus::Sent { recipient } = &doc.status {
                    doc.status = DocumentStatus::Viewed {
                        recipient: recipient.clone(),
                    };
                    changed = true;
                }
            }
            changed
        })?;
        if advanced {
            info!("recipient {} viewed their documents", recipient_id);
        }
        Ok(self
            .get_by_recipient(recipient_id)
            .into_iter()
            .cloned()
            .collect())
    }

    fn mark_signed(&mut self, id: &str, signature: Signature) -> Result<Document, DocsignError> {
        let current = self
            .get(id)
            .cloned()
            .ok_or_else(|| DocsignError::DocumentNotFound { id: id.to_string() })?;

        let recipient = match &current.status {
            DocumentStatus::Sent { recipient } | DocumentStatus::Viewed { recipient } => {
                recipient.clone()
            }
            other => {
                return Err(DocsignError::InvalidTransition {
                    id: id.to_string(),
                    from: other.name().to_string(),
                    to: "signed".to_string(),
                });
            }
        };

        let mut next = current;
        next.status = DocumentStatus::Signed {
            recipient,
            signature,
        };
        let index = self.position(id);
        let replacement = next.clone();
        self.apply_batch(move |docs| match index {
            Some(i) => {
                docs[i] = replacement;
                true
            }
            None => false,
        })?;
        info!("document {} signed", id);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SignatureKind;
    use crate::storage::ObjectStorage;
    use std::sync::Arc;

    fn seeded() -> DocumentStore {
        DocumentStore::open(Arc::new(ObjectStorage::in_memory()), true).unwrap()
    }

    fn typed(name: &str) -> Signature {
        Signature {
            data: name.to_string(),
            kind: SignatureKind::Type,
            name: name.to_string(),
            timestamp: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_mark_viewed_is_idempotent() {
        let mut store = seeded();
        let first = store.mark_viewed("2").unwrap().unwrap();
        assert!(first.advanced());
        let after_first = store.documents().to_vec();

        let second = store.mark_viewed("2").unwrap().unwrap();
        assert!(!second.advanced());
        assert_eq!(store.documents(), after_first.as_slice());
    }

    #[test]
    fn test_mark_viewed_ignores_unsigned_and_signed() {
        let mut store = seeded();
        assert!(!store.mark_viewed("1").unwrap().unwrap().advanced());
        assert!(!store.mark_viewed("3").unwrap().unwrap().advanced());
        assert!(store.mark_viewed("nope").unwrap().is_none());
    }

    #[test]
    fn test_mark_signed_rejects_unsigned() {
        let mut store = seeded();
        let err = store.mark_signed("1", typed("Someone")).unwrap_err();
        assert!(matches!(err, DocsignError::InvalidTransition { .. }));
        assert_eq!(store.get("1").unwrap().status, DocumentStatus::Unsigned);
    }

    #[test]
    fn test_mark_signed_rejects_signed() {
        let mut store = seeded();
        let before = store.get("3").cloned();
        assert!(store.mark_signed("3", typed("Sarah Johnson")).is_err());
        assert_eq!(store.get("3").cloned(), before);
    }

    #[test]
    fn test_mark_signed_from_sent() {
        let mut store = seeded();
        let doc = store.mark_signed("2", typed("John Smith")).unwrap();
        assert_eq!(doc.signature().unwrap().name, "John Smith");
        assert_eq!(doc.recipient().unwrap().recipient_id, "1234");
    }

    #[test]
    fn test_mark_recipient_viewed_advances_only_sent() {
        let mut store = seeded();
        let docs = store.mark_recipient_viewed("1234").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].status.name(), "viewed");

        let signed = store.mark_recipient_viewed("5678").unwrap();
        assert!(signed.iter().all(|d| d.status.is_signed()));
        assert!(store.mark_recipient_viewed("0000").unwrap().is_empty());
    }
}
