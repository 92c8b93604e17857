use super::DocumentStore;
use crate::document::{Document, DocumentStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: usize,
    pub unsigned: usize,
    pub sent: usize,
    pub viewed: usize,
    pub signed: usize,
}

/// Documents grouped under one recipient link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientSummary {
    pub recipient_id: String,
    pub name: String,
    pub email: String,
    pub document_ids: Vec<String>,
    pub signed_count: usize,
}

impl RecipientSummary {
    pub fn all_signed(&self) -> bool {
        !self.document_ids.is_empty() && self.signed_count == self.document_ids.len()
    }
}

pub trait Reporting {
    fn status_counts(&self) -> StatusCounts;
    /// Case-insensitive title substring match, in creation order. An empty
    /// term matches everything.
    fn search(&self, term: &str) -> Vec<&Document>;
    /// One entry per recipient id, in the order each id first appears.
    fn recipients(&self) -> Vec<RecipientSummary>;
}

impl Reporting for DocumentStore {
    fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts {
            total: self.len(),
            ..Default::default()
        };
        for doc in self.documents() {
            match doc.status {
                DocumentStatus::Unsigned => counts.unsigned += 1,
                DocumentStatus::Sent { .. } => counts.sent += 1,
                DocumentStatus::Viewed { .. } => counts.viewed += 1,
                DocumentStatus::Signed { .. } => counts.signed += 1,
            }
        }
        counts
    }

    fn search(&self, term: &str) -> Vec<&Document> {
        let needle = term.to_lowercase();
        self.documents()
            .iter()
            .filter(|d| d.title.to_lowercase().contains(&needle))
            .collect()
    }

    fn recipients(&self) -> Vec<RecipientSummary> {
        let mut summaries: Vec<RecipientSummary> = Vec::new();
        for doc in self.documents() {
            let Some(recipient) = doc.recipient() else {
                continue;
            };
            let signed = usize::from(doc.status.is_signed());
            match summaries
                .iter_mut()
                .find(|s| s.recipient_id == recipient.recipient_id)
            {
                Some(summary) => {
                    summary.document_ids.push(doc.id.clone());
                    summary.signed_count += signed;
                }
                None => summaries.push(RecipientSummary {
                    recipient_id: recipient.recipient_id.clone(),
                    name: recipient.name.clone(),
                    email: recipient.email.clone(),
                    document_ids: vec![doc.id.clone()],
                    signed_count: signed,
                }),
            }
        }
        summaries
    }
}
