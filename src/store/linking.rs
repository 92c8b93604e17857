use super::DocumentStore;
use crate::document::{DocumentStatus, Recipient};
use crate::error::DocsignError;
use crate::time_utils::time_derived_id;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

pub const SIGN_PATH_PREFIX: &str = "/sign/";

/// A shareable link exposing every document of one batch to its recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientLink {
    pub recipient_id: String,
    pub path: String,
    pub url: String,
    /// Documents the link covers, in the order they were requested.
    pub document_ids: Vec<String>,
}

pub fn link_path(recipient_id: &str) -> String {
    format!("{}{}", SIGN_PATH_PREFIX, recipient_id)
}

/// Joins the link path onto `base_url`, keeping any path prefix of the base.
pub fn link_url(base_url: &str, recipient_id: &str) -> Result<String, DocsignError> {
    let mut url = Url::parse(base_url).map_err(|e| {
        DocsignError::ConfigError(format!("signing base url '{}' is invalid: {}", base_url, e))
    })?;
    {
        let mut segments = url.path_segments_mut().map_err(|_| {
            DocsignError::ConfigError(format!("'{}' cannot be a base url", base_url))
        })?;
        segments.pop_if_empty().push("sign").push(recipient_id);
    }
    Ok(url.to_string())
}

/// Pulls the recipient id out of a full link, a `/sign/{id}` path or a bare id.
pub fn parse_recipient_id(link: &str) -> Option<String> {
    let trimmed = link.trim();
    if trimmed.is_empty() {
        return None;
    }
    let path = match Url::parse(trimmed) {
        Ok(url) => url.path().to_string(),
        Err(_) => trimmed.to_string(),
    };
    let id = match path.strip_prefix(SIGN_PATH_PREFIX) {
        Some(rest) => rest.trim_end_matches('/'),
        None if !path.contains('/') => path.as_str(),
        None => return None,
    };
    if id.is_empty() { None } else { Some(id.to_string()) }
}

pub trait RecipientLinking {
    /// Issues one fresh recipient id for `ids` and sends each document to
    /// the recipient. Unknown and signed ids are skipped. When nothing is
    /// left to send, nothing is mutated and `None` is returned.
    ///
    /// Re-issuing never regresses status: viewed documents stay viewed with
    /// the new recipient info, signed documents are left untouched.
    fn issue_link(
        &mut self,
        ids: &[String],
        recipient_name: &str,
        recipient_email: &str,
        base_url: &str,
    ) -> Result<Option<RecipientLink>, DocsignError>;

    /// Issues a new link for the documents of `recipient_id` to the
    /// recipient it was originally sent to. `None` when the id is unknown.
    ///
    /// Signed documents keep the link they were signed under, so a partly
    /// signed batch ends up split across the old and the new id.
    fn resend(
        &mut self,
        recipient_id: &str,
        base_url: &str,
    ) -> Result<Option<RecipientLink>, DocsignError>;
}

impl RecipientLinking for DocumentStore {
    fn issue_link(
        &mut self,
        ids: &[String],
        recipient_name: &str,
        recipient_email: &str,
        base_url: &str,
    ) -> Result<Option<RecipientLink>, DocsignError> {
        if ids.is_empty() {
            return Ok(None);
        }

        // validate before an id is handed out
        let _ = link_url(base_url, "0")?;

        let mut linked = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get(id) {
                Some(doc) if doc.status.is_signed() => {
                    warn!("document {} is already signed, not re-sending it", id);
                }
                Some(_) => linked.push(id.clone()),
                None => warn!("skipping unknown document {}", id),
            }
        }
        if linked.is_empty() {
            debug!("no sendable documents among {} requested", ids.len());
            return Ok(None);
        }

        let recipient_id = time_derived_id();
        let recipient = Recipient {
            name: recipient_name.to_string(),
            email: recipient_email.to_string(),
            recipient_id: recipient_id.clone(),
        };

        let targets = linked.clone();
        let new_recipient = recipient.clone();
        self.apply_batch(move |docs| {
            let mut changed = false;
            for doc in docs.iter_mut().filter(|d| targets.contains(&d.id)) {
                doc.status = match &doc.status {
                    DocumentStatus::Viewed { .. } => DocumentStatus::Viewed {
                        recipient: new_recipient.clone(),
                    },
                    _ => DocumentStatus::Sent {
                        recipient: new_recipient.clone(),
                    },
                };
                changed = true;
            }
            changed
        })?;

        info!(
            "issued link {} for {} document(s) to {}",
            recipient_id,
            linked.len(),
            recipient.email
        );
        Ok(Some(RecipientLink {
            path: link_path(&recipient_id),
            url: link_url(base_url, &recipient_id)?,
            recipient_id,
            document_ids: linked,
        }))
    }

    fn resend(
        &mut self,
        recipient_id: &str,
        base_url: &str,
    ) -> Result<Option<RecipientLink>, DocsignError> {
        let batch = self.get_by_recipient(recipient_id);
        let Some(recipient) = batch.first().and_then(|d| d.recipient()).cloned() else {
            return Ok(None);
        };
        let ids: Vec<String> = batch.iter().map(|d| d.id.clone()).collect();
        if batch.iter().all(|d| d.status.is_signed()) {
            // nothing left to sign; the existing link stays valid
            return Ok(Some(RecipientLink {
                recipient_id: recipient_id.to_string(),
                path: link_path(recipient_id),
                url: link_url(base_url, recipient_id)?,
                document_ids: ids,
            }));
        }
        self.issue_link(&ids, &recipient.name, &recipient.email, base_url)
    }
}
