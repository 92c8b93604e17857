use crate::error::DocsignError;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{AsRefStr, Display, EnumString};

pub mod demo;
pub mod upload;

/// Who a document was sent to. Every document in one link batch carries the
/// same `recipient_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub email: String,
    #[serde(rename = "recipientId")]
    pub recipient_id: String,
}

/// How a signature was captured.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SignatureKind {
    Draw,
    Type,
    Upload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Image data URL for draw/upload, literal text for type.
    pub data: String,
    #[serde(rename = "type")]
    pub kind: SignatureKind,
    pub name: String,
    pub timestamp: String,
}

/// Lifecycle stage of a document together with the data that stage requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    Unsigned,
    Sent { recipient: Recipient },
    Viewed { recipient: Recipient },
    Signed {
        recipient: Recipient,
        signature: Signature,
    },
}

impl DocumentStatus {
    pub fn name(&self) -> &'static str {
        match self {
            DocumentStatus::Unsigned => "unsigned",
            DocumentStatus::Sent { .. } => "sent",
            DocumentStatus::Viewed { .. } => "viewed",
            DocumentStatus::Signed { .. } => "signed",
        }
    }

    /// Position in the forward-only lifecycle.
    pub fn rank(&self) -> u8 {
        match self {
            DocumentStatus::Unsigned => 0,
            DocumentStatus::Sent { .. } => 1,
            DocumentStatus::Viewed { .. } => 2,
            DocumentStatus::Signed { .. } => 3,
        }
    }

    pub fn recipient(&self) -> Option<&Recipient> {
        match self {
            DocumentStatus::Unsigned => None,
            DocumentStatus::Sent { recipient }
            | DocumentStatus::Viewed { recipient }
            | DocumentStatus::Signed { recipient, .. } => Some(recipient),
        }
    }

    pub fn signature(&self) -> Option<&Signature> {
        match self {
            DocumentStatus::Signed { signature, .. } => Some(signature),
            _ => None,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, DocumentStatus::Signed { .. })
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One uploaded file plus its signing lifecycle state.
///
/// Serialized in the flat persisted shape (`status`, optional `recipient`,
/// optional `signature`); decoding rejects combinations the status forbids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DocumentRecord", into = "DocumentRecord")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub url: String,
    pub uploaded: String,
    pub status: DocumentStatus,
}

impl Document {
    pub fn recipient(&self) -> Option<&Recipient> {
        self.status.recipient()
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.status.signature()
    }

    pub fn recipient_id(&self) -> Option<&str> {
        self.recipient().map(|r| r.recipient_id.as_str())
    }

    /// Applies a shallow patch. Absent patch fields keep their value.
    pub fn apply(&mut self, patch: DocumentPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.id, self.status, self.title)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentRecord {
    id: String,
    title: String,
    url: String,
    uploaded: String,
    status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipient: Option<Recipient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature: Option<Signature>,
}

impl TryFrom<DocumentRecord> for Document {
    type Error = DocsignError;

    fn try_from(record: DocumentRecord) -> Result<Self, Self::Error> {
        let DocumentRecord {
            id,
            title,
            url,
            uploaded,
            status,
            recipient,
            signature,
        } = record;
        let malformed = |field: &str, reason: &str| DocsignError::DocumentMalformed {
            field: field.to_string(),
            reason: format!("document '{}': {}", id, reason),
        };

        let status = match (status.as_str(), recipient, signature) {
            ("unsigned", None, None) => DocumentStatus::Unsigned,
            ("sent", Some(recipient), None) => DocumentStatus::Sent { recipient },
            ("viewed", Some(recipient), None) => DocumentStatus::Viewed { recipient },
            ("signed", Some(recipient), Some(signature)) => {
                DocumentStatus::Signed { recipient, signature }
            }
            ("unsigned", _, _) => {
                return Err(malformed(
                    "recipient",
                    "unsigned documents carry no recipient or signature",
                ));
            }
            ("sent" | "viewed" | "signed", None, _) => {
                return Err(malformed(
                    "recipient",
                    "recipient is required once a document is sent",
                ));
            }
            ("sent" | "viewed", _, Some(_)) => {
                return Err(malformed("signature", "only signed documents carry a signature"));
            }
            ("signed", _, None) => {
                return Err(malformed("signature", "signed documents require a signature"));
            }
            (other, _, _) => {
                return Err(DocsignError::DocumentMalformed {
                    field: "status".to_string(),
                    reason: format!("unknown status '{}'", other),
                });
            }
        };

        Ok(Document {
            id,
            title,
            url,
            uploaded,
            status,
        })
    }
}

impl From<Document> for DocumentRecord {
    fn from(doc: Document) -> Self {
        let status = doc.status.name().to_string();
        let (recipient, signature) = match doc.status {
            DocumentStatus::Unsigned => (None, None),
            DocumentStatus::Sent { recipient } | DocumentStatus::Viewed { recipient } => {
                (Some(recipient), None)
            }
            DocumentStatus::Signed { recipient, signature } => (Some(recipient), Some(signature)),
        };
        DocumentRecord {
            id: doc.id,
            title: doc.title,
            url: doc.url,
            uploaded: doc.uploaded,
            status,
            recipient,
            signature,
        }
    }
}

/// Input to document creation; the store assigns id, timestamp and status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    pub title: String,
    pub url: String,
}

impl NewDocument {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub url: Option<String>,
    pub status: Option<DocumentStatus>,
}

impl DocumentPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

/// Decodes the persisted `documents` blob.
pub fn decode_documents(bytes: &[u8]) -> Result<Vec<Document>, DocsignError> {
    Ok(serde_json::from_slice(bytes)?)
}

pub fn encode_documents(documents: &[Document]) -> Result<Vec<u8>, DocsignError> {
    Ok(serde_json::to_vec_pretty(documents)?)
}
