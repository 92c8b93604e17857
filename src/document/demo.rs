//! Fixed dataset a fresh store is seeded with.

use super::{Document, DocumentStatus, Recipient, Signature, SignatureKind};

/// A 1x1 transparent PNG used as the drawn signature of the seeded documents.
pub const SAMPLE_SIGNATURE_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn doc(id: &str, title: &str, url: &str, uploaded: &str, status: DocumentStatus) -> Document {
    Document {
        id: id.to_string(),
        title: title.to_string(),
        url: url.to_string(),
        uploaded: uploaded.to_string(),
        status,
    }
}

fn sarah() -> Recipient {
    Recipient {
        name: "Sarah Johnson".to_string(),
        email: "sarah.j@example.com".to_string(),
        recipient_id: "5678".to_string(),
    }
}

fn drawn_by_sarah(timestamp: &str) -> DocumentStatus {
    DocumentStatus::Signed {
        recipient: sarah(),
        signature: Signature {
            data: SAMPLE_SIGNATURE_PNG.to_string(),
            kind: SignatureKind::Draw,
            name: "Sarah Johnson".to_string(),
            timestamp: timestamp.to_string(),
        },
    }
}

pub fn sample_documents() -> Vec<Document> {
    vec![
        doc(
            "1",
            "Service Contract.pdf",
            "/sample-contract.pdf",
            "2023-06-15T10:30:00Z",
            DocumentStatus::Unsigned,
        ),
        doc(
            "2",
            "Non-Disclosure Agreement.pdf",
            "/sample-nda.pdf",
            "2023-06-10T14:20:00Z",
            DocumentStatus::Sent {
                recipient: Recipient {
                    name: "John Smith".to_string(),
                    email: "john.smith@example.com".to_string(),
                    recipient_id: "1234".to_string(),
                },
            },
        ),
        doc(
            "3",
            "Employment Contract.pdf",
            "/sample-employment.pdf",
            "2023-05-28T09:15:00Z",
            drawn_by_sarah("2023-05-29T11:42:00Z"),
        ),
        doc(
            "4",
            "Benefits Summary.pdf",
            "/sample-benefits.pdf",
            "2023-05-28T09:20:00Z",
            drawn_by_sarah("2023-05-29T11:45:00Z"),
        ),
    ]
}
