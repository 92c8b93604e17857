pub mod create;

use crate::document::Document;
use crate::store::{RecipientLink, RecipientSummary, StatusCounts};
use crate::time_utils::{format_display_date, time_ago};
use std::fmt::Write as _;

/// One line per document: id, status, title and upload age.
pub fn document_table(documents: &[Document]) -> String {
    if documents.is_empty() {
        return "No documents found.\n".to_string();
    }
    let width = documents.iter().map(|d| d.id.len()).max().unwrap_or(0);
    let mut out = String::new();
    for doc in documents {
        let _ = writeln!(
            out,
            "{:<width$}  {:<8}  {}  ({})",
            doc.id,
            doc.status.name(),
            doc.title,
            time_ago(&doc.uploaded),
            width = width
        );
    }
    out
}

pub fn document_details(doc: &Document) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Document: {}", doc.title);
    let _ = writeln!(out, "  id:       {}", doc.id);
    let _ = writeln!(out, "  url:      {}", doc.url);
    let _ = writeln!(out, "  uploaded: {}", format_display_date(&doc.uploaded));
    let _ = writeln!(out, "  status:   {}", doc.status);
    if let Some(recipient) = doc.recipient() {
        let _ = writeln!(
            out,
            "  recipient: {} <{}> (link {})",
            recipient.name, recipient.email, recipient.recipient_id
        );
    }
    if let Some(signature) = doc.signature() {
        let _ = writeln!(
            out,
            "  signed by {} ({}) on {}",
            signature.name,
            signature.kind,
            format_display_date(&signature.timestamp)
        );
    }
    out
}

pub fn status_counts(counts: &StatusCounts) -> String {
    format!(
        "Total: {}\nUnsigned: {}\nSent: {}\nViewed: {}\nSigned: {}\n",
        counts.total, counts.unsigned, counts.sent, counts.viewed, counts.signed
    )
}

pub fn recipient_table(summaries: &[RecipientSummary]) -> String {
    if summaries.is_empty() {
        return "No documents have been sent yet.\n".to_string();
    }
    let mut out = String::new();
    for summary in summaries {
        let state = if summary.all_signed() {
            "all signed".to_string()
        } else {
            format!("{}/{} signed", summary.signed_count, summary.document_ids.len())
        };
        let _ = writeln!(
            out,
            "{}  {} <{}>  {}  [{}]",
            summary.recipient_id,
            summary.name,
            summary.email,
            state,
            summary.document_ids.join(", ")
        );
    }
    out
}

pub fn link_summary(link: &RecipientLink) -> String {
    format!(
        "Signing link for {} document(s): {}\nrecipient id: {}\n",
        link.document_ids.len(),
        link.url,
        link.recipient_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::demo::sample_documents;

    #[test]
    fn test_details_include_recipient_and_signature() {
        let docs = sample_documents();
        let text = document_details(&docs[2]);
        assert!(text.contains("Sarah Johnson <sarah.j@example.com>"));
        assert!(text.contains("signed by Sarah Johnson (draw) on May 29, 2023, 11:42 AM"));
    }

    #[test]
    fn test_table_lists_every_document() {
        let text = document_table(&sample_documents());
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().next().unwrap().contains("unsigned"));
        assert_eq!(document_table(&[]), "No documents found.\n");
    }

    #[test]
    fn test_status_counts_render() {
        let counts = StatusCounts {
            total: 2,
            unsigned: 1,
            sent: 0,
            viewed: 0,
            signed: 1,
        };
        assert!(status_counts(&counts).contains("Signed: 1"));
    }
}
