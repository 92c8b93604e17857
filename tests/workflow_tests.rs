mod utils;
use docsign::capture::capture_signature;
use docsign::document::{DocumentStatus, SignatureKind};
use docsign::storage::{DOCUMENTS_KEY, KeyValueStore};
use docsign::store::{RecipientLinking, StatusTransitions};
use utils::{TEST_BASE_URL, contract, empty_store, typed};

// RUST_BACKTRACE=1 cargo test --test workflow_tests -- --nocapture

#[test]
fn test_created_document_is_unsigned() {
    let (_, mut store) = empty_store();
    let doc_a = store.create(contract("Contract.pdf")).unwrap();
    assert_eq!(doc_a.status, DocumentStatus::Unsigned);
    assert!(doc_a.recipient().is_none());
    assert!(doc_a.signature().is_none());
}

#[test]
fn test_full_signing_flow() {
    let (_, mut store) = empty_store();
    let doc_a = store.create(contract("Contract.pdf")).unwrap();

    let link = store
        .issue_link(
            &[doc_a.id.clone()],
            "Jane Doe",
            "jane@example.com",
            TEST_BASE_URL,
        )
        .unwrap()
        .unwrap();
    let sent = store.get(&doc_a.id).unwrap();
    assert_eq!(sent.status.name(), "sent");
    assert_eq!(sent.recipient().unwrap().name, "Jane Doe");
    assert_eq!(link.path, format!("/sign/{}", link.recipient_id));

    let viewed = store.mark_viewed(&doc_a.id).unwrap().unwrap();
    assert!(viewed.advanced());
    assert_eq!(store.get(&doc_a.id).unwrap().status.name(), "viewed");

    let signature = capture_signature("Jane Doe", typed("Jane Doe")).unwrap();
    let signed = store.mark_signed(&doc_a.id, signature).unwrap();
    assert!(signed.status.is_signed());
    let sig = signed.signature().unwrap();
    assert_eq!(sig.name, "Jane Doe");
    assert_eq!(sig.kind, SignatureKind::Type);
    assert!(!sig.timestamp.is_empty());
    assert_eq!(signed.recipient_id(), Some(link.recipient_id.as_str()));
}

#[test]
fn test_batch_shares_recipient_id() {
    let (_, mut store) = empty_store();
    let doc_a = store.create(contract("A.pdf")).unwrap();
    let _other = store.create(contract("Other.pdf")).unwrap();
    let doc_b = store.create(contract("B.pdf")).unwrap();

    let link = store
        .issue_link(
            &[doc_b.id.clone(), doc_a.id.clone()],
            "Jane Doe",
            "jane@example.com",
            TEST_BASE_URL,
        )
        .unwrap()
        .unwrap();

    let batch = store.get_by_recipient(&link.recipient_id);
    let ids: Vec<&str> = batch.iter().map(|d| d.id.as_str()).collect();
    // creation order, not request order
    assert_eq!(ids, vec![doc_a.id.as_str(), doc_b.id.as_str()]);
    for doc in batch {
        let recipient = doc.recipient().unwrap();
        assert_eq!(recipient.recipient_id, link.recipient_id);
        assert_eq!(recipient.email, "jane@example.com");
        assert_eq!(doc.status.name(), "sent");
    }
}

#[test]
fn test_distinct_batches_get_distinct_ids() {
    let (_, mut store) = empty_store();
    let a = store.create(contract("A.pdf")).unwrap();
    let b = store.create(contract("B.pdf")).unwrap();
    let first = store
        .issue_link(&[a.id.clone()], "A", "a@example.com", TEST_BASE_URL)
        .unwrap()
        .unwrap();
    let second = store
        .issue_link(&[b.id.clone()], "B", "b@example.com", TEST_BASE_URL)
        .unwrap()
        .unwrap();
    let first_id: i64 = first.recipient_id.parse().unwrap();
    let second_id: i64 = second.recipient_id.parse().unwrap();
    assert!(second_id > first_id);
}

#[test]
fn test_empty_issue_link_mutates_nothing() {
    let (storage, mut store) = empty_store();
    store.create(contract("A.pdf")).unwrap();
    let before_blob = storage.get(DOCUMENTS_KEY).unwrap();
    let before = store.documents().to_vec();

    let link = store
        .issue_link(&[], "Jane Doe", "jane@example.com", TEST_BASE_URL)
        .unwrap();
    assert!(link.is_none());
    assert_eq!(store.documents(), before.as_slice());
    assert_eq!(storage.get(DOCUMENTS_KEY).unwrap(), before_blob);
}

#[test]
fn test_issue_link_with_nothing_sendable_returns_none() {
    let (storage, mut store) = empty_store();
    let a = store.create(contract("A.pdf")).unwrap();
    store
        .issue_link(&[a.id.clone()], "Jane Doe", "jane@example.com", TEST_BASE_URL)
        .unwrap();
    store
        .mark_signed(&a.id, capture_signature("Jane Doe", typed("Jane Doe")).unwrap())
        .unwrap();
    let before_blob = storage.get(DOCUMENTS_KEY).unwrap();
    let before = store.documents().to_vec();

    let unknown = store
        .issue_link(&["nope".to_string()], "Jane Doe", "jane@example.com", TEST_BASE_URL)
        .unwrap();
    assert!(unknown.is_none());

    let signed_only = store
        .issue_link(&[a.id.clone()], "John Smith", "john@example.com", TEST_BASE_URL)
        .unwrap();
    assert!(signed_only.is_none());

    assert_eq!(store.documents(), before.as_slice());
    assert_eq!(storage.get(DOCUMENTS_KEY).unwrap(), before_blob);
}

#[test]
fn test_unknown_ids_are_skipped() {
    let (_, mut store) = empty_store();
    let a = store.create(contract("A.pdf")).unwrap();
    let link = store
        .issue_link(
            &["does-not-exist".to_string(), a.id.clone()],
            "Jane Doe",
            "jane@example.com",
            TEST_BASE_URL,
        )
        .unwrap()
        .unwrap();
    assert_eq!(link.document_ids, vec![a.id.clone()]);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_resend_never_regresses_status() {
    let (_, mut store) = empty_store();
    let sent = store.create(contract("Sent.pdf")).unwrap();
    let viewed = store.create(contract("Viewed.pdf")).unwrap();
    let signed = store.create(contract("Signed.pdf")).unwrap();
    let ids = vec![sent.id.clone(), viewed.id.clone(), signed.id.clone()];
    let first = store
        .issue_link(&ids, "Jane Doe", "jane@example.com", TEST_BASE_URL)
        .unwrap()
        .unwrap();
    store.mark_viewed(&viewed.id).unwrap();
    store
        .mark_signed(
            &signed.id,
            capture_signature("Jane Doe", typed("Jane Doe")).unwrap(),
        )
        .unwrap();
    let signed_before = store.get(&signed.id).cloned().unwrap();

    let second = store
        .issue_link(&ids, "Jane Q. Doe", "jq@example.com", TEST_BASE_URL)
        .unwrap()
        .unwrap();
    assert_ne!(first.recipient_id, second.recipient_id);

    let sent_after = store.get(&sent.id).unwrap();
    assert_eq!(sent_after.status.name(), "sent");
    assert_eq!(sent_after.recipient().unwrap().email, "jq@example.com");

    let viewed_after = store.get(&viewed.id).unwrap();
    assert_eq!(viewed_after.status.name(), "viewed");
    assert_eq!(viewed_after.recipient_id(), Some(second.recipient_id.as_str()));

    assert_eq!(store.get(&signed.id).cloned().unwrap(), signed_before);
}

#[test]
fn test_resend_reuses_stored_recipient() {
    let (_, mut store) = empty_store();
    let a = store.create(contract("A.pdf")).unwrap();
    let first = store
        .issue_link(&[a.id.clone()], "Jane Doe", "jane@example.com", TEST_BASE_URL)
        .unwrap()
        .unwrap();
    let resent = store.resend(&first.recipient_id, TEST_BASE_URL).unwrap().unwrap();
    assert_ne!(resent.recipient_id, first.recipient_id);
    let doc = store.get(&a.id).unwrap();
    assert_eq!(doc.recipient().unwrap().name, "Jane Doe");
    assert!(store.get_by_recipient(&first.recipient_id).is_empty());
    assert!(store.resend("unknown", TEST_BASE_URL).unwrap().is_none());
}

#[test]
fn test_resend_partly_signed_batch_keeps_signed_on_old_link() {
    let (_, mut store) = empty_store();
    let a = store.create(contract("A.pdf")).unwrap();
    let b = store.create(contract("B.pdf")).unwrap();
    let first = store
        .issue_link(
            &[a.id.clone(), b.id.clone()],
            "Jane Doe",
            "jane@example.com",
            TEST_BASE_URL,
        )
        .unwrap()
        .unwrap();
    store
        .mark_signed(&a.id, capture_signature("Jane Doe", typed("Jane Doe")).unwrap())
        .unwrap();

    let resent = store.resend(&first.recipient_id, TEST_BASE_URL).unwrap().unwrap();
    assert_eq!(resent.document_ids, vec![b.id.clone()]);

    let old: Vec<&str> = store
        .get_by_recipient(&first.recipient_id)
        .iter()
        .map(|d| d.id.as_str())
        .collect();
    assert_eq!(old, vec![a.id.as_str()]);
    assert_eq!(store.get(&b.id).unwrap().recipient_id(), Some(resent.recipient_id.as_str()));
}

#[test]
fn test_view_twice_equals_view_once() {
    let (_, mut store) = empty_store();
    let a = store.create(contract("A.pdf")).unwrap();
    store
        .issue_link(&[a.id.clone()], "Jane Doe", "jane@example.com", TEST_BASE_URL)
        .unwrap();
    store.mark_viewed(&a.id).unwrap();
    let once = store.documents().to_vec();
    store.mark_viewed(&a.id).unwrap();
    assert_eq!(store.documents(), once.as_slice());
}
