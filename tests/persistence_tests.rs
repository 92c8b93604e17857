mod utils;
use docsign::capture::capture_signature;
use docsign::document::demo::sample_documents;
use docsign::error::DocsignError;
use docsign::storage::{DOCUMENTS_KEY, KeyValueStore, ObjectStorage};
use docsign::store::{DocumentStore, RecipientLinking, StatusTransitions};
use std::sync::Arc;
use utils::{TEST_BASE_URL, contract, seeded_store, typed};

#[test]
fn test_fresh_store_seeds_and_persists_demo_data() {
    let (storage, store) = seeded_store();
    assert_eq!(store.documents(), sample_documents().as_slice());

    let blob = storage.get(DOCUMENTS_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&blob).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 4);
    assert_eq!(value[1]["recipient"]["recipientId"], "1234");
    assert_eq!(value[2]["signature"]["type"], "draw");
}

#[test]
fn test_existing_collection_is_not_reseeded() {
    let storage = ObjectStorage::in_memory();
    storage.put(DOCUMENTS_KEY, b"[]").unwrap();
    let store = DocumentStore::open(Arc::new(storage), true).unwrap();
    assert!(store.is_empty());
}

#[test]
fn test_restart_round_trip_after_full_flow() {
    let (storage, mut store) = seeded_store();
    let doc = store.create(contract("Lease.pdf")).unwrap();
    let link = store
        .issue_link(
            &[doc.id.clone(), "1".to_string()],
            "Jane Doe",
            "jane@example.com",
            TEST_BASE_URL,
        )
        .unwrap()
        .unwrap();
    store.mark_recipient_viewed(&link.recipient_id).unwrap();
    store
        .mark_signed(&doc.id, capture_signature("Jane Doe", typed("Jane Doe")).unwrap())
        .unwrap();
    let before = store.documents().to_vec();
    store.close().unwrap();

    let restarted = DocumentStore::open(Arc::new(storage), true).unwrap();
    assert_eq!(restarted.documents(), before.as_slice());
}

#[test]
fn test_fs_backend_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().to_str().unwrap();

    let storage = ObjectStorage::known_new("fs", data_dir).unwrap();
    let mut store = DocumentStore::open(Arc::new(storage), false).unwrap();
    let doc = store.create(contract("OnDisk.pdf")).unwrap();
    store.close().unwrap();

    assert!(dir.path().join(DOCUMENTS_KEY).exists());

    let reopened = ObjectStorage::known_new("fs", data_dir).unwrap();
    let store = DocumentStore::open(Arc::new(reopened), false).unwrap();
    assert_eq!(store.get(&doc.id).unwrap().title, "OnDisk.pdf");
}

#[test]
fn test_malformed_json_is_rejected() {
    let storage = ObjectStorage::in_memory();
    storage.put(DOCUMENTS_KEY, b"{ this is not json").unwrap();
    let err = DocumentStore::open(Arc::new(storage), true).err().unwrap();
    assert!(matches!(err, DocsignError::DocumentMalformed { .. }));
}

#[test]
fn test_invariant_violation_is_rejected() {
    let storage = ObjectStorage::in_memory();
    let record = br#"[{"id":"7","title":"t","url":"u","uploaded":"2023-06-15T10:30:00Z","status":"signed",
        "recipient":{"name":"n","email":"e","recipientId":"r"}}]"#;
    storage.put(DOCUMENTS_KEY, record).unwrap();
    let err = DocumentStore::open(Arc::new(storage), true).err().unwrap();
    assert!(err.to_string().contains("signature"));
}

#[test]
fn test_reload_picks_up_external_writes() {
    let (storage, mut store) = seeded_store();
    let mut other = DocumentStore::open(Arc::new(storage.clone()), true).unwrap();
    other.create(contract("FromElsewhere.pdf")).unwrap();

    assert_eq!(store.len(), 4);
    store.reload().unwrap();
    assert_eq!(store.len(), 5);
}
