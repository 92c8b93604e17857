#![allow(dead_code)]

use docsign::capture::SignatureCapture;
use docsign::document::NewDocument;
use docsign::service::SigningService;
use docsign::simulation::Simulation;
use docsign::storage::ObjectStorage;
use docsign::storage::jenv::clear_env_var;
use docsign::store::DocumentStore;
use std::sync::Arc;

pub static TEST_BASE_URL: &str = "http://localhost:8080";

pub static DOCSIGN_ENV_VARS: &[&str] = &[
    "DOCSIGN_DEFAULT_STORAGE",
    "DOCSIGN_DATA_DIRECTORY",
    "DOCSIGN_SEED_DEMO_DATA",
    "DOCSIGN_SIGNING_BASE_URL",
    "DOCSIGN_UPLOAD_LATENCY_MS",
    "DOCSIGN_VIEW_LATENCY_MS",
    "DOCSIGN_SIGNING_LATENCY_MS",
    "DOCSIGN_FAILURE_RATE",
    "DOCSIGN_LOG_LEVEL",
    "DOCSIGN_CONFIG",
];

pub fn clear_test_env_vars() {
    for key in DOCSIGN_ENV_VARS {
        let _ = clear_env_var(key);
    }
}

/// An unseeded in-memory store plus a handle on its backend.
pub fn empty_store() -> (ObjectStorage, DocumentStore) {
    let storage = ObjectStorage::in_memory();
    let store = DocumentStore::open(Arc::new(storage.clone()), false).unwrap();
    (storage, store)
}

pub fn seeded_store() -> (ObjectStorage, DocumentStore) {
    let storage = ObjectStorage::in_memory();
    let store = DocumentStore::open(Arc::new(storage.clone()), true).unwrap();
    (storage, store)
}

/// A service with no latency and no injected failures.
pub fn instant_service(seed: bool) -> (ObjectStorage, SigningService) {
    instant_service_with(seed, Simulation::instant())
}

pub fn instant_service_with(seed: bool, simulation: Simulation) -> (ObjectStorage, SigningService) {
    let storage = ObjectStorage::in_memory();
    let store = DocumentStore::open(Arc::new(storage.clone()), seed).unwrap();
    (storage, SigningService::new(store, simulation, TEST_BASE_URL))
}

pub fn contract(title: &str) -> NewDocument {
    NewDocument::new(title, format!("/{}", title.to_lowercase()))
}

pub fn typed(text: &str) -> SignatureCapture {
    SignatureCapture::Type {
        text: text.to_string(),
    }
}
