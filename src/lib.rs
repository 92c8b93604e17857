use crate::config::Config;
use crate::error::DocsignError;
use crate::service::SigningService;
use crate::storage::ObjectStorage;
use std::sync::Arc;
use tracing::debug;

pub mod capture;
pub mod cli_utils;
pub mod config;
pub mod document;
pub mod error;
pub mod observability;
pub mod service;
pub mod session;
pub mod simulation;
pub mod storage;
pub mod store;
pub mod time_utils;

pub use error::DocsignError as Error;

/// Builds a signing service over the storage backend `config` names.
pub fn open_service(config: &Config) -> Result<SigningService, DocsignError> {
    let storage = ObjectStorage::from_config(config)?;
    debug!("opening signing service on {} storage", storage.storage_type());
    SigningService::from_config(config, Arc::new(storage))
}
