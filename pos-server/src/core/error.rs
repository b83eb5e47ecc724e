//! Server-level errors: everything that can go wrong before requests flow

use crate::catalog::CatalogLoadError;
use crate::fulfillment::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogLoadError),

    #[error("Invalid inventory seed: {0}")]
    Seed(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
