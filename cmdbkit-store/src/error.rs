//! Error types for the store layer.

use cmdbkit_types::PublicId;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No document with the given public id in the collection.
    #[error("document not found: {collection}/{public_id}")]
    NotFound {
        collection: String,
        public_id: PublicId,
    },

    /// A document with the given public id already exists.
    ///
    /// Not expected on the happy path — ids are minted atomically — but
    /// surfaced for race detection.
    #[error("duplicate key: {collection}/{public_id}")]
    DuplicateKey {
        collection: String,
        public_id: PublicId,
    },
}
