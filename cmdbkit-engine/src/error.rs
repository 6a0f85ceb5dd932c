//! Error types for the engine.
//!
//! All variants are deterministic — the engine never retries. Audit insert
//! failures are the one tolerated class: they are caught by the managers and
//! reported through `AuditStatus::Degraded` instead of an error.

use cmdbkit_model::{ModelError, Permission};
use cmdbkit_store::StoreError;
use cmdbkit_types::PublicId;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the engine's operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Requested type or object public id does not exist.
    #[error("not found: {collection}/{public_id}")]
    NotFound {
        collection: String,
        public_id: PublicId,
    },

    /// The ACL (or an inactive type) refused the operation. The message
    /// names the type and permission only — never the object's content.
    #[error("access denied: {permission} on type {type_id}")]
    AccessDenied {
        type_id: PublicId,
        permission: Permission,
    },

    /// A schema constraint was violated on write.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Schema lookup failure (field/section/external/template).
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Unexpected failure during render recursion.
    #[error("render failed: {0}")]
    Render(String),

    /// Malformed or missing version string.
    #[error(transparent)]
    Version(#[from] cmdbkit_types::Error),

    /// Store failure other than a missing document.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound {
                collection,
                public_id,
            } => Self::NotFound {
                collection,
                public_id,
            },
            other => Self::Store(other),
        }
    }
}

impl EngineError {
    /// True for the 404-equivalent case.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
