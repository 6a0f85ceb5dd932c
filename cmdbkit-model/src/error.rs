//! Error types for the schema model.

use crate::Permission;
use cmdbkit_types::PublicId;
use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while working with schema documents.
///
/// These are all local and deterministic: a caller can map them straight to
/// a client error without retrying.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    /// No field with the given name exists on the type.
    #[error("field not found: {0}")]
    FieldNotFound(String),

    /// No section with the given name exists on the type.
    #[error("section not found: {0}")]
    SectionNotFound(String),

    /// No external link with the given name exists on the type.
    #[error("external link not found: {0}")]
    ExternalNotFound(String),

    /// A `{}` template was filled with the wrong number of values.
    #[error("template expects {expected} values, got {got}")]
    TemplateFill { expected: usize, got: usize },

    /// Revoking a permission that was never granted.
    #[error("permission {permission} not granted to group {group}")]
    PermissionNotGranted {
        group: PublicId,
        permission: Permission,
    },

    /// A schema-level constraint was violated.
    #[error("validation failed: {0}")]
    Validation(String),
}
