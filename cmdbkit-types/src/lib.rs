//! Core type definitions for cmdbkit.
//!
//! This crate defines the fundamental, schema-agnostic types used throughout
//! the engine:
//! - Public identifiers (collection-scoped, counter-minted integers)
//! - Semantic versions with major/minor/patch bump levels
//!
//! All domain-specific documents (types, objects, audit entries, render
//! results) belong in `cmdbkit-model`, not here.

mod ids;
mod version;

pub use ids::PublicId;
pub use version::{Version, VersionLevel};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid version string: {0}")]
    InvalidVersion(String),

    #[error("invalid public id: {0}")]
    InvalidPublicId(String),
}
