//! Generic JSON document store for cmdbkit.
//!
//! Persists schema-less documents in named collections backed by SQLite.
//! The engine treats this crate as its collaborator boundary to "a generic
//! document store": every operation is collection-scoped, public ids are
//! minted from an atomic per-collection counter, and queries are simple
//! equality filters with sort/skip/limit.
//!
//! The store is synchronous; the connection is shared behind a mutex the
//! same way the policy store it replaces was.

mod document_store;
mod error;

pub use document_store::{DocumentStore, Filter, Sort, SortOrder};
pub use error::{StoreError, StoreResult};
