//! Rendering and access-control engine for cmdbkit.
//!
//! This crate wires the schema model, the document store, and the audit
//! trail into the operations collaborators call:
//! - [`Renderer`] — turns `(Object, TypeSchema)` into a permission-checked,
//!   reference-expanded [`RenderResult`] with bounded recursion
//! - [`ObjectManager`] / [`TypeManager`] — the write paths: ACL gates,
//!   validation, version resolution, audit hooks
//! - [`AuditTrail`] — the append-only log of mutating operations
//! - [`diff_fields`] / [`classify_change`] — field-set diffing and the
//!   version-bump policy
//!
//! Every handle (store, user directory) is passed in explicitly at
//! construction; nothing here reaches for ambient globals. The engine is
//! synchronous — concurrency, cancellation and timeouts belong to the
//! calling layer, and the one operation that must be atomic (public-id
//! allocation) is delegated to the store.

mod audit;
mod diff;
mod directory;
mod error;
mod objects;
mod render;
mod types;

pub use audit::{AuditEvent, AuditStatus, AuditTrail};
pub use diff::{classify, classify_change, diff_fields, FieldChanges};
pub use directory::{StaticDirectory, UserDirectory, UserProfile};
pub use error::{EngineError, EngineResult};
pub use objects::{
    ActiveChangeOutcome, CreateOutcome, DeleteOutcome, ObjectManager, UpdateOutcome,
};
pub use render::{
    NestedAclPolicy, ObjectInformation, RenderConfig, RenderResult, RenderedField, RenderedValue,
    Renderer, ResolvedExternal, TypeInformation, ViewMode,
};
pub use types::TypeManager;

/// Store collection names, one per entity kind.
pub mod collections {
    pub const TYPES: &str = "framework.types";
    pub const OBJECTS: &str = "framework.objects";
    pub const LOGS: &str = "framework.logs";
}
