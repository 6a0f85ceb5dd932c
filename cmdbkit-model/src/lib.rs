//! Schema model for cmdbkit.
//!
//! Defines the documents the engine operates on:
//! - [`TypeSchema`] — a runtime-authored type: fields, sections, summaries,
//!   external links, ACL policy
//! - [`Object`] — a stored instance conforming to a `TypeSchema`
//! - [`FieldValue`] — the tagged value variants carried by object fields,
//!   resolved against the owning schema at the read boundary
//! - [`TypeAcl`] — the allow-list access-control evaluator
//! - [`AuditLogEntry`] — the append-only record of a mutating operation
//!
//! Everything here is plain data plus local logic: no storage handles, no
//! I/O. Persistence and rendering live in `cmdbkit-store` and
//! `cmdbkit-engine`.

mod acl;
mod audit;
mod error;
mod field;
mod object;
mod type_schema;

pub use acl::{AclGroups, Permission, TypeAcl};
pub use audit::{AuditLogEntry, LogAction, LogKind};
pub use error::{ModelError, ModelResult};
pub use field::{FieldDef, FieldEntry, FieldKind, FieldValue, RefSummary, SectionReference};
pub use object::{validate_required_keys, Object};
pub use type_schema::{ExternalLink, RenderMeta, Section, Summary, TypeSchema};
