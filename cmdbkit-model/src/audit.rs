//! The append-only audit record.
//!
//! Every mutating operation on an object produces exactly one
//! [`AuditLogEntry`], carrying a full render snapshot for forensic replay.
//! Entries are never mutated; deletion happens only through the explicit,
//! separately-permissioned delete operation on the audit trail.

use chrono::{DateTime, Utc};
use cmdbkit_types::{PublicId, Version};
use serde::{Deserialize, Serialize};

/// Which log family an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogKind {
    ObjectLog,
    JobLog,
}

/// The mutating action an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogAction {
    Create,
    Edit,
    Delete,
    ActiveChange,
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub public_id: PublicId,
    pub log_kind: LogKind,
    pub action: LogAction,
    pub user_id: PublicId,
    pub user_name: String,
    pub log_time: DateTime<Utc>,
    pub object_id: PublicId,
    /// The object's version at the time of the action.
    pub version: Version,
    /// Serialized render snapshot of the object as it looked for this action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_state: Option<serde_json::Value>,
    /// Field diff of the action, when one applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}
