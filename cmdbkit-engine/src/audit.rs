//! The append-only audit trail.
//!
//! Each mutating operation on an object produces one entry carrying a full
//! render snapshot. Writing the trail is best-effort by policy: a failed
//! insert is warned about and reported as [`AuditStatus::Degraded`], and the
//! primary mutation stands.

use crate::collections;
use crate::{EngineError, EngineResult};
use chrono::Utc;
use cmdbkit_model::{AuditLogEntry, LogAction, LogKind};
use cmdbkit_store::{DocumentStore, Filter, Sort};
use cmdbkit_types::{PublicId, Version};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// What happened to the audit entry of a mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditStatus {
    /// The entry was persisted under the given log public id.
    Recorded(PublicId),
    /// The insert failed; the mutation itself succeeded. Details went to the
    /// warning log.
    Degraded,
}

impl AuditStatus {
    #[must_use]
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded(_))
    }
}

/// Everything a new entry records about one mutating action.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub action: LogAction,
    pub object_id: PublicId,
    pub version: Version,
    pub user_id: PublicId,
    pub user_name: String,
    pub render_state: Option<Value>,
    pub changes: Option<Value>,
    pub comment: Option<String>,
}

/// Append-only log over the store's log collection.
pub struct AuditTrail {
    store: Arc<DocumentStore>,
}

impl AuditTrail {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Persists one entry, minting its public id from the log counter and
    /// stamping `log_time` with the current UTC time.
    pub fn record(&self, event: AuditEvent) -> EngineResult<PublicId> {
        let public_id = self.store.get_new_public_id(collections::LOGS)?;
        let entry = AuditLogEntry {
            public_id,
            log_kind: LogKind::ObjectLog,
            action: event.action,
            user_id: event.user_id,
            user_name: event.user_name,
            log_time: Utc::now(),
            object_id: event.object_id,
            version: event.version,
            render_state: event.render_state,
            changes: event.changes,
            comment: event.comment,
        };
        let doc = serde_json::to_value(&entry)
            .map_err(|e| EngineError::Render(format!("audit snapshot serialization: {e}")))?;
        self.store.insert(collections::LOGS, public_id, &doc)?;
        Ok(public_id)
    }

    /// [`record`](Self::record), with failures downgraded to
    /// [`AuditStatus::Degraded`].
    pub fn record_best_effort(&self, event: AuditEvent) -> AuditStatus {
        let object_id = event.object_id;
        let action = event.action;
        match self.record(event) {
            Ok(id) => AuditStatus::Recorded(id),
            Err(e) => {
                warn!(%object_id, ?action, error = %e, "audit entry dropped");
                AuditStatus::Degraded
            }
        }
    }

    /// All entries for one object, oldest first.
    pub fn get_logs_for_object(&self, object_id: PublicId) -> EngineResult<Vec<AuditLogEntry>> {
        self.get_logs_by(&Filter::new().eq("object_id", object_id.value()))
    }

    /// Entries matching an arbitrary store filter, oldest first.
    pub fn get_logs_by(&self, filter: &Filter) -> EngineResult<Vec<AuditLogEntry>> {
        let (docs, _) =
            self.store
                .get_many(collections::LOGS, filter, &Sort::default(), 0, None)?;
        let mut entries = Vec::with_capacity(docs.len());
        for doc in docs {
            let entry: AuditLogEntry = serde_json::from_value(doc)
                .map_err(|e| EngineError::Render(format!("corrupt audit entry: {e}")))?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Number of entries in the trail.
    pub fn count(&self) -> EngineResult<usize> {
        Ok(self.store.count(collections::LOGS, &Filter::new())?)
    }

    /// Removes one entry. This is the only way an entry ever disappears and
    /// callers are expected to gate it behind a separate permission.
    pub fn delete_log(&self, public_id: PublicId) -> EngineResult<()> {
        self.store.delete(collections::LOGS, public_id)?;
        Ok(())
    }
}
