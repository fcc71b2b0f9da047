//!
//! Audit events.
//!
//! Events are the outcome of successful mutating requests and represent committed state changes.
//! They are appended to [`crate::store::Store::audit_log`] and never rewritten.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::{Action, RecordId, ResourceKind};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub at: DateTime<Utc>,
    /// Employee that issued the request; `None` for principals without an account.
    pub actor: Option<RecordId>,
    /// `Add`, `Change` or `Delete`.
    pub action: Action,
    pub resource: ResourceKind,
    pub record: RecordId,
}

impl AuditEvent {
    pub fn new(at: DateTime<Utc>, actor: Option<RecordId>, action: Action, resource: ResourceKind, record: RecordId) -> Self {
        AuditEvent { id: Uuid::new_v4(), at, actor, action, resource, record }
    }
}
