//! The requesting actor, as seen by the access guard.

use crate::access::permission::{PermissionId, PermissionSet};
use crate::types::RecordId;

/// Capability surface the guard consumes from the authentication collaborator.
pub trait Principal {
    fn is_authenticated(&self) -> bool;
    fn is_superuser(&self) -> bool;
    fn has_permission(&self, perm: &PermissionId) -> bool;

    /// Employee record backing this principal, if any. Used to default the
    /// employee on reservations and interactions.
    fn employee_id(&self) -> Option<RecordId> {
        None
    }
}

/// A request without a valid session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Anonymous;

impl Principal for Anonymous {
    fn is_authenticated(&self) -> bool {
        false
    }

    fn is_superuser(&self) -> bool {
        false
    }

    fn has_permission(&self, _perm: &PermissionId) -> bool {
        false
    }
}

/// An authenticated employee with its effective permissions resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: RecordId,
    pub email: String,
    pub superuser: bool,
    pub permissions: PermissionSet,
}

impl Principal for User {
    fn is_authenticated(&self) -> bool {
        true
    }

    fn is_superuser(&self) -> bool {
        self.superuser
    }

    fn has_permission(&self, perm: &PermissionId) -> bool {
        self.permissions.contains(perm)
    }

    fn employee_id(&self) -> Option<RecordId> {
        Some(self.id)
    }
}

/// Outcome of session resolution: either a user or nobody.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    User(User),
}

impl Principal for Caller {
    fn is_authenticated(&self) -> bool {
        matches!(self, Caller::User(_))
    }

    fn is_superuser(&self) -> bool {
        match self {
            Caller::User(u) => u.is_superuser(),
            Caller::Anonymous => false,
        }
    }

    fn has_permission(&self, perm: &PermissionId) -> bool {
        match self {
            Caller::User(u) => u.has_permission(perm),
            Caller::Anonymous => false,
        }
    }

    fn employee_id(&self) -> Option<RecordId> {
        match self {
            Caller::User(u) => u.employee_id(),
            Caller::Anonymous => None,
        }
    }
}
