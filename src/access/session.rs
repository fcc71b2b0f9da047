//! Session tokens and their resolution into principals.
//!
//! Credential checking happens outside this crate. Once an employee has
//! logged in, the caller opens a session and presents its token on every
//! request; the token is resolved against the current store so permission
//! and activity changes take effect immediately.

use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

use crate::access::principal::User;
use crate::error::{AuthError, BackofficeError};
use crate::store::Store;
use crate::types::{RecordId, ResourceKind};

/// Opaque session handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SessionToken(Uuid);

impl SessionToken {
    fn generate() -> Self {
        SessionToken(Uuid::new_v4())
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: HashMap<SessionToken, RecordId>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session for an active employee.
    pub fn open(&mut self, store: &Store, employee: RecordId) -> Result<SessionToken, BackofficeError> {
        let row = store
            .employees
            .get(employee)
            .ok_or(BackofficeError::not_found(ResourceKind::Employee, employee))?;
        if !row.is_active {
            return Err(AuthError::Inactive(employee).into());
        }
        let token = SessionToken::generate();
        self.sessions.insert(token, employee);
        tracing::info!(employee = %employee, "session opened");
        Ok(token)
    }

    /// Ends a session. Returns whether it existed.
    pub fn close(&mut self, token: &SessionToken) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Drops every session of an employee.
    pub fn close_all(&mut self, employee: RecordId) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, e| *e != employee);
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Builds the principal behind `token` from the current store.
    pub fn resolve(&self, store: &Store, token: &SessionToken) -> Result<User, AuthError> {
        let employee = *self.sessions.get(token).ok_or(AuthError::UnknownSession)?;
        let row = store.employees.get(employee).ok_or(AuthError::PrincipalMissing(employee))?;
        if !row.is_active {
            return Err(AuthError::Inactive(employee));
        }
        let permissions = store
            .effective_permissions(employee)
            .ok_or(AuthError::PrincipalMissing(employee))?;
        Ok(User {
            id: employee,
            email: row.email.clone(),
            superuser: row.is_superuser,
            permissions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::principal::Principal;
    use chrono::{TimeZone, Utc};

    fn store_with_employee() -> (Store, RecordId) {
        let mut store = Store::default();
        let now = Utc.with_ymd_and_hms(2026, 2, 2, 8, 0, 0).unwrap();
        let id = store.create_user("desk@agency.test", "Desk", now).unwrap();
        (store, id)
    }

    #[test]
    fn resolves_current_permissions() {
        let (mut store, id) = store_with_employee();
        let mut sessions = SessionStore::new();
        let token = sessions.open(&store, id).unwrap();

        let user = sessions.resolve(&store, &token).unwrap();
        assert!(user.permissions.is_empty());

        let perm = "view_client".parse().unwrap();
        store.grant(id, perm).unwrap();
        let user = sessions.resolve(&store, &token).unwrap();
        assert!(user.has_permission(&perm));
        assert!(!user.is_superuser());
    }

    #[test]
    fn resolution_failures() {
        let (mut store, id) = store_with_employee();
        let mut sessions = SessionStore::new();
        let token = sessions.open(&store, id).unwrap();

        store.employees.get_mut(id).unwrap().is_active = false;
        assert_eq!(sessions.resolve(&store, &token), Err(AuthError::Inactive(id)));

        store.delete(ResourceKind::Employee, id).unwrap();
        assert_eq!(sessions.resolve(&store, &token), Err(AuthError::PrincipalMissing(id)));

        assert!(sessions.close(&token));
        assert_eq!(sessions.resolve(&store, &token), Err(AuthError::UnknownSession));
    }

    #[test]
    fn inactive_employee_cannot_open_session() {
        let (mut store, id) = store_with_employee();
        store.employees.get_mut(id).unwrap().is_active = false;
        let err = SessionStore::new().open(&store, id).unwrap_err();
        assert!(matches!(err, BackofficeError::Authentication(AuthError::Inactive(_))));
    }

    #[test]
    fn close_all_drops_every_session_of_employee() {
        let (store, id) = store_with_employee();
        let mut sessions = SessionStore::new();
        sessions.open(&store, id).unwrap();
        sessions.open(&store, id).unwrap();
        assert_eq!(sessions.close_all(id), 2);
        assert!(sessions.is_empty());
    }
}
