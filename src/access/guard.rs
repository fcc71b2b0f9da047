//! The access guard.
//!
//! Every request is described by a [`ProtectedOperation`] carrying the one
//! permission it requires (or none). [`AccessGuard::check`] turns a principal
//! and an operation into a [`Decision`] before any record is read or written.

use crate::access::permission::PermissionId;
use crate::access::principal::Principal;
use crate::error::AuthError;
use crate::routes::Route;
use crate::types::{Action, ResourceKind};

/// Navigation decision produced by the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Proceed,
    RedirectToLogin,
    RedirectToDenied,
}

impl Decision {
    pub fn is_proceed(self) -> bool {
        matches!(self, Decision::Proceed)
    }

    /// Route the dispatcher redirects to, or `None` to continue.
    pub fn redirect(self) -> Option<Route> {
        match self {
            Decision::Proceed => None,
            Decision::RedirectToLogin => Some(Route::Login),
            Decision::RedirectToDenied => Some(Route::AccessDenied),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Proceed => "proceed",
            Decision::RedirectToLogin => "redirect_to_login",
            Decision::RedirectToDenied => "redirect_to_denied",
        }
    }
}

/// Decides whether `principal` may perform an operation requiring `required`.
pub fn authorize<P: Principal + ?Sized>(principal: &P, required: Option<&PermissionId>) -> Decision {
    if !principal.is_authenticated() {
        return Decision::RedirectToLogin;
    }
    if principal.is_superuser() {
        return Decision::Proceed;
    }
    match required {
        None => Decision::Proceed,
        Some(perm) if principal.has_permission(perm) => Decision::Proceed,
        Some(_) => Decision::RedirectToDenied,
    }
}

/// Like [`authorize`], but for a principal that may have failed to resolve.
/// A resolution failure is treated as an unauthenticated request.
pub fn authorize_resolved<P: Principal>(
    principal: Result<&P, &AuthError>,
    required: Option<&PermissionId>,
) -> Decision {
    match principal {
        Ok(p) => authorize(p, required),
        Err(_) => Decision::RedirectToLogin,
    }
}

/// Static configuration of one protected operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectedOperation {
    /// Route that serves the operation.
    pub route: Route,
    /// Permission the caller must hold, `None` for any authenticated caller.
    pub required: Option<PermissionId>,
}

impl ProtectedOperation {
    /// An operation open to every authenticated principal.
    pub const fn open(route: Route) -> Self {
        ProtectedOperation { route, required: None }
    }

    pub const fn requiring(route: Route, perm: PermissionId) -> Self {
        ProtectedOperation { route, required: Some(perm) }
    }

    /// The conventional CRUD operation: `action` on `resource`, requiring `<action>_<resource>`.
    pub fn crud(resource: ResourceKind, action: Action) -> Self {
        let route = match action {
            Action::View => Route::List(resource),
            Action::Add => Route::Create(resource),
            Action::Change => Route::Update(resource),
            Action::Delete => Route::Delete(resource),
        };
        Self::requiring(route, PermissionId::new(action, resource))
    }
}

/// Applies [`authorize`] to a configured operation and logs the outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessGuard;

impl AccessGuard {
    pub fn check<P: Principal + ?Sized>(&self, principal: &P, op: &ProtectedOperation) -> Decision {
        let decision = authorize(principal, op.required.as_ref());
        match decision {
            Decision::Proceed => tracing::debug!(
                route = %op.route.name(),
                employee = ?principal.employee_id(),
                "access granted"
            ),
            _ => tracing::info!(
                route = %op.route.name(),
                required = ?op.required.map(|p| p.to_string()),
                employee = ?principal.employee_id(),
                decision = decision.as_str(),
                "access refused"
            ),
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::permission::PermissionSet;
    use crate::access::principal::{Anonymous, User};
    use crate::types::RecordId;

    fn perm(s: &str) -> PermissionId {
        s.parse().unwrap()
    }

    fn staff(perms: &[&str]) -> User {
        User {
            id: RecordId(7),
            email: "staff@agency.test".into(),
            superuser: false,
            permissions: perms.iter().map(|p| perm(p)).collect(),
        }
    }

    #[test]
    fn anonymous_is_sent_to_login() {
        assert_eq!(authorize(&Anonymous, Some(&perm("view_client"))), Decision::RedirectToLogin);
        assert_eq!(authorize(&Anonymous, None), Decision::RedirectToLogin);
    }

    #[test]
    fn superuser_bypasses_permissions() {
        let root = User {
            id: RecordId(1),
            email: "root@agency.test".into(),
            superuser: true,
            permissions: PermissionSet::new(),
        };
        assert_eq!(authorize(&root, Some(&perm("delete_package"))), Decision::Proceed);
    }

    #[test]
    fn open_operations_admit_any_authenticated_user() {
        assert_eq!(authorize(&staff(&[]), None), Decision::Proceed);
    }

    #[test]
    fn missing_permission_is_denied() {
        let user = staff(&["view_client"]);
        assert_eq!(authorize(&user, Some(&perm("add_client"))), Decision::RedirectToDenied);
        assert_eq!(authorize(&user, Some(&perm("view_client"))), Decision::Proceed);
    }

    #[test]
    fn resolution_failure_collapses_to_login() {
        let err = AuthError::UnknownSession;
        assert_eq!(
            authorize_resolved::<User>(Err(&err), Some(&perm("view_client"))),
            Decision::RedirectToLogin
        );
        let user = staff(&["view_client"]);
        assert_eq!(authorize_resolved(Ok(&user), Some(&perm("view_client"))), Decision::Proceed);
    }

    #[test]
    fn decisions_map_to_routes() {
        assert_eq!(Decision::Proceed.redirect(), None);
        assert_eq!(Decision::RedirectToLogin.redirect(), Some(Route::Login));
        assert_eq!(Decision::RedirectToDenied.redirect(), Some(Route::AccessDenied));
    }

    #[test]
    fn crud_operations_follow_naming_convention() {
        let op = ProtectedOperation::crud(ResourceKind::Package, Action::Delete);
        assert_eq!(op.required.unwrap().to_string(), "delete_package");
        assert_eq!(op.route, Route::Delete(ResourceKind::Package));
        assert_eq!(ProtectedOperation::open(Route::Index).required, None);
    }
}
