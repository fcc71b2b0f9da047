//! Access-control related modules (permissions, principals, the guard, sessions).

pub mod guard;
pub mod permission;
pub mod principal;
pub mod roles;
pub mod session;

pub use guard::{authorize, authorize_resolved, AccessGuard, Decision, ProtectedOperation};
pub use permission::{PermissionId, PermissionSet};
pub use principal::{Anonymous, Caller, Principal, User};
pub use session::{SessionStore, SessionToken};
// Also expose the rights algebra under a shorter path.
pub use crate::rights;
