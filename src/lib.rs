#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(deprecated)]

//!
//! Voyage-Core is the back office of a travel agency: clients and their
//! interactions, the supplier/destination/product/package catalog,
//! reservations, payment methods and staff.
//!
//! Every request passes through one access guard before any record is read
//! or written. Anonymous callers are sent to the login route, superusers
//! always proceed, and everyone else needs the single `<action>_<resource>`
//! permission the request names.

// Shared identifiers: record ids, resource kinds, actions, money.
pub mod types;

// Rights algebra over per-resource action masks.
pub mod rights;

pub mod error;

pub mod routes;

// Permissions, principals, the guard, sessions and role bootstrap.
pub mod access;

// Entities and their forms.
pub mod domain;

pub mod store;

pub mod events;

pub mod time;

pub mod config;

// Request dispatch.
pub mod kernel;

#[cfg(feature = "logging")]
pub mod logging;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use access::guard::{authorize, AccessGuard, Decision, ProtectedOperation};
pub use access::permission::{PermissionId, PermissionSet};
pub use access::principal::{Anonymous, Caller, Principal, User};
pub use access::session::{SessionStore, SessionToken};
pub use config::BackofficeConfig;
pub use error::{AuthError, BackofficeError, ValidationErrors};
pub use kernel::{Backoffice, Request, Response};
pub use routes::Route;
pub use store::Store;
pub use types::{Action, Money, RecordId, ResourceKind};
