//! Employees (the principals of the back office), their positions and roles.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::access::permission::PermissionSet;
use crate::types::RecordId;

/// Job position within the agency (sales advisor, manager, ...).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub id: RecordId,
    pub name: String,
    pub description: Option<String>,
}

/// A named group of permissions assigned to employees.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Role {
    pub id: RecordId,
    /// Unique across roles.
    pub name: String,
    pub permissions: PermissionSet,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Employee {
    pub id: RecordId,
    /// Normalized with [`normalize_email`]; unique across employees.
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Cleared when the position is deleted.
    pub position: Option<RecordId>,
    pub roles: BTreeSet<RecordId>,
    /// Granted directly, on top of role permissions.
    pub permissions: PermissionSet,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: NaiveDate,
}

/// Lowercases the domain part of an address, leaving the local part intact.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}
