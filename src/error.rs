//!
//! Defines error types for the back office.
//!
//! A guard denial is not an error: it is a `Response::Redirect`. Errors cover
//! lookups of missing records, rejected form input, invalid pagination,
//! persistence and configuration failures.

use std::collections::BTreeMap;
use std::fmt;

use crate::types::{RecordId, ResourceKind};

/// Failures while turning a session into a principal.
///
/// The dispatcher never surfaces these to the caller; it treats the request
/// as anonymous, which the guard turns into a redirect to the login route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The session token is not known to the session store.
    #[error("Unknown or expired session")]
    UnknownSession,
    /// The session points at an employee record that no longer exists.
    #[error("Session principal {0} no longer exists")]
    PrincipalMissing(RecordId),
    /// The employee account has been deactivated.
    #[error("Employee {0} is inactive")]
    Inactive(RecordId),
}

/// Field-level validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[String])> {
        self.fields.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// `Ok(())` when no message was recorded.
    pub fn into_result(self) -> Result<(), BackofficeError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(BackofficeError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Errors returned by back-office operations.
#[derive(Debug, thiserror::Error)]
pub enum BackofficeError {
    #[error("{resource} {id} not found")]
    NotFound { resource: ResourceKind, id: RecordId },
    #[error("Invalid input: {0}")]
    Validation(ValidationErrors),
    #[error("Invalid page: {0}")]
    InvalidPage(u32),
    #[error("Authentication failed: {0}")]
    Authentication(#[from] AuthError),
    #[error("Snapshot encoding failed: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BackofficeError {
    pub fn not_found(resource: ResourceKind, id: RecordId) -> Self {
        BackofficeError::NotFound { resource, id }
    }

    /// Single-field validation failure.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        BackofficeError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_collect_per_field() {
        let mut errors = ValidationErrors::new();
        assert!(errors.clone().into_result().is_ok());
        errors.add("email", "Enter a valid email address.");
        errors.add("email", "A client with this email already exists.");
        errors.add("name", "This field is required.");
        assert_eq!(errors.field("email").len(), 2);
        assert!(errors.has("name"));
        assert!(errors.field("phone").is_empty());
        assert_eq!(
            errors.to_string(),
            "email: Enter a valid email address.; email: A client with this email already exists.; name: This field is required."
        );
        assert!(matches!(errors.into_result(), Err(BackofficeError::Validation(_))));
    }
}
