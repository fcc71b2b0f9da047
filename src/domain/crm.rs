//! Customer relationship records: clients and the interactions logged with them.

use chrono::{DateTime, Utc};

use crate::types::RecordId;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Client {
    pub id: RecordId,
    pub name: String,
    /// Unique across clients.
    pub email: String,
    /// Exactly ten digits when present.
    pub phone: Option<String>,
    pub address: Option<String>,
    pub preferences: Option<String>,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum InteractionKind {
    #[default]
    Call,
    Email,
    Meeting,
}

impl InteractionKind {
    pub fn label(self) -> &'static str {
        match self {
            InteractionKind::Call => "Call",
            InteractionKind::Email => "Email",
            InteractionKind::Meeting => "Meeting",
        }
    }
}

/// A contact between an employee and a client. Listed newest first.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Interaction {
    pub id: RecordId,
    pub client: RecordId,
    pub employee: RecordId,
    pub kind: InteractionKind,
    pub at: DateTime<Utc>,
    pub notes: Option<String>,
}
