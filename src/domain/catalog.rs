//! Catalog records: suppliers, destinations, products, packages and payment methods.

use std::collections::BTreeSet;
use std::fmt;

use crate::types::{Money, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SupplierKind {
    Airline,
    Hotel,
    Transport,
    Other,
}

impl SupplierKind {
    pub fn label(self) -> &'static str {
        match self {
            SupplierKind::Airline => "Airline",
            SupplierKind::Hotel => "Hotel",
            SupplierKind::Transport => "Transport",
            SupplierKind::Other => "Other",
        }
    }
}

/// Ordered by name in listings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Supplier {
    pub id: RecordId,
    pub name: String,
    pub kind: SupplierKind,
    /// Unique across suppliers.
    pub contact: String,
}

/// Ordered by country, then name. `(name, country)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Destination {
    pub id: RecordId,
    pub name: String,
    pub country: String,
    pub description: Option<String>,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.name, self.country)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum ProductKind {
    Flight,
    Hotel,
    Tour,
    Other,
}

impl ProductKind {
    pub fn label(self) -> &'static str {
        match self {
            ProductKind::Flight => "Flight",
            ProductKind::Hotel => "Hotel",
            ProductKind::Tour => "Tour",
            ProductKind::Other => "Other",
        }
    }
}

/// Listed by kind label, then name. Deleted along with its supplier or destination.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Product {
    pub id: RecordId,
    pub name: String,
    pub kind: ProductKind,
    pub supplier: RecordId,
    pub destination: RecordId,
    pub base_price: Money,
}

/// A sellable bundle of products. Ordered by name.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Package {
    pub id: RecordId,
    pub name: String,
    pub products: BTreeSet<RecordId>,
    pub final_price: Money,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PaymentMethod {
    pub id: RecordId,
    pub name: String,
    pub description: Option<String>,
}
