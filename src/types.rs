//! Shared value types used across the access layer, the domain models and the store.

use std::fmt;
use std::str::FromStr;

/// Primary key of a stored record. Allocated per table, starting at 1 and never reused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The resource kinds managed by the back office.
///
/// `codename()` is the stem used in permission identifiers (`view_<codename>`)
/// and must stay stable: role definitions and stored grants refer to it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Client,
    Interaction,
    Supplier,
    Destination,
    Product,
    Package,
    PaymentMethod,
    Reservation,
    Employee,
    Position,
    Role,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 11] = [
        ResourceKind::Client,
        ResourceKind::Interaction,
        ResourceKind::Supplier,
        ResourceKind::Destination,
        ResourceKind::Product,
        ResourceKind::Package,
        ResourceKind::PaymentMethod,
        ResourceKind::Reservation,
        ResourceKind::Employee,
        ResourceKind::Position,
        ResourceKind::Role,
    ];

    pub fn codename(self) -> &'static str {
        match self {
            ResourceKind::Client => "client",
            ResourceKind::Interaction => "interaction",
            ResourceKind::Supplier => "supplier",
            ResourceKind::Destination => "destination",
            ResourceKind::Product => "product",
            ResourceKind::Package => "package",
            ResourceKind::PaymentMethod => "paymentmethod",
            ResourceKind::Reservation => "reservation",
            ResourceKind::Employee => "employee",
            ResourceKind::Position => "position",
            ResourceKind::Role => "role",
        }
    }

    /// Human-readable singular name, used in flash messages and page titles.
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Client => "Client",
            ResourceKind::Interaction => "Interaction",
            ResourceKind::Supplier => "Supplier",
            ResourceKind::Destination => "Destination",
            ResourceKind::Product => "Product",
            ResourceKind::Package => "Package",
            ResourceKind::PaymentMethod => "Payment method",
            ResourceKind::Reservation => "Reservation",
            ResourceKind::Employee => "Employee",
            ResourceKind::Position => "Position",
            ResourceKind::Role => "Role",
        }
    }

    /// URL segment and route namespace (`clients`, `payment-methods`, ...).
    pub fn slug(self) -> &'static str {
        match self {
            ResourceKind::Client => "clients",
            ResourceKind::Interaction => "interactions",
            ResourceKind::Supplier => "suppliers",
            ResourceKind::Destination => "destinations",
            ResourceKind::Product => "products",
            ResourceKind::Package => "packages",
            ResourceKind::PaymentMethod => "payment-methods",
            ResourceKind::Reservation => "reservations",
            ResourceKind::Employee => "employees",
            ResourceKind::Position => "positions",
            ResourceKind::Role => "roles",
        }
    }

    pub fn from_codename(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.codename() == s)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codename())
    }
}

/// The four CRUD actions a permission can grant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Add,
    Change,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::View, Action::Add, Action::Change, Action::Delete];

    pub fn codename(self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Add => "add",
            Action::Change => "change",
            Action::Delete => "delete",
        }
    }

    pub fn from_codename(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.codename() == s)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codename())
    }
}

/// Fixed-point amount with two decimal places, stored as cents.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Largest amount representable with 10 digits and 2 decimals.
    pub const MAX: Money = Money(9_999_999_999);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid amount: {0:?}")]
pub struct ParseMoneyError(pub String);

impl FromStr for Money {
    type Err = ParseMoneyError;

    /// Accepts `123`, `123.4` and `123.45`, with an optional leading `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMoneyError(s.to_string());
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty()
            || frac.len() > 2
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(err());
        }
        let whole: i64 = whole.parse().map_err(|_| err())?;
        let frac_cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| err())? * 10,
            _ => frac.parse().map_err(|_| err())?,
        };
        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac_cents))
            .ok_or_else(err)?;
        Ok(Money(if negative { -cents } else { cents }))
    }
}
