//! Permission identifiers and the capability set a principal carries.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::rights::{self, ActionMask};
use crate::types::{Action, ResourceKind};

/// Names one action on one resource kind, written `<action>_<resource>`
/// (`view_client`, `delete_package`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PermissionId {
    pub action: Action,
    pub resource: ResourceKind,
}

impl PermissionId {
    pub const fn new(action: Action, resource: ResourceKind) -> Self {
        PermissionId { action, resource }
    }

    /// Every identifier the back office knows about.
    pub fn catalog() -> impl Iterator<Item = PermissionId> {
        ResourceKind::ALL
            .into_iter()
            .flat_map(|r| Action::ALL.into_iter().map(move |a| PermissionId::new(a, r)))
    }

    /// Parses a codename, accepting an `<app_label>.` prefix when it matches `app_label`.
    pub fn parse_qualified(s: &str, app_label: &str) -> Result<Self, ParsePermissionError> {
        match s.split_once('.') {
            Some((label, codename)) if label == app_label => codename.parse(),
            Some(_) => Err(ParsePermissionError(s.to_string())),
            None => s.parse(),
        }
    }
}

impl fmt::Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.action, self.resource)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission {0:?}")]
pub struct ParsePermissionError(pub String);

impl FromStr for PermissionId {
    type Err = ParsePermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (action, resource) = s
            .split_once('_')
            .ok_or_else(|| ParsePermissionError(s.to_string()))?;
        match (Action::from_codename(action), ResourceKind::from_codename(resource)) {
            (Some(action), Some(resource)) => Ok(PermissionId::new(action, resource)),
            _ => Err(ParsePermissionError(s.to_string())),
        }
    }
}

impl serde::Serialize for PermissionId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for PermissionId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The set of permissions granted to a principal, stored as one action mask
/// per resource kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(into = "Vec<PermissionId>", from = "Vec<PermissionId>")]
pub struct PermissionSet {
    masks: BTreeMap<ResourceKind, ActionMask>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants every action on every resource kind.
    pub fn full() -> Self {
        let masks = ResourceKind::ALL
            .into_iter()
            .map(|r| (r, rights::core::ALL))
            .collect();
        PermissionSet { masks }
    }

    pub fn insert(&mut self, perm: PermissionId) {
        *self.masks.entry(perm.resource).or_insert(0) |= rights::bit(perm.action);
    }

    /// Grants all actions in `mask` on `resource`.
    pub fn grant(&mut self, resource: ResourceKind, mask: ActionMask) {
        let mask = mask & rights::core::ALL;
        if mask != 0 {
            *self.masks.entry(resource).or_insert(0) |= mask;
        }
    }

    pub fn contains(&self, perm: &PermissionId) -> bool {
        self.masks
            .get(&perm.resource)
            .is_some_and(|have| rights::sufficient(*have, rights::bit(perm.action)))
    }

    pub fn mask(&self, resource: ResourceKind) -> ActionMask {
        self.masks.get(&resource).copied().unwrap_or(0)
    }

    pub fn extend_from(&mut self, other: &PermissionSet) {
        for (resource, mask) in &other.masks {
            self.grant(*resource, *mask);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.masks.values().all(|m| *m == 0)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Permissions in catalog order (resource, then action).
    pub fn iter(&self) -> impl Iterator<Item = PermissionId> + '_ {
        self.masks
            .iter()
            .flat_map(|(r, m)| rights::actions_in(*m).map(move |a| PermissionId::new(a, *r)))
    }
}

impl FromIterator<PermissionId> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = PermissionId>>(iter: I) -> Self {
        let mut set = PermissionSet::new();
        for perm in iter {
            set.insert(perm);
        }
        set
    }
}

impl From<Vec<PermissionId>> for PermissionSet {
    fn from(perms: Vec<PermissionId>) -> Self {
        perms.into_iter().collect()
    }
}

impl From<PermissionSet> for Vec<PermissionId> {
    fn from(set: PermissionSet) -> Self {
        set.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codenames() {
        let perm: PermissionId = "view_client".parse().unwrap();
        assert_eq!(perm, PermissionId::new(Action::View, ResourceKind::Client));
        let perm: PermissionId = "delete_paymentmethod".parse().unwrap();
        assert_eq!(perm, PermissionId::new(Action::Delete, ResourceKind::PaymentMethod));
        assert_eq!(perm.to_string(), "delete_paymentmethod");
    }

    #[test]
    fn rejects_unknown_codenames() {
        for bad in ["", "view", "view_", "_client", "read_client", "view_cliente", "view_client_extra"] {
            assert!(bad.parse::<PermissionId>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn qualified_names_must_match_app_label() {
        let perm = PermissionId::parse_qualified("core.add_package", "core").unwrap();
        assert_eq!(perm, PermissionId::new(Action::Add, ResourceKind::Package));
        assert!(PermissionId::parse_qualified("auth.add_package", "core").is_err());
        assert!(PermissionId::parse_qualified("add_package", "core").is_ok());
    }

    #[test]
    fn catalog_covers_every_pair() {
        assert_eq!(PermissionId::catalog().count(), 44);
        assert_eq!(PermissionSet::full().len(), 44);
    }

    #[test]
    fn set_membership() {
        let set: PermissionSet = ["view_client", "add_client", "view_package"]
            .iter()
            .map(|s| s.parse::<PermissionId>().unwrap())
            .collect();
        assert!(set.contains(&"view_client".parse().unwrap()));
        assert!(set.contains(&"add_client".parse().unwrap()));
        assert!(!set.contains(&"change_client".parse().unwrap()));
        assert!(!set.contains(&"view_product".parse().unwrap()));
        assert_eq!(set.len(), 3);
        assert!(!set.is_empty());
        assert!(PermissionSet::new().is_empty());
    }

    #[test]
    fn serializes_as_codename_list() {
        let set: PermissionSet = vec![
            PermissionId::new(Action::Delete, ResourceKind::Client),
            PermissionId::new(Action::View, ResourceKind::Client),
        ]
        .into();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["view_client","delete_client"]"#);
        let back: PermissionSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
        assert!(serde_json::from_str::<PermissionSet>(r#"["fly_client"]"#).is_err());
    }
}
