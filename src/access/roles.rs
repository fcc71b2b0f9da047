//! Built-in roles and the idempotent bootstrap that installs them.

use std::collections::BTreeSet;

use crate::access::permission::{PermissionId, PermissionSet};
use crate::domain::staff::Role;
use crate::store::Store;
use crate::types::{Action, ResourceKind};

/// A role as written in configuration: a name and permission names, each
/// either bare (`view_client`) or app-qualified (`core.view_client`).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoleDefinition {
    pub name: String,
    pub permissions: Vec<String>,
}

impl RoleDefinition {
    fn from_perms(name: &str, perms: impl IntoIterator<Item = PermissionId>) -> Self {
        RoleDefinition {
            name: name.to_string(),
            permissions: perms.into_iter().map(|p| p.to_string()).collect(),
        }
    }
}

const CATALOG: [ResourceKind; 8] = [
    ResourceKind::Client,
    ResourceKind::Supplier,
    ResourceKind::Destination,
    ResourceKind::Product,
    ResourceKind::Package,
    ResourceKind::Reservation,
    ResourceKind::PaymentMethod,
    ResourceKind::Interaction,
];

fn crud(resources: &[ResourceKind]) -> impl Iterator<Item = PermissionId> + '_ {
    resources
        .iter()
        .flat_map(|r| Action::ALL.into_iter().map(move |a| PermissionId::new(a, *r)))
}

/// Sales Advisor, Manager and Administrator.
pub fn builtin_roles() -> Vec<RoleDefinition> {
    use Action::*;
    use ResourceKind::*;

    let advisor = [
        (View, Client),
        (Add, Client),
        (Change, Client),
        (View, Package),
        (View, Product),
        (View, Destination),
        (View, Supplier),
        (View, Reservation),
        (Add, Reservation),
        (View, Interaction),
        (Add, Interaction),
    ]
    .map(|(a, r)| PermissionId::new(a, r));

    vec![
        RoleDefinition::from_perms("Sales Advisor", advisor),
        RoleDefinition::from_perms("Manager", crud(&CATALOG)),
        RoleDefinition::from_perms("Administrator", crud(&CATALOG).chain(crud(&[Employee, Position]))),
    ]
}

/// Outcome of [`bootstrap_roles`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Names of the roles created or updated, in definition order.
    pub updated: Vec<String>,
    /// Permission names that did not resolve to a known permission.
    pub missing: BTreeSet<String>,
}

/// Creates each role or replaces its permission set. Unknown permission
/// names are skipped and reported.
pub fn bootstrap_roles(store: &mut Store, definitions: &[RoleDefinition], app_label: &str) -> BootstrapReport {
    let mut report = BootstrapReport::default();
    for def in definitions {
        let mut permissions = PermissionSet::new();
        for name in &def.permissions {
            match PermissionId::parse_qualified(name.trim(), app_label) {
                Ok(perm) => permissions.insert(perm),
                Err(_) => {
                    report.missing.insert(name.clone());
                }
            }
        }

        let existing = store.roles.values().find(|r| r.name == def.name).map(|r| r.id);
        match existing {
            Some(id) => {
                if let Some(role) = store.roles.get_mut(id) {
                    role.permissions = permissions;
                }
            }
            None => {
                store.roles.insert_with(|id| Role { id, name: def.name.clone(), permissions });
            }
        }
        report.updated.push(def.name.clone());
    }

    for name in &report.missing {
        tracing::warn!(permission = %name, "unknown permission in role definition");
    }
    tracing::info!(roles = report.updated.len(), "roles bootstrapped");
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perm(s: &str) -> PermissionId {
        s.parse().unwrap()
    }

    #[test]
    fn builtin_catalog_shapes() {
        let mut store = Store::default();
        let report = bootstrap_roles(&mut store, &builtin_roles(), "core");
        assert_eq!(report.updated, vec!["Sales Advisor", "Manager", "Administrator"]);
        assert!(report.missing.is_empty());

        let advisor = store.role_by_name("Sales Advisor").unwrap();
        assert!(advisor.permissions.contains(&perm("change_client")));
        assert!(!advisor.permissions.contains(&perm("delete_client")));
        assert!(!advisor.permissions.contains(&perm("change_reservation")));

        let manager = store.role_by_name("Manager").unwrap();
        assert_eq!(manager.permissions.len(), 32);
        assert!(!manager.permissions.contains(&perm("view_employee")));

        let admin = store.role_by_name("Administrator").unwrap();
        assert_eq!(admin.permissions.len(), 40);
        assert!(admin.permissions.contains(&perm("delete_position")));
        assert!(!admin.permissions.contains(&perm("view_role")));
    }

    #[test]
    fn rerun_replaces_instead_of_duplicating() {
        let mut store = Store::default();
        bootstrap_roles(&mut store, &builtin_roles(), "core");
        let narrowed = [RoleDefinition {
            name: "Manager".into(),
            permissions: vec!["core.view_client".into()],
        }];
        bootstrap_roles(&mut store, &narrowed, "core");
        assert_eq!(store.roles.len(), 3);
        assert_eq!(store.role_by_name("Manager").unwrap().permissions.len(), 1);
    }

    #[test]
    fn unknown_names_are_reported_sorted() {
        let mut store = Store::default();
        let defs = [RoleDefinition {
            name: "Odd".into(),
            permissions: vec!["view_yacht".into(), "view_client".into(), "billing.view_client".into()],
        }];
        let report = bootstrap_roles(&mut store, &defs, "core");
        assert_eq!(
            report.missing.into_iter().collect::<Vec<_>>(),
            vec!["billing.view_client".to_string(), "view_yacht".to_string()]
        );
        assert_eq!(store.role_by_name("Odd").unwrap().permissions.len(), 1);
    }
}
