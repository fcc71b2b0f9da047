//! In-memory relational store.
//!
//! One [`Table`] per resource kind plus the append-only audit log. Deletes
//! enforce the referential behaviour of each relation (cascade, set null or
//! detach from many-to-many sets). The whole store serializes to JSON.

pub mod query;
pub mod table;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::access::permission::{PermissionId, PermissionSet};
use crate::config::DEFAULT_APP_LABEL;
use crate::domain::booking::Reservation;
use crate::domain::catalog::{Destination, Package, PaymentMethod, Product, Supplier};
use crate::domain::crm::{Client, Interaction};
use crate::domain::forms::{BuildContext, EmployeeForm, ModelForm};
use crate::domain::staff::{Employee, Position, Role};
use crate::error::BackofficeError;
use crate::events::AuditEvent;
use crate::types::{RecordId, ResourceKind};

pub use query::{ListQuery, Page};
pub use table::{Keyed, Table};

/// A model stored in one of the store's tables.
pub trait Stored: Sized {
    const KIND: ResourceKind;

    fn table(store: &Store) -> &Table<Self>;
    fn table_mut(store: &mut Store) -> &mut Table<Self>;
    /// Name used in flash messages.
    fn display_name(&self) -> String;
}

macro_rules! stored {
    ($model:ty, $kind:expr, $field:ident, |$row:ident| $name:expr) => {
        impl Stored for $model {
            const KIND: ResourceKind = $kind;

            fn table(store: &Store) -> &Table<Self> {
                &store.$field
            }

            fn table_mut(store: &mut Store) -> &mut Table<Self> {
                &mut store.$field
            }

            fn display_name(&self) -> String {
                let $row = self;
                $name
            }
        }

        impl Keyed for $model {
            fn key(&self) -> RecordId {
                self.id
            }
        }
    };
}

stored!(Client, ResourceKind::Client, clients, |r| r.name.clone());
stored!(Interaction, ResourceKind::Interaction, interactions, |r| r.id.to_string());
stored!(Supplier, ResourceKind::Supplier, suppliers, |r| r.name.clone());
stored!(Destination, ResourceKind::Destination, destinations, |r| r.to_string());
stored!(Product, ResourceKind::Product, products, |r| r.name.clone());
stored!(Package, ResourceKind::Package, packages, |r| r.name.clone());
stored!(PaymentMethod, ResourceKind::PaymentMethod, payment_methods, |r| r.name.clone());
stored!(Reservation, ResourceKind::Reservation, reservations, |r| r.id.to_string());
stored!(Employee, ResourceKind::Employee, employees, |r| r.name.clone());
stored!(Position, ResourceKind::Position, positions, |r| r.name.clone());
stored!(Role, ResourceKind::Role, roles, |r| r.name.clone());

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Store {
    pub clients: Table<Client>,
    pub interactions: Table<Interaction>,
    pub suppliers: Table<Supplier>,
    pub destinations: Table<Destination>,
    pub products: Table<Product>,
    pub packages: Table<Package>,
    pub payment_methods: Table<PaymentMethod>,
    pub reservations: Table<Reservation>,
    pub employees: Table<Employee>,
    pub positions: Table<Position>,
    pub roles: Table<Role>,
    /// Append-only log of committed mutations.
    pub audit_log: Vec<AuditEvent>,
}

impl Store {
    pub fn count(&self, resource: ResourceKind) -> usize {
        match resource {
            ResourceKind::Client => self.clients.len(),
            ResourceKind::Interaction => self.interactions.len(),
            ResourceKind::Supplier => self.suppliers.len(),
            ResourceKind::Destination => self.destinations.len(),
            ResourceKind::Product => self.products.len(),
            ResourceKind::Package => self.packages.len(),
            ResourceKind::PaymentMethod => self.payment_methods.len(),
            ResourceKind::Reservation => self.reservations.len(),
            ResourceKind::Employee => self.employees.len(),
            ResourceKind::Position => self.positions.len(),
            ResourceKind::Role => self.roles.len(),
        }
    }

    pub fn contains(&self, resource: ResourceKind, id: RecordId) -> bool {
        match resource {
            ResourceKind::Client => self.clients.contains(id),
            ResourceKind::Interaction => self.interactions.contains(id),
            ResourceKind::Supplier => self.suppliers.contains(id),
            ResourceKind::Destination => self.destinations.contains(id),
            ResourceKind::Product => self.products.contains(id),
            ResourceKind::Package => self.packages.contains(id),
            ResourceKind::PaymentMethod => self.payment_methods.contains(id),
            ResourceKind::Reservation => self.reservations.contains(id),
            ResourceKind::Employee => self.employees.contains(id),
            ResourceKind::Position => self.positions.contains(id),
            ResourceKind::Role => self.roles.contains(id),
        }
    }

    /// Creates an active, non-staff employee account.
    pub fn create_user(&mut self, email: &str, name: &str, now: DateTime<Utc>) -> Result<RecordId, BackofficeError> {
        let form = EmployeeForm {
            email: email.to_string(),
            name: name.to_string(),
            ..Default::default()
        };
        let id = self.employees.next_id();
        let build = BuildContext { id, existing: None, now, actor: None, app_label: DEFAULT_APP_LABEL };
        let employee = form.build(self, &build)?;
        self.employees.insert(id, employee);
        tracing::info!(employee = %id, "employee account created");
        Ok(id)
    }

    /// Creates an account that bypasses every permission check.
    pub fn create_superuser(&mut self, email: &str, name: &str, now: DateTime<Utc>) -> Result<RecordId, BackofficeError> {
        let id = self.create_user(email, name, now)?;
        if let Some(employee) = self.employees.get_mut(id) {
            employee.is_staff = true;
            employee.is_superuser = true;
        }
        Ok(id)
    }

    /// Grants a permission directly to an employee.
    pub fn grant(&mut self, employee: RecordId, perm: PermissionId) -> Result<(), BackofficeError> {
        let row = self
            .employees
            .get_mut(employee)
            .ok_or(BackofficeError::not_found(ResourceKind::Employee, employee))?;
        row.permissions.insert(perm);
        Ok(())
    }

    pub fn assign_role(&mut self, employee: RecordId, role: RecordId) -> Result<(), BackofficeError> {
        if !self.roles.contains(role) {
            return Err(BackofficeError::not_found(ResourceKind::Role, role));
        }
        let row = self
            .employees
            .get_mut(employee)
            .ok_or(BackofficeError::not_found(ResourceKind::Employee, employee))?;
        row.roles.insert(role);
        Ok(())
    }

    pub fn role_by_name(&self, name: &str) -> Option<&Role> {
        self.roles.values().find(|r| r.name == name)
    }

    /// Direct permissions of an employee plus those of all its roles.
    pub fn effective_permissions(&self, employee: RecordId) -> Option<PermissionSet> {
        let row = self.employees.get(employee)?;
        let mut perms = row.permissions.clone();
        for role in row.roles.iter().filter_map(|r| self.roles.get(*r)) {
            perms.extend_from(&role.permissions);
        }
        Some(perms)
    }

    /// Deletes a record and applies the referential rules of its relations.
    /// Returns the record's display name.
    pub fn delete(&mut self, resource: ResourceKind, id: RecordId) -> Result<String, BackofficeError> {
        let name = match resource {
            ResourceKind::Client => self.delete_client(id),
            ResourceKind::Interaction => self.interactions.remove(id).map(|r| r.display_name()),
            ResourceKind::Supplier => self.delete_supplier(id),
            ResourceKind::Destination => self.delete_destination(id),
            ResourceKind::Product => self.delete_product(id),
            ResourceKind::Package => self.delete_package(id),
            ResourceKind::PaymentMethod => self.delete_payment_method(id),
            ResourceKind::Reservation => self.reservations.remove(id).map(|r| r.display_name()),
            ResourceKind::Employee => self.delete_employee(id),
            ResourceKind::Position => self.delete_position(id),
            ResourceKind::Role => self.delete_role(id),
        };
        name.ok_or(BackofficeError::not_found(resource, id))
    }

    fn delete_client(&mut self, id: RecordId) -> Option<String> {
        let client = self.clients.remove(id)?;
        let reservations = self.reservations.retain(|r| r.client != id);
        let interactions = self.interactions.retain(|i| i.client != id);
        tracing::debug!(client = %id, reservations = reservations.len(), interactions = interactions.len(), "cascade delete");
        Some(client.display_name())
    }

    fn delete_supplier(&mut self, id: RecordId) -> Option<String> {
        let supplier = self.suppliers.remove(id)?;
        let products = self.products.retain(|p| p.supplier != id);
        self.detach_products(&products);
        Some(supplier.display_name())
    }

    fn delete_destination(&mut self, id: RecordId) -> Option<String> {
        let destination = self.destinations.remove(id)?;
        let products = self.products.retain(|p| p.destination != id);
        self.detach_products(&products);
        Some(destination.display_name())
    }

    fn delete_product(&mut self, id: RecordId) -> Option<String> {
        let product = self.products.remove(id)?;
        self.detach_products(&[id]);
        Some(product.display_name())
    }

    fn detach_products(&mut self, products: &[RecordId]) {
        if products.is_empty() {
            return;
        }
        for package in self.packages.values_mut() {
            for product in products {
                package.products.remove(product);
            }
        }
        tracing::debug!(products = products.len(), "products detached from packages");
    }

    fn delete_package(&mut self, id: RecordId) -> Option<String> {
        let package = self.packages.remove(id)?;
        self.reservations.retain(|r| r.package != id);
        Some(package.display_name())
    }

    fn delete_payment_method(&mut self, id: RecordId) -> Option<String> {
        let method = self.payment_methods.remove(id)?;
        for reservation in self.reservations.values_mut() {
            if reservation.payment_method == Some(id) {
                reservation.payment_method = None;
            }
        }
        Some(method.display_name())
    }

    fn delete_employee(&mut self, id: RecordId) -> Option<String> {
        let employee = self.employees.remove(id)?;
        self.reservations.retain(|r| r.employee != id);
        self.interactions.retain(|i| i.employee != id);
        Some(employee.display_name())
    }

    fn delete_position(&mut self, id: RecordId) -> Option<String> {
        let position = self.positions.remove(id)?;
        for employee in self.employees.values_mut() {
            if employee.position == Some(id) {
                employee.position = None;
            }
        }
        Some(position.display_name())
    }

    fn delete_role(&mut self, id: RecordId) -> Option<String> {
        let role = self.roles.remove(id)?;
        for employee in self.employees.values_mut() {
            employee.roles.remove(&id);
        }
        Some(role.display_name())
    }

    /// Writes the store as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), BackofficeError> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        tracing::info!(path = %path.as_ref().display(), "store snapshot written");
        Ok(())
    }

    /// Reads a store previously written by [`Store::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BackofficeError> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let store = serde_json::from_reader(reader)?;
        tracing::info!(path = %path.as_ref().display(), "store snapshot loaded");
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::permission::PermissionSet;
    use crate::domain::booking::ReservationStatus;
    use crate::domain::catalog::{ProductKind, SupplierKind};
    use crate::types::Money;
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0).unwrap()
    }

    struct Fixture {
        store: Store,
        client: RecordId,
        supplier: RecordId,
        product: RecordId,
        package: RecordId,
        method: RecordId,
        employee: RecordId,
    }

    fn fixture() -> Fixture {
        let mut store = Store::default();
        let employee = store.create_user("agent@agency.test", "Agent", now()).unwrap();
        let client = store.clients.insert_with(|id| Client {
            id,
            name: "Ana".into(),
            email: "ana@mail.test".into(),
            phone: None,
            address: None,
            preferences: None,
            registered_at: now(),
        });
        let supplier = store.suppliers.insert_with(|id| Supplier {
            id,
            name: "Aero".into(),
            kind: SupplierKind::Airline,
            contact: "ops@aero.test".into(),
        });
        let destination = store.destinations.insert_with(|id| Destination {
            id,
            name: "Cusco".into(),
            country: "Peru".into(),
            description: None,
        });
        let product = store.products.insert_with(|id| Product {
            id,
            name: "Flight".into(),
            kind: ProductKind::Flight,
            supplier,
            destination,
            base_price: Money::from_cents(10_000),
        });
        let package = store.packages.insert_with(|id| Package {
            id,
            name: "Andes".into(),
            products: BTreeSet::from([product]),
            final_price: Money::from_cents(20_000),
            active: true,
        });
        let method = store.payment_methods.insert_with(|id| PaymentMethod {
            id,
            name: "Card".into(),
            description: None,
        });
        store.reservations.insert_with(|id| Reservation {
            id,
            client,
            package,
            employee,
            booked_at: now(),
            travel_date: None,
            sale_price: Money::from_cents(20_000),
            payment_method: Some(method),
            status: ReservationStatus::Pending,
        });
        store.interactions.insert_with(|id| Interaction {
            id,
            client,
            employee,
            kind: Default::default(),
            at: now(),
            notes: None,
        });
        Fixture { store, client, supplier, product, package, method, employee }
    }

    #[test]
    fn deleting_client_cascades() {
        let mut f = fixture();
        assert_eq!(f.store.delete(ResourceKind::Client, f.client).unwrap(), "Ana");
        assert!(f.store.reservations.is_empty());
        assert!(f.store.interactions.is_empty());
        assert_eq!(f.store.packages.len(), 1);
    }

    #[test]
    fn deleting_supplier_removes_products_from_packages() {
        let mut f = fixture();
        f.store.delete(ResourceKind::Supplier, f.supplier).unwrap();
        assert!(!f.store.products.contains(f.product));
        assert!(f.store.packages.get(f.package).unwrap().products.is_empty());
    }

    #[test]
    fn deleting_destination_removes_its_products() {
        let mut f = fixture();
        let destination = f.store.products.get(f.product).unwrap().destination;
        assert_eq!(f.store.delete(ResourceKind::Destination, destination).unwrap(), "Cusco, Peru");
        assert!(f.store.products.is_empty());
        assert!(f.store.packages.get(f.package).unwrap().products.is_empty());
        assert_eq!(f.store.suppliers.len(), 1);
    }

    #[test]
    fn deleting_product_detaches_it_from_packages() {
        let mut f = fixture();
        f.store.delete(ResourceKind::Product, f.product).unwrap();
        let package = f.store.packages.get(f.package).unwrap();
        assert!(!package.products.contains(&f.product));
        assert_eq!(f.store.reservations.len(), 1);
    }

    #[test]
    fn deleting_package_cascades_to_reservations() {
        let mut f = fixture();
        f.store.delete(ResourceKind::Package, f.package).unwrap();
        assert!(f.store.reservations.is_empty());
        assert_eq!(f.store.clients.len(), 1);
        assert!(f.store.products.contains(f.product));
    }

    #[test]
    fn deleting_position_clears_employees() {
        let mut f = fixture();
        let position = f.store.positions.insert_with(|id| Position {
            id,
            name: "Agent".into(),
            description: None,
        });
        f.store.employees.get_mut(f.employee).unwrap().position = Some(position);
        f.store.delete(ResourceKind::Position, position).unwrap();
        let employee = f.store.employees.get(f.employee).unwrap();
        assert_eq!(employee.position, None);
    }

    #[test]
    fn deleting_payment_method_clears_reservations() {
        let mut f = fixture();
        f.store.delete(ResourceKind::PaymentMethod, f.method).unwrap();
        assert_eq!(f.store.reservations.len(), 1);
        assert!(f.store.reservations.values().all(|r| r.payment_method.is_none()));
    }

    #[test]
    fn deleting_employee_cascades_their_work() {
        let mut f = fixture();
        f.store.delete(ResourceKind::Employee, f.employee).unwrap();
        assert!(f.store.reservations.is_empty());
        assert!(f.store.interactions.is_empty());
    }

    #[test]
    fn deleting_missing_record_is_not_found() {
        let mut f = fixture();
        let err = f.store.delete(ResourceKind::Package, RecordId(99)).unwrap_err();
        assert!(matches!(err, BackofficeError::NotFound { resource: ResourceKind::Package, .. }));
    }

    #[test]
    fn effective_permissions_union_roles_and_direct_grants() {
        let mut f = fixture();
        let role = f.store.roles.insert_with(|id| Role {
            id,
            name: "Viewer".into(),
            permissions: ["view_client".parse::<PermissionId>().unwrap()].into_iter().collect(),
        });
        f.store.assign_role(f.employee, role).unwrap();
        f.store.grant(f.employee, "add_client".parse().unwrap()).unwrap();
        let perms = f.store.effective_permissions(f.employee).unwrap();
        let expected: PermissionSet = ["view_client", "add_client"]
            .iter()
            .map(|p| p.parse::<PermissionId>().unwrap())
            .collect();
        assert_eq!(perms, expected);

        f.store.delete(ResourceKind::Role, role).unwrap();
        assert_eq!(f.store.effective_permissions(f.employee).unwrap().len(), 1);
    }

    #[test]
    fn superuser_and_duplicate_email() {
        let mut store = Store::default();
        let root = store.create_superuser("Root@Agency.TEST", "Root", now()).unwrap();
        let row = store.employees.get(root).unwrap();
        assert!(row.is_superuser && row.is_staff && row.is_active);
        assert_eq!(row.email, "Root@agency.test");
        assert!(matches!(
            store.create_user("Root@agency.test", "Again", now()),
            Err(BackofficeError::Validation(_))
        ));
        assert!(matches!(store.create_user("", "Nobody", now()), Err(BackofficeError::Validation(_))));
    }

    #[test]
    fn snapshot_round_trip() {
        let f = fixture();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        f.store.save(&path).unwrap();
        let loaded = Store::load(&path).unwrap();
        assert_eq!(loaded, f.store);
        assert_eq!(loaded.clients.next_id(), f.store.clients.next_id());
    }

    #[test]
    fn loaded_sequence_never_reuses_ids() {
        let f = fixture();
        let mut json = serde_json::to_value(&f.store).unwrap();
        json["clients"]["next_id"] = serde_json::json!(1);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, json.to_string()).unwrap();

        let mut loaded = Store::load(&path).unwrap();
        let id = loaded.clients.insert_with(|id| Client {
            id,
            name: "New".into(),
            email: "new@mail.test".into(),
            phone: None,
            address: None,
            preferences: None,
            registered_at: now(),
        });
        assert_ne!(id, f.client);
        assert_eq!(loaded.clients.get(f.client).unwrap().name, "Ana");
    }

    #[test]
    fn loading_rows_under_foreign_ids_fails() {
        let f = fixture();
        let mut json = serde_json::to_value(&f.store).unwrap();
        json["clients"]["rows"]["1"]["id"] = serde_json::json!(7);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, json.to_string()).unwrap();
        assert!(matches!(Store::load(&path), Err(BackofficeError::Snapshot(_))));
    }

    #[test]
    fn loading_garbage_is_a_snapshot_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, b"{not json").unwrap();
        assert!(matches!(Store::load(&path), Err(BackofficeError::Snapshot(_))));
        assert!(matches!(Store::load(dir.path().join("missing.json")), Err(BackofficeError::Io(_))));
    }
}
