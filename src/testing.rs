//! Fixtures shared by unit tests, integration tests and benches.
//!
//! Only compiled for tests or with the `test-utils` feature.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::access::principal::User;
use crate::access::session::SessionToken;
use crate::config::BackofficeConfig;
use crate::domain::catalog::{Destination, Package, PaymentMethod, Product, ProductKind, Supplier, SupplierKind};
use crate::domain::crm::Client;
use crate::error::BackofficeError;
use crate::kernel::{Backoffice, CrudRuntime};
use crate::store::Store;
use crate::time::{Clock, FixedClock};
use crate::types::{Money, RecordId, ResourceKind};

/// 2026-03-02 10:00:00 UTC.
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_772_445_600, 0).unwrap_or_default()
}

/// A non-superuser principal holding exactly `perms`. Unknown names are ignored.
pub fn user_with(perms: &[&str]) -> User {
    User {
        id: RecordId(99),
        email: "fixture@agency.test".into(),
        superuser: false,
        permissions: perms.iter().filter_map(|p| p.parse().ok()).collect(),
    }
}

/// Records created by [`Agency::seed_catalog`].
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    pub client: RecordId,
    pub supplier: RecordId,
    pub cusco: RecordId,
    pub lima: RecordId,
    pub flight: RecordId,
    pub hotel: RecordId,
    /// Contains `flight` and `hotel`; final price 1500.00.
    pub package: RecordId,
    pub card: RecordId,
}

/// A back office on a fixed clock with the built-in roles and four staff accounts.
pub struct Agency {
    pub office: Backoffice<CrudRuntime, FixedClock>,
    pub clock: FixedClock,
    pub root: RecordId,
    /// Holds the Manager role.
    pub manager: RecordId,
    /// Holds the Sales Advisor role.
    pub advisor: RecordId,
    /// No roles, no permissions.
    pub clerk: RecordId,
}

impl Agency {
    pub fn new() -> Result<Self, BackofficeError> {
        Self::with_config(BackofficeConfig::default())
    }

    pub fn with_config(config: BackofficeConfig) -> Result<Self, BackofficeError> {
        let clock = FixedClock::new(fixed_now());
        let mut office = Backoffice::with_parts(Store::default(), config, CrudRuntime, clock.clone())?;
        office.bootstrap_roles();

        let now = clock.now();
        let store = &mut office.store;
        let root = store.create_superuser("root@agency.test", "Root", now)?;
        let manager = staff(store, "marta@agency.test", "Marta", Some("Manager"), now)?;
        let advisor = staff(store, "sam@agency.test", "Sam", Some("Sales Advisor"), now)?;
        let clerk = staff(store, "clerk@agency.test", "Clerk", None, now)?;
        Ok(Agency { office, clock, root, manager, advisor, clerk })
    }

    pub fn login(&mut self, employee: RecordId) -> Result<SessionToken, BackofficeError> {
        self.office.login(employee)
    }

    /// Inserts a small catalog directly, bypassing the guard and the audit log.
    pub fn seed_catalog(&mut self) -> Catalog {
        let now = self.clock.now();
        let store = &mut self.office.store;
        let client = store.clients.insert_with(|id| Client {
            id,
            name: "Ana Torres".into(),
            email: "ana@mail.test".into(),
            phone: Some("5512345678".into()),
            address: None,
            preferences: Some("Beach resorts".into()),
            registered_at: now,
        });
        let supplier = store.suppliers.insert_with(|id| Supplier {
            id,
            name: "Andes Air".into(),
            kind: SupplierKind::Airline,
            contact: "ops@andes-air.test".into(),
        });
        let cusco = destination(store, "Cusco", "Peru");
        let lima = destination(store, "Lima", "Peru");
        let flight = store.products.insert_with(|id| Product {
            id,
            name: "Lima to Cusco flight".into(),
            kind: ProductKind::Flight,
            supplier,
            destination: cusco,
            base_price: Money::from_cents(45_000),
        });
        let hotel = store.products.insert_with(|id| Product {
            id,
            name: "Miraflores hotel".into(),
            kind: ProductKind::Hotel,
            supplier,
            destination: lima,
            base_price: Money::from_cents(80_000),
        });
        let package = store.packages.insert_with(|id| Package {
            id,
            name: "Andes Explorer".into(),
            products: BTreeSet::from([flight, hotel]),
            final_price: Money::from_cents(150_000),
            active: true,
        });
        let card = store.payment_methods.insert_with(|id| PaymentMethod {
            id,
            name: "Card".into(),
            description: None,
        });
        Catalog { client, supplier, cusco, lima, flight, hotel, package, card }
    }
}

fn staff(store: &mut Store, email: &str, name: &str, role: Option<&str>, now: DateTime<Utc>) -> Result<RecordId, BackofficeError> {
    let id = store.create_user(email, name, now)?;
    if let Some(role) = role {
        let role = store
            .role_by_name(role)
            .map(|r| r.id)
            .ok_or(BackofficeError::not_found(ResourceKind::Role, RecordId(0)))?;
        store.assign_role(id, role)?;
    }
    if let Some(row) = store.employees.get_mut(id) {
        row.is_staff = true;
    }
    Ok(id)
}

fn destination(store: &mut Store, name: &str, country: &str) -> RecordId {
    store.destinations.insert_with(|id| Destination {
        id,
        name: name.into(),
        country: country.into(),
        description: None,
    })
}
