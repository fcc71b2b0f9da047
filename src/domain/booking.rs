//! Reservations and the package destination roll-up shown on the reservation form.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};

use crate::store::Store;
use crate::types::{Money, RecordId};

/// Placeholder shown when a package has no destinations.
pub const NO_DESTINATIONS: &str = "—";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ReservationStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub fn label(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "Pending",
            ReservationStatus::Confirmed => "Confirmed",
            ReservationStatus::Cancelled => "Cancelled",
            ReservationStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Reservation {
    pub id: RecordId,
    pub client: RecordId,
    pub package: RecordId,
    /// Employee who handled the sale.
    pub employee: RecordId,
    pub booked_at: DateTime<Utc>,
    pub travel_date: Option<NaiveDate>,
    pub sale_price: Money,
    /// Cleared when the payment method is deleted.
    pub payment_method: Option<RecordId>,
    pub status: ReservationStatus,
}

/// Distinct, non-empty destination names of a package's products, sorted.
pub fn package_destinations(store: &Store, package: RecordId) -> Vec<String> {
    let Some(pkg) = store.packages.get(package) else {
        return Vec::new();
    };
    let names: BTreeSet<&str> = pkg
        .products
        .iter()
        .filter_map(|p| store.products.get(*p))
        .filter_map(|p| store.destinations.get(p.destination))
        .map(|d| d.name.as_str())
        .filter(|n| !n.trim().is_empty())
        .collect();
    names.into_iter().map(str::to_string).collect()
}

/// Value of the read-only destinations field on the reservation form.
pub fn destinations_label(store: &Store, package: Option<RecordId>) -> String {
    let joined = package
        .map(|p| package_destinations(store, p).join(", "))
        .unwrap_or_default();
    if joined.is_empty() {
        NO_DESTINATIONS.to_string()
    } else {
        joined
    }
}

/// Package choices for the reservation form: `"<name> — <destinations>"`, ordered by name.
pub fn package_choices(store: &Store) -> Vec<(RecordId, String)> {
    let mut packages: Vec<_> = store.packages.values().collect();
    packages.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    packages
        .into_iter()
        .map(|p| {
            let destinations = package_destinations(store, p.id).join(", ");
            let label = if destinations.is_empty() {
                p.name.clone()
            } else {
                format!("{} — {}", p.name, destinations)
            };
            (p.id, label)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Destination, Package, Product, ProductKind, Supplier, SupplierKind};

    fn store_with_package(destinations: &[&str]) -> (Store, RecordId) {
        let mut store = Store::default();
        let supplier = store.suppliers.insert_with(|id| Supplier {
            id,
            name: "Aero".into(),
            kind: SupplierKind::Airline,
            contact: "ops@aero.test".into(),
        });
        let mut products = BTreeSet::new();
        for (i, name) in destinations.iter().enumerate() {
            let destination = store.destinations.insert_with(|id| Destination {
                id,
                name: name.to_string(),
                country: format!("Country {i}"),
                description: None,
            });
            products.insert(store.products.insert_with(|id| Product {
                id,
                name: format!("Item {i}"),
                kind: ProductKind::Tour,
                supplier,
                destination,
                base_price: Money::from_cents(1000),
            }));
        }
        let package = store.packages.insert_with(|id| Package {
            id,
            name: "Summer".into(),
            products,
            final_price: Money::from_cents(5000),
            active: true,
        });
        (store, package)
    }

    #[test]
    fn roll_up_is_sorted_and_distinct() {
        let (store, package) = store_with_package(&["Lima", "Cusco", "Lima", " "]);
        assert_eq!(package_destinations(&store, package), vec!["Cusco", "Lima"]);
        assert_eq!(destinations_label(&store, Some(package)), "Cusco, Lima");
        assert_eq!(package_choices(&store), vec![(package, "Summer — Cusco, Lima".to_string())]);
    }

    #[test]
    fn empty_roll_up_uses_placeholder() {
        let (store, package) = store_with_package(&[]);
        assert_eq!(destinations_label(&store, Some(package)), NO_DESTINATIONS);
        assert_eq!(destinations_label(&store, None), NO_DESTINATIONS);
        assert_eq!(destinations_label(&store, Some(RecordId(99))), NO_DESTINATIONS);
        assert_eq!(package_choices(&store), vec![(package, "Summer".to_string())]);
    }
}
