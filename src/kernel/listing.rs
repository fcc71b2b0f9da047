//! Per-resource search fields and ordering of list requests.

use std::cmp::Ordering;

use crate::domain::booking::Reservation;
use crate::domain::catalog::{Destination, Package, PaymentMethod, Product, Supplier};
use crate::domain::crm::{Client, Interaction};
use crate::domain::staff::{Employee, Position, Role};
use crate::error::BackofficeError;
use crate::kernel::request::Listing;
use crate::store::query::{matches_any, paginate};
use crate::store::{ListQuery, Page, Store, Stored};
use crate::types::{RecordId, ResourceKind};

trait Named {
    fn name(&self) -> &str;
}

macro_rules! named {
    ($($model:ty),*) => {
        $(impl Named for $model {
            fn name(&self) -> &str {
                &self.name
            }
        })*
    };
}

named!(Client, Supplier, Destination, Package, Employee);

/// Name of a referenced record, or `""` when it is gone.
fn name_of<'a, M: Stored + Named + 'a>(store: &'a Store, id: RecordId) -> &'a str {
    M::table(store).get(id).map_or("", Named::name)
}

fn select<M: Stored + Clone>(
    store: &Store,
    query: &ListQuery,
    page_size: usize,
    matches: impl Fn(&M, &str) -> bool,
    order: impl FnMut(&&M, &&M) -> Ordering,
) -> Result<Page<M>, BackofficeError> {
    let needle = query.needle();
    let mut rows: Vec<&M> = M::table(store)
        .values()
        .filter(|row| needle.as_deref().map(|n| matches(*row, n)).unwrap_or(true))
        .collect();
    rows.sort_by(order);
    paginate(rows.into_iter().cloned().collect(), query.page, page_size)
}

/// Runs a list request. Payment methods are neither searched nor paginated.
pub fn list(store: &Store, resource: ResourceKind, query: &ListQuery, page_size: usize) -> Result<Listing, BackofficeError> {
    let listing = match resource {
        ResourceKind::Client => Listing::Clients(select::<Client>(
            store,
            query,
            page_size,
            |c, n| matches_any(n, [c.name.as_str(), c.email.as_str(), c.preferences.as_deref().unwrap_or("")]),
            |a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)),
        )?),
        ResourceKind::Interaction => Listing::Interactions(select::<Interaction>(
            store,
            query,
            page_size,
            |i, n| {
                matches_any(
                    n,
                    [
                        name_of::<Client>(store, i.client),
                        name_of::<Employee>(store, i.employee),
                        i.kind.label(),
                        i.notes.as_deref().unwrap_or(""),
                    ],
                )
            },
            |a, b| b.at.cmp(&a.at).then(b.id.cmp(&a.id)),
        )?),
        ResourceKind::Supplier => Listing::Suppliers(select::<Supplier>(
            store,
            query,
            page_size,
            |s, n| matches_any(n, [s.name.as_str(), s.kind.label(), s.contact.as_str()]),
            |a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)),
        )?),
        ResourceKind::Destination => Listing::Destinations(select::<Destination>(
            store,
            query,
            page_size,
            |d, n| matches_any(n, [d.name.as_str(), d.country.as_str(), d.description.as_deref().unwrap_or("")]),
            |a, b| a.country.cmp(&b.country).then(a.name.cmp(&b.name)),
        )?),
        ResourceKind::Product => Listing::Products(select::<Product>(
            store,
            query,
            page_size,
            |p, n| {
                let destination = store.destinations.get(p.destination);
                matches_any(
                    n,
                    [
                        p.name.as_str(),
                        p.kind.label(),
                        name_of::<Supplier>(store, p.supplier),
                        destination.map_or("", |d| d.name.as_str()),
                        destination.map_or("", |d| d.country.as_str()),
                    ],
                )
            },
            |a, b| a.kind.label().cmp(b.kind.label()).then(a.name.cmp(&b.name)),
        )?),
        ResourceKind::Package => Listing::Packages(select::<Package>(
            store,
            query,
            page_size,
            |p, n| {
                p.name.to_lowercase().contains(n)
                    || p.products.iter().filter_map(|id| store.products.get(*id)).any(|product| {
                        matches_any(n, [product.name.as_str(), name_of::<Destination>(store, product.destination)])
                    })
            },
            |a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)),
        )?),
        ResourceKind::PaymentMethod => {
            let mut rows: Vec<PaymentMethod> = store.payment_methods.values().cloned().collect();
            rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            Listing::PaymentMethods(Page::single(rows))
        }
        ResourceKind::Reservation => Listing::Reservations(select::<Reservation>(
            store,
            query,
            page_size,
            |r, n| {
                matches_any(
                    n,
                    [
                        name_of::<Client>(store, r.client),
                        name_of::<Package>(store, r.package),
                        name_of::<Employee>(store, r.employee),
                        r.status.label(),
                    ],
                )
            },
            |a, b| b.booked_at.cmp(&a.booked_at).then(b.id.cmp(&a.id)),
        )?),
        ResourceKind::Employee => Listing::Employees(select::<Employee>(
            store,
            query,
            page_size,
            |e, n| matches_any(n, [e.email.as_str(), e.name.as_str()]),
            |a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)),
        )?),
        ResourceKind::Position => Listing::Positions(select::<Position>(
            store,
            query,
            page_size,
            |p, n| matches_any(n, [p.name.as_str()]),
            |a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)),
        )?),
        ResourceKind::Role => Listing::Roles(select::<Role>(
            store,
            query,
            page_size,
            |r, n| matches_any(n, [r.name.as_str()]),
            |a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)),
        )?),
    };
    tracing::debug!(resource = %resource, total = listing.total(), "listed");
    Ok(listing)
}
