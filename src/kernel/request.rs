//! Requests the back office serves and the responses it produces.

use crate::access::guard::ProtectedOperation;
use crate::domain::booking::Reservation;
use crate::domain::catalog::{Destination, Package, PaymentMethod, Product, Supplier};
use crate::domain::crm::{Client, Interaction};
use crate::domain::forms::Form;
use crate::domain::staff::{Employee, Position, Role};
use crate::routes::Route;
use crate::store::{ListQuery, Page};
use crate::types::{Action, RecordId, ResourceKind};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// The landing page.
    Dashboard,
    List {
        resource: ResourceKind,
        #[serde(default)]
        query: ListQuery,
    },
    /// Display an empty create form (`id: None`) or an edit form.
    Prepare {
        resource: ResourceKind,
        id: Option<RecordId>,
    },
    Create(Form),
    Update {
        id: RecordId,
        form: Form,
    },
    Delete {
        resource: ResourceKind,
        id: RecordId,
    },
}

impl Request {
    pub fn list(resource: ResourceKind) -> Self {
        Request::List { resource, query: ListQuery::default() }
    }

    pub fn resource(&self) -> Option<ResourceKind> {
        match self {
            Request::Dashboard => None,
            Request::List { resource, .. }
            | Request::Prepare { resource, .. }
            | Request::Delete { resource, .. } => Some(*resource),
            Request::Create(form) | Request::Update { form, .. } => Some(form.resource()),
        }
    }

    /// The route serving this request and the one permission it requires.
    pub fn protected_operation(&self) -> ProtectedOperation {
        match self {
            Request::Dashboard => ProtectedOperation::open(Route::Index),
            Request::List { resource, .. } => ProtectedOperation::crud(*resource, Action::View),
            Request::Prepare { resource, id: None } => ProtectedOperation::crud(*resource, Action::Add),
            Request::Prepare { resource, id: Some(_) } => ProtectedOperation::crud(*resource, Action::Change),
            Request::Create(form) => ProtectedOperation::crud(form.resource(), Action::Add),
            Request::Update { form, .. } => ProtectedOperation::crud(form.resource(), Action::Change),
            Request::Delete { resource, .. } => ProtectedOperation::crud(*resource, Action::Delete),
        }
    }
}

/// Record counts shown on the dashboard, in [`ResourceKind::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub counts: Vec<(ResourceKind, usize)>,
}

impl Dashboard {
    pub fn count(&self, resource: ResourceKind) -> usize {
        self.counts
            .iter()
            .find(|(r, _)| *r == resource)
            .map_or(0, |(_, n)| *n)
    }
}

/// One page of one resource's list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Clients(Page<Client>),
    Interactions(Page<Interaction>),
    Suppliers(Page<Supplier>),
    Destinations(Page<Destination>),
    Products(Page<Product>),
    Packages(Page<Package>),
    PaymentMethods(Page<PaymentMethod>),
    Reservations(Page<Reservation>),
    Employees(Page<Employee>),
    Positions(Page<Position>),
    Roles(Page<Role>),
}

impl Listing {
    pub fn total(&self) -> usize {
        match self {
            Listing::Clients(p) => p.total,
            Listing::Interactions(p) => p.total,
            Listing::Suppliers(p) => p.total,
            Listing::Destinations(p) => p.total,
            Listing::Products(p) => p.total,
            Listing::Packages(p) => p.total,
            Listing::PaymentMethods(p) => p.total,
            Listing::Reservations(p) => p.total,
            Listing::Employees(p) => p.total,
            Listing::Positions(p) => p.total,
            Listing::Roles(p) => p.total,
        }
    }

    /// Ids of the rows on this page, in display order.
    pub fn ids(&self) -> Vec<RecordId> {
        fn ids<T>(page: &Page<T>, id: impl Fn(&T) -> RecordId) -> Vec<RecordId> {
            page.items.iter().map(id).collect()
        }
        match self {
            Listing::Clients(p) => ids(p, |r| r.id),
            Listing::Interactions(p) => ids(p, |r| r.id),
            Listing::Suppliers(p) => ids(p, |r| r.id),
            Listing::Destinations(p) => ids(p, |r| r.id),
            Listing::Products(p) => ids(p, |r| r.id),
            Listing::Packages(p) => ids(p, |r| r.id),
            Listing::PaymentMethods(p) => ids(p, |r| r.id),
            Listing::Reservations(p) => ids(p, |r| r.id),
            Listing::Employees(p) => ids(p, |r| r.id),
            Listing::Positions(p) => ids(p, |r| r.id),
            Listing::Roles(p) => ids(p, |r| r.id),
        }
    }
}

/// Everything needed to render a create or edit form besides the record itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormContext {
    pub resource: ResourceKind,
    /// Record being edited, `None` on create.
    pub record: Option<RecordId>,
    pub page_title: String,
    pub submit_label: String,
    pub cancel: Route,
    /// Reservation form only: packages labelled with their destinations.
    pub package_choices: Vec<(RecordId, String)>,
    /// Reservation form only: read-only destinations of the selected package.
    pub destinations: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The guard refused the request.
    Redirect(Route),
    Dashboard(Dashboard),
    Listing(Listing),
    Form(FormContext),
    Saved {
        id: RecordId,
        message: String,
        redirect: Route,
    },
    Deleted {
        message: String,
        redirect: Route,
    },
}

impl Response {
    pub fn redirect(&self) -> Option<Route> {
        match self {
            Response::Redirect(route)
            | Response::Saved { redirect: route, .. }
            | Response::Deleted { redirect: route, .. } => Some(*route),
            _ => None,
        }
    }

    /// The flash message of a successful mutation.
    pub fn message(&self) -> Option<&str> {
        match self {
            Response::Saved { message, .. } | Response::Deleted { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forms::ClientForm;

    #[test]
    fn every_request_maps_to_one_operation() {
        let op = Request::Prepare { resource: ResourceKind::Package, id: Some(RecordId(3)) }.protected_operation();
        assert_eq!(op.required.unwrap().to_string(), "change_package");
        assert_eq!(op.route, Route::Update(ResourceKind::Package));

        let op = Request::Prepare { resource: ResourceKind::Package, id: None }.protected_operation();
        assert_eq!(op.required.unwrap().to_string(), "add_package");

        let op = Request::Create(Form::Client(ClientForm::default())).protected_operation();
        assert_eq!(op.required.unwrap().to_string(), "add_client");

        assert_eq!(Request::Dashboard.protected_operation().required, None);
        assert_eq!(
            Request::list(ResourceKind::PaymentMethod).protected_operation().required.unwrap().to_string(),
            "view_paymentmethod"
        );
    }

    #[test]
    fn requests_deserialize_from_json() {
        let req: Request = serde_json::from_str(r#"{"op": "delete", "resource": "client", "id": 4}"#).unwrap();
        assert_eq!(req, Request::Delete { resource: ResourceKind::Client, id: RecordId(4) });

        let req: Request = serde_json::from_str(r#"{"op": "list", "resource": "package"}"#).unwrap();
        assert_eq!(req, Request::list(ResourceKind::Package));
    }
}
