//! Form input for every managed resource and the validation that turns it into a record.
//!
//! Each form implements [`ModelForm::build`], which checks the input against
//! the current store (required fields, lengths, formats, uniqueness and
//! references) and returns the record to save. All field problems are
//! collected before failing, so callers can show every message at once.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};

use crate::access::permission::{PermissionId, PermissionSet};
use crate::domain::booking::{Reservation, ReservationStatus};
use crate::domain::catalog::{
    Destination, Package, PaymentMethod, Product, ProductKind, Supplier, SupplierKind,
};
use crate::domain::crm::{Client, Interaction, InteractionKind};
use crate::domain::staff::{normalize_email, Employee, Position, Role};
use crate::error::{BackofficeError, ValidationErrors};
use crate::store::{Stored, Store};
use crate::types::{Money, RecordId, ResourceKind};

pub(crate) const REQUIRED: &str = "This field is required.";
pub(crate) const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";
const INVALID_EMAIL: &str = "Enter a valid email address.";
const INVALID_PHONE: &str = "Phone number must have exactly 10 digits.";
const NON_POSITIVE_PRICE: &str = "Price must be greater than zero.";
const PRICE_TOO_LARGE: &str = "Ensure that there are no more than 10 digits in total.";

/// What a form needs to know about the save it is validating.
pub struct BuildContext<'a, M> {
    /// Id of the record being created or edited.
    pub id: RecordId,
    /// The stored record, on update.
    pub existing: Option<&'a M>,
    pub now: DateTime<Utc>,
    /// Employee record of the acting principal.
    pub actor: Option<RecordId>,
    /// Accepted as a prefix on permission names.
    pub app_label: &'a str,
}

pub trait ModelForm {
    type Model: Stored;

    fn build(&self, store: &Store, ctx: &BuildContext<'_, Self::Model>) -> Result<Self::Model, BackofficeError>;
}

/// Input of any create/update request.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "resource", rename_all = "snake_case")]
pub enum Form {
    Client(ClientForm),
    Interaction(InteractionForm),
    Supplier(SupplierForm),
    Destination(DestinationForm),
    Product(ProductForm),
    Package(PackageForm),
    PaymentMethod(PaymentMethodForm),
    Reservation(ReservationForm),
    Employee(EmployeeForm),
    Position(PositionForm),
    Role(RoleForm),
}

impl Form {
    pub fn resource(&self) -> ResourceKind {
        match self {
            Form::Client(_) => ResourceKind::Client,
            Form::Interaction(_) => ResourceKind::Interaction,
            Form::Supplier(_) => ResourceKind::Supplier,
            Form::Destination(_) => ResourceKind::Destination,
            Form::Product(_) => ResourceKind::Product,
            Form::Package(_) => ResourceKind::Package,
            Form::PaymentMethod(_) => ResourceKind::PaymentMethod,
            Form::Reservation(_) => ResourceKind::Reservation,
            Form::Employee(_) => ResourceKind::Employee,
            Form::Position(_) => ResourceKind::Position,
            Form::Role(_) => ResourceKind::Role,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Field cleaning helpers
// ─────────────────────────────────────────────────────────────────────────────

fn required_text(errors: &mut ValidationErrors, field: &'static str, value: &str, max: usize) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else {
        check_length(errors, field, value, max);
    }
    value.to_string()
}

fn optional_text(errors: &mut ValidationErrors, field: &'static str, value: &Option<String>, max: Option<usize>) -> Option<String> {
    let value = value.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
    if let Some(max) = max {
        check_length(errors, field, value, max);
    }
    Some(value.to_string())
}

fn check_length(errors: &mut ValidationErrors, field: &'static str, value: &str, max: usize) {
    let len = value.chars().count();
    if len > max {
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters (it has {len})."),
        );
    }
}

fn required<T: Copy>(errors: &mut ValidationErrors, field: &'static str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        errors.add(field, REQUIRED);
    }
    value
}

/// Checks that a selected record exists.
fn reference<M: Stored>(errors: &mut ValidationErrors, store: &Store, field: &'static str, value: Option<RecordId>) -> Option<RecordId> {
    let id = required(errors, field, value)?;
    if M::table(store).contains(id) {
        Some(id)
    } else {
        errors.add(field, INVALID_CHOICE);
        None
    }
}

fn optional_reference<M: Stored>(errors: &mut ValidationErrors, store: &Store, field: &'static str, value: Option<RecordId>) -> Option<RecordId> {
    let id = value?;
    if M::table(store).contains(id) {
        Some(id)
    } else {
        errors.add(field, INVALID_CHOICE);
        None
    }
}

fn price(errors: &mut ValidationErrors, field: &'static str, value: Option<Money>) -> Money {
    match value {
        None => {
            errors.add(field, REQUIRED);
            Money::default()
        }
        Some(p) => {
            check_price(errors, field, p);
            p
        }
    }
}

fn check_price(errors: &mut ValidationErrors, field: &'static str, value: Money) {
    if !value.is_positive() {
        errors.add(field, NON_POSITIVE_PRICE);
    } else if value > Money::MAX {
        errors.add(field, PRICE_TOO_LARGE);
    }
}

pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

fn email(errors: &mut ValidationErrors, field: &'static str, value: &str) -> String {
    let value = required_text(errors, field, value, 254);
    if !value.is_empty() && !is_valid_email(&value) {
        errors.add(field, INVALID_EMAIL);
    }
    value
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.bytes().all(|b| b.is_ascii_digit())
}

fn phone(errors: &mut ValidationErrors, field: &'static str, value: &Option<String>) -> Option<String> {
    let phone = optional_text(errors, field, value, None)?;
    if !is_valid_phone(&phone) {
        errors.add(field, INVALID_PHONE);
    }
    Some(phone)
}

fn unique_violation(resource: ResourceKind, fields: &str) -> String {
    format!("{} with this {} already exists.", resource.label(), fields)
}

// ─────────────────────────────────────────────────────────────────────────────
// CRM
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClientForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub preferences: Option<String>,
}

impl ModelForm for ClientForm {
    type Model = Client;

    fn build(&self, store: &Store, ctx: &BuildContext<'_, Client>) -> Result<Client, BackofficeError> {
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, "name", &self.name, 100);
        let email = email(&mut errors, "email", &self.email);
        if store.clients.values().any(|c| c.id != ctx.id && c.email == email) {
            errors.add("email", unique_violation(ResourceKind::Client, "Email"));
        }
        let phone = phone(&mut errors, "phone", &self.phone);
        let address = optional_text(&mut errors, "address", &self.address, Some(255));
        let preferences = optional_text(&mut errors, "preferences", &self.preferences, None);
        errors.into_result()?;

        Ok(Client {
            id: ctx.id,
            name,
            email,
            phone,
            address,
            preferences,
            registered_at: ctx.existing.map(|c| c.registered_at).unwrap_or(ctx.now),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InteractionForm {
    pub client: Option<RecordId>,
    /// Defaults to the stored employee, then to the acting one.
    pub employee: Option<RecordId>,
    /// Defaults to the stored kind, then to a call.
    pub kind: Option<InteractionKind>,
    pub notes: Option<String>,
}

impl ModelForm for InteractionForm {
    type Model = Interaction;

    fn build(&self, store: &Store, ctx: &BuildContext<'_, Interaction>) -> Result<Interaction, BackofficeError> {
        let mut errors = ValidationErrors::new();
        let client = reference::<Client>(&mut errors, store, "client", self.client);
        let employee = self.employee.or(ctx.existing.map(|i| i.employee)).or(ctx.actor);
        let employee = reference::<Employee>(&mut errors, store, "employee", employee);
        let notes = optional_text(&mut errors, "notes", &self.notes, None);
        errors.into_result()?;

        match (client, employee) {
            (Some(client), Some(employee)) => Ok(Interaction {
                id: ctx.id,
                client,
                employee,
                kind: self.kind.or(ctx.existing.map(|i| i.kind)).unwrap_or_default(),
                at: ctx.existing.map(|i| i.at).unwrap_or(ctx.now),
                notes,
            }),
            _ => Err(BackofficeError::invalid("client", REQUIRED)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SupplierForm {
    pub name: String,
    pub kind: Option<SupplierKind>,
    pub contact: String,
}

impl ModelForm for SupplierForm {
    type Model = Supplier;

    fn build(&self, store: &Store, ctx: &BuildContext<'_, Supplier>) -> Result<Supplier, BackofficeError> {
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, "name", &self.name, 100);
        let kind = required(&mut errors, "kind", self.kind);
        let contact = required_text(&mut errors, "contact", &self.contact, 100);
        if !contact.is_empty() && store.suppliers.values().any(|s| s.id != ctx.id && s.contact == contact) {
            errors.add("contact", unique_violation(ResourceKind::Supplier, "Contact"));
        }
        errors.into_result()?;

        let kind = kind.ok_or_else(|| BackofficeError::invalid("kind", REQUIRED))?;
        Ok(Supplier { id: ctx.id, name, kind, contact })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DestinationForm {
    pub name: String,
    pub country: String,
    pub description: Option<String>,
}

impl ModelForm for DestinationForm {
    type Model = Destination;

    fn build(&self, store: &Store, ctx: &BuildContext<'_, Destination>) -> Result<Destination, BackofficeError> {
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, "name", &self.name, 100);
        let country = required_text(&mut errors, "country", &self.country, 100);
        let description = optional_text(&mut errors, "description", &self.description, None);
        if store
            .destinations
            .values()
            .any(|d| d.id != ctx.id && d.name == name && d.country == country)
        {
            errors.add("__all__", unique_violation(ResourceKind::Destination, "Name and Country"));
        }
        errors.into_result()?;

        Ok(Destination { id: ctx.id, name, country, description })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub kind: Option<ProductKind>,
    pub supplier: Option<RecordId>,
    pub destination: Option<RecordId>,
    pub base_price: Option<Money>,
}

impl ModelForm for ProductForm {
    type Model = Product;

    fn build(&self, store: &Store, ctx: &BuildContext<'_, Product>) -> Result<Product, BackofficeError> {
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, "name", &self.name, 100);
        let kind = required(&mut errors, "kind", self.kind);
        let supplier = reference::<Supplier>(&mut errors, store, "supplier", self.supplier);
        let destination = reference::<Destination>(&mut errors, store, "destination", self.destination);
        let base_price = price(&mut errors, "base_price", self.base_price);
        errors.into_result()?;

        match (kind, supplier, destination) {
            (Some(kind), Some(supplier), Some(destination)) => Ok(Product {
                id: ctx.id,
                name,
                kind,
                supplier,
                destination,
                base_price,
            }),
            _ => Err(BackofficeError::invalid("kind", REQUIRED)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PackageForm {
    pub name: String,
    pub products: Vec<RecordId>,
    pub final_price: Option<Money>,
    pub active: bool,
}

impl Default for PackageForm {
    fn default() -> Self {
        PackageForm {
            name: String::new(),
            products: Vec::new(),
            final_price: None,
            active: true,
        }
    }
}

impl ModelForm for PackageForm {
    type Model = Package;

    fn build(&self, store: &Store, ctx: &BuildContext<'_, Package>) -> Result<Package, BackofficeError> {
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, "name", &self.name, 100);
        let products: BTreeSet<RecordId> = self.products.iter().copied().collect();
        if products.is_empty() {
            errors.add("products", REQUIRED);
        } else if let Some(missing) = products.iter().find(|p| !store.products.contains(**p)) {
            errors.add(
                "products",
                format!("Select a valid choice. {missing} is not one of the available choices."),
            );
        }
        let final_price = price(&mut errors, "final_price", self.final_price);
        errors.into_result()?;

        Ok(Package { id: ctx.id, name, products, final_price, active: self.active })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PaymentMethodForm {
    pub name: String,
    pub description: Option<String>,
}

impl ModelForm for PaymentMethodForm {
    type Model = PaymentMethod;

    fn build(&self, _store: &Store, ctx: &BuildContext<'_, PaymentMethod>) -> Result<PaymentMethod, BackofficeError> {
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, "name", &self.name, 50);
        let description = optional_text(&mut errors, "description", &self.description, None);
        errors.into_result()?;

        Ok(PaymentMethod { id: ctx.id, name, description })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Booking
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReservationForm {
    pub client: Option<RecordId>,
    pub package: Option<RecordId>,
    /// Defaults to the stored employee, then to the acting one.
    pub employee: Option<RecordId>,
    pub travel_date: Option<NaiveDate>,
    /// Defaults to the stored price while the package is unchanged, then to
    /// the package's final price.
    pub sale_price: Option<Money>,
    pub payment_method: Option<RecordId>,
    /// Defaults to the stored status, then to pending.
    pub status: Option<ReservationStatus>,
}

impl ModelForm for ReservationForm {
    type Model = Reservation;

    fn build(&self, store: &Store, ctx: &BuildContext<'_, Reservation>) -> Result<Reservation, BackofficeError> {
        let mut errors = ValidationErrors::new();
        let client = reference::<Client>(&mut errors, store, "client", self.client);
        let package = reference::<Package>(&mut errors, store, "package", self.package);
        let employee = self.employee.or(ctx.existing.map(|r| r.employee)).or(ctx.actor);
        let employee = reference::<Employee>(&mut errors, store, "employee", employee);
        let payment_method = optional_reference::<PaymentMethod>(&mut errors, store, "payment_method", self.payment_method);
        let sale_price = match self.sale_price {
            Some(p) => {
                check_price(&mut errors, "sale_price", p);
                Some(p)
            }
            None => ctx
                .existing
                .filter(|r| Some(r.package) == package)
                .map(|r| r.sale_price)
                .or_else(|| package.and_then(|p| store.packages.get(p)).map(|p| p.final_price)),
        };
        errors.into_result()?;

        match (client, package, employee, sale_price) {
            (Some(client), Some(package), Some(employee), Some(sale_price)) => Ok(Reservation {
                id: ctx.id,
                client,
                package,
                employee,
                booked_at: ctx.existing.map(|r| r.booked_at).unwrap_or(ctx.now),
                travel_date: self.travel_date,
                sale_price,
                payment_method,
                status: self.status.or(ctx.existing.map(|r| r.status)).unwrap_or_default(),
            }),
            _ => Err(BackofficeError::invalid("sale_price", REQUIRED)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Staff
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EmployeeForm {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub position: Option<RecordId>,
    pub roles: Vec<RecordId>,
    pub is_active: bool,
    pub is_staff: bool,
}

impl Default for EmployeeForm {
    fn default() -> Self {
        EmployeeForm {
            email: String::new(),
            name: String::new(),
            phone: None,
            address: None,
            position: None,
            roles: Vec::new(),
            is_active: true,
            is_staff: false,
        }
    }
}

impl ModelForm for EmployeeForm {
    type Model = Employee;

    fn build(&self, store: &Store, ctx: &BuildContext<'_, Employee>) -> Result<Employee, BackofficeError> {
        let mut errors = ValidationErrors::new();
        let email = normalize_email(&email(&mut errors, "email", &self.email));
        if store.employees.values().any(|e| e.id != ctx.id && e.email == email) {
            errors.add("email", unique_violation(ResourceKind::Employee, "Email"));
        }
        let name = required_text(&mut errors, "name", &self.name, 50);
        let phone = phone(&mut errors, "phone", &self.phone);
        let address = optional_text(&mut errors, "address", &self.address, Some(255));
        let position = optional_reference::<Position>(&mut errors, store, "position", self.position);
        let roles: BTreeSet<RecordId> = self.roles.iter().copied().collect();
        if roles.iter().any(|r| !store.roles.contains(*r)) {
            errors.add("roles", INVALID_CHOICE);
        }
        errors.into_result()?;

        let existing = ctx.existing;
        Ok(Employee {
            id: ctx.id,
            email,
            name,
            phone,
            address,
            position,
            roles,
            permissions: existing.map(|e| e.permissions.clone()).unwrap_or_default(),
            is_active: self.is_active,
            is_staff: self.is_staff,
            is_superuser: existing.is_some_and(|e| e.is_superuser),
            date_joined: existing.map(|e| e.date_joined).unwrap_or(ctx.now.date_naive()),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PositionForm {
    pub name: String,
    pub description: Option<String>,
}

impl ModelForm for PositionForm {
    type Model = Position;

    fn build(&self, _store: &Store, ctx: &BuildContext<'_, Position>) -> Result<Position, BackofficeError> {
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, "name", &self.name, 100);
        let description = optional_text(&mut errors, "description", &self.description, None);
        errors.into_result()?;

        Ok(Position { id: ctx.id, name, description })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoleForm {
    pub name: String,
    /// Permission codenames (`view_client`, ...), optionally prefixed with
    /// the app label (`core.view_client`).
    pub permissions: Vec<String>,
}

impl ModelForm for RoleForm {
    type Model = Role;

    fn build(&self, store: &Store, ctx: &BuildContext<'_, Role>) -> Result<Role, BackofficeError> {
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, "name", &self.name, 150);
        if store.roles.values().any(|r| r.id != ctx.id && r.name == name) {
            errors.add("name", unique_violation(ResourceKind::Role, "Name"));
        }
        let mut permissions = PermissionSet::new();
        for code in &self.permissions {
            match PermissionId::parse_qualified(code.trim(), ctx.app_label) {
                Ok(perm) => permissions.insert(perm),
                Err(_) => errors.add(
                    "permissions",
                    format!("Select a valid choice. {code} is not one of the available choices."),
                ),
            }
        }
        errors.into_result()?;

        Ok(Role { id: ctx.id, name, permissions })
    }
}
