//! Kernel runtime abstraction.
//!
//! A `Runtime` executes a request the guard has already approved against the
//! store and reports the response plus the committed change, if any. The
//! dispatcher in [`crate::kernel::core`] stays generic over it so tests can
//! observe exactly when, and whether, a runtime is reached.

use chrono::{DateTime, Utc};

use crate::domain::booking::{destinations_label, package_choices, NO_DESTINATIONS};
use crate::domain::forms::{BuildContext, Form, ModelForm};
use crate::error::BackofficeError;
use crate::kernel::listing;
use crate::kernel::request::{Dashboard, FormContext, Request, Response};
use crate::routes::Route;
use crate::store::{Store, Stored};
use crate::types::{Action, RecordId, ResourceKind};

/// Per-request inputs a runtime needs besides the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecContext<'a> {
    pub now: DateTime<Utc>,
    /// Employee record of the acting principal.
    pub actor: Option<RecordId>,
    pub page_size: usize,
    pub app_label: &'a str,
}

/// A committed mutation, recorded in the audit log by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub action: Action,
    pub resource: ResourceKind,
    pub record: RecordId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executed {
    pub response: Response,
    pub change: Option<Change>,
}

impl Executed {
    fn read(response: Response) -> Self {
        Executed { response, change: None }
    }
}

/// Trait implemented by pluggable runtimes.
///
/// `execute` is only called for requests the guard approved. It must leave the
/// store untouched when it returns an error.
pub trait Runtime: Send + Sync + 'static {
    fn execute(&self, store: &mut Store, request: &Request, ctx: &ExecContext<'_>) -> Result<Executed, BackofficeError>;
}

/// The CRUD runtime backing every resource.
#[derive(Default, Debug, Clone)]
pub struct CrudRuntime;

impl Runtime for CrudRuntime {
    fn execute(&self, store: &mut Store, request: &Request, ctx: &ExecContext<'_>) -> Result<Executed, BackofficeError> {
        match request {
            Request::Dashboard => Ok(Executed::read(Response::Dashboard(dashboard(store)))),
            Request::List { resource, query } => {
                let listing = listing::list(store, *resource, query, ctx.page_size)?;
                Ok(Executed::read(Response::Listing(listing)))
            }
            Request::Prepare { resource, id } => Ok(Executed::read(Response::Form(prepare(store, *resource, *id)?))),
            Request::Create(form) => {
                let id = save(store, form, None, ctx)?;
                Ok(saved(form.resource(), Action::Add, id, "created successfully"))
            }
            Request::Update { id, form } => {
                let id = save(store, form, Some(*id), ctx)?;
                Ok(saved(form.resource(), Action::Change, id, "updated"))
            }
            Request::Delete { resource, id } => {
                let name = store.delete(*resource, *id)?;
                Ok(Executed {
                    response: Response::Deleted {
                        message: format!("{} {} deleted successfully.", resource.label(), name),
                        redirect: Route::List(*resource),
                    },
                    change: Some(Change { action: Action::Delete, resource: *resource, record: *id }),
                })
            }
        }
    }
}

fn saved(resource: ResourceKind, action: Action, id: RecordId, verb: &str) -> Executed {
    Executed {
        response: Response::Saved {
            id,
            message: format!("{} {}.", resource.label(), verb),
            redirect: Route::List(resource),
        },
        change: Some(Change { action, resource, record: id }),
    }
}

fn dashboard(store: &Store) -> Dashboard {
    Dashboard {
        counts: ResourceKind::ALL.into_iter().map(|r| (r, store.count(r))).collect(),
    }
}

fn prepare(store: &Store, resource: ResourceKind, id: Option<RecordId>) -> Result<FormContext, BackofficeError> {
    if let Some(id) = id {
        if !store.contains(resource, id) {
            return Err(BackofficeError::not_found(resource, id));
        }
    }
    let label = resource.label();
    let (page_title, submit_label) = match id {
        None => (format!("New {label}"), format!("Create {}", label.to_lowercase())),
        Some(_) => (format!("Edit {label}"), "Save changes".to_string()),
    };
    let (package_choices, destinations) = if resource == ResourceKind::Reservation {
        let package = id.and_then(|id| store.reservations.get(id)).map(|r| r.package);
        let destinations = match package {
            Some(_) => destinations_label(store, package),
            None => NO_DESTINATIONS.to_string(),
        };
        (package_choices(store), Some(destinations))
    } else {
        (Vec::new(), None)
    };
    Ok(FormContext {
        resource,
        record: id,
        page_title,
        submit_label,
        cancel: Route::List(resource),
        package_choices,
        destinations,
    })
}

/// Validates `form` and writes the record: inserted under a fresh id when
/// `id` is `None`, replaced in place otherwise.
fn persist<F: ModelForm>(store: &mut Store, form: &F, id: Option<RecordId>, ctx: &ExecContext<'_>) -> Result<RecordId, BackofficeError> {
    let (id, model) = match id {
        None => {
            let id = <F::Model as Stored>::table(store).next_id();
            let build = BuildContext { id, existing: None, now: ctx.now, actor: ctx.actor, app_label: ctx.app_label };
            (id, form.build(store, &build)?)
        }
        Some(id) => {
            let existing = <F::Model as Stored>::table(store)
                .get(id)
                .ok_or(BackofficeError::not_found(<F::Model as Stored>::KIND, id))?;
            let build = BuildContext {
                id,
                existing: Some(existing),
                now: ctx.now,
                actor: ctx.actor,
                app_label: ctx.app_label,
            };
            (id, form.build(store, &build)?)
        }
    };
    <F::Model as Stored>::table_mut(store).insert(id, model);
    Ok(id)
}

fn save(store: &mut Store, form: &Form, id: Option<RecordId>, ctx: &ExecContext<'_>) -> Result<RecordId, BackofficeError> {
    match form {
        Form::Client(f) => persist(store, f, id, ctx),
        Form::Interaction(f) => persist(store, f, id, ctx),
        Form::Supplier(f) => persist(store, f, id, ctx),
        Form::Destination(f) => persist(store, f, id, ctx),
        Form::Product(f) => persist(store, f, id, ctx),
        Form::Package(f) => persist(store, f, id, ctx),
        Form::PaymentMethod(f) => persist(store, f, id, ctx),
        Form::Reservation(f) => persist(store, f, id, ctx),
        Form::Employee(f) => persist(store, f, id, ctx),
        Form::Position(f) => persist(store, f, id, ctx),
        Form::Role(f) => persist(store, f, id, ctx),
    }
}
