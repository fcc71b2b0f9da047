//!
//! The back office dispatcher: resolves the caller, runs the access guard,
//! executes approved requests and records committed changes.

use crate::access::guard::AccessGuard;
use crate::access::principal::{Caller, Principal};
use crate::access::roles::{bootstrap_roles, BootstrapReport};
use crate::access::session::{SessionStore, SessionToken};
use crate::config::BackofficeConfig;
use crate::error::BackofficeError;
use crate::events::AuditEvent;
use crate::kernel::request::{Request, Response};
use crate::kernel::runtime::{CrudRuntime, ExecContext, Runtime};
use crate::store::Store;
use crate::time::{Clock, SystemClock};
use crate::types::{RecordId, ResourceKind};

/// The back office, responsible for managing state and serving requests.
#[derive(Debug)]
pub struct Backoffice<R: Runtime = CrudRuntime, C: Clock = SystemClock> {
    /// The authoritative state.
    pub store: Store,
    pub sessions: SessionStore,
    config: BackofficeConfig,
    guard: AccessGuard,
    pub(crate) runtime: R,
    clock: C,
}

impl Backoffice {
    /// An empty back office on the system clock.
    pub fn new(config: BackofficeConfig) -> Result<Self, BackofficeError> {
        Self::with_parts(Store::default(), config, CrudRuntime, SystemClock)
    }
}

impl<R: Runtime, C: Clock> Backoffice<R, C> {
    pub fn with_parts(store: Store, config: BackofficeConfig, runtime: R, clock: C) -> Result<Self, BackofficeError> {
        config.validate()?;
        Ok(Backoffice {
            store,
            sessions: SessionStore::new(),
            config,
            guard: AccessGuard,
            runtime,
            clock,
        })
    }

    pub fn config(&self) -> &BackofficeConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Installs the configured roles.
    pub fn bootstrap_roles(&mut self) -> BootstrapReport {
        bootstrap_roles(&mut self.store, &self.config.roles, &self.config.app_label)
    }

    /// Opens a session for an employee whose credentials were already checked.
    pub fn login(&mut self, employee: RecordId) -> Result<SessionToken, BackofficeError> {
        self.sessions.open(&self.store, employee)
    }

    pub fn logout(&mut self, token: &SessionToken) -> bool {
        self.sessions.close(token)
    }

    /// Resolves a session into a caller. Any resolution failure yields an
    /// anonymous caller.
    pub fn caller(&self, session: Option<&SessionToken>) -> Caller {
        let Some(token) = session else {
            return Caller::Anonymous;
        };
        match self.sessions.resolve(&self.store, token) {
            Ok(user) => Caller::User(user),
            Err(e) => {
                tracing::warn!(error = %e, "session resolution failed; treating request as anonymous");
                Caller::Anonymous
            }
        }
    }

    /// Serves a request on behalf of the session's principal.
    pub fn handle(&mut self, session: Option<&SessionToken>, request: &Request) -> Result<Response, BackofficeError> {
        let caller = self.caller(session);
        self.handle_as(&caller, request)
    }

    /// Serves a request on behalf of an already resolved principal.
    ///
    /// The guard runs first; on refusal the request is answered with a
    /// redirect and neither the store nor the runtime is touched.
    pub fn handle_as<P: Principal + ?Sized>(&mut self, principal: &P, request: &Request) -> Result<Response, BackofficeError> {
        let op = request.protected_operation();
        if let Some(route) = self.guard.check(principal, &op).redirect() {
            return Ok(Response::Redirect(route));
        }

        let ctx = ExecContext {
            now: self.clock.now(),
            actor: principal.employee_id(),
            page_size: self.config.page_size,
            app_label: &self.config.app_label,
        };
        let executed = self.runtime.execute(&mut self.store, request, &ctx)?;
        if let Some(change) = executed.change {
            tracing::info!(
                action = %change.action,
                resource = %change.resource,
                record = %change.record,
                actor = ?ctx.actor,
                "change committed"
            );
            self.store
                .audit_log
                .push(AuditEvent::new(ctx.now, ctx.actor, change.action, change.resource, change.record));
            if change.resource == ResourceKind::Employee {
                self.end_sessions_if_disabled(change.record);
            }
        }
        Ok(executed.response)
    }

    /// Drops the sessions of an employee that was deleted or deactivated.
    fn end_sessions_if_disabled(&mut self, employee: RecordId) {
        if self.store.employees.get(employee).is_some_and(|e| e.is_active) {
            return;
        }
        let closed = self.sessions.close_all(employee);
        if closed > 0 {
            tracing::info!(employee = %employee, closed, "sessions closed");
        }
    }
}
