//! Named routes the dispatcher redirects to.

use crate::types::{RecordId, ResourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Index,
    Login,
    Logout,
    AccessDenied,
    List(ResourceKind),
    Create(ResourceKind),
    Update(ResourceKind),
    Delete(ResourceKind),
}

impl Route {
    /// Route name, namespaced per resource (`clients:client_list`).
    pub fn name(&self) -> String {
        match self {
            Route::Index => "index".to_string(),
            Route::Login => "login".to_string(),
            Route::Logout => "logout".to_string(),
            Route::AccessDenied => "access_denied".to_string(),
            Route::List(r) => format!("{}:{}_list", r.slug(), r.codename()),
            Route::Create(r) => format!("{}:{}_create", r.slug(), r.codename()),
            Route::Update(r) => format!("{}:{}_update", r.slug(), r.codename()),
            Route::Delete(r) => format!("{}:{}_delete", r.slug(), r.codename()),
        }
    }

    /// URL path; record routes need the record id.
    pub fn path(&self, id: Option<RecordId>) -> String {
        let id = id.map(|i| i.to_string()).unwrap_or_else(|| "{id}".to_string());
        match self {
            Route::Index => "/".to_string(),
            Route::Login => "/login/".to_string(),
            Route::Logout => "/logout/".to_string(),
            Route::AccessDenied => "/403/".to_string(),
            Route::List(r) => format!("/{}/", r.slug()),
            Route::Create(r) => format!("/{}/new/", r.slug()),
            Route::Update(r) => format!("/{}/{}/edit/", r.slug(), id),
            Route::Delete(r) => format!("/{}/{}/delete/", r.slug(), id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_paths() {
        assert_eq!(Route::Login.name(), "login");
        assert_eq!(Route::AccessDenied.path(None), "/403/");
        assert_eq!(Route::List(ResourceKind::Client).name(), "clients:client_list");
        assert_eq!(
            Route::Update(ResourceKind::PaymentMethod).path(Some(RecordId(3))),
            "/payment-methods/3/edit/"
        );
        assert_eq!(Route::Create(ResourceKind::Reservation).path(None), "/reservations/new/");
    }
}
