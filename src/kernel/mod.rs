pub mod core;
pub mod listing;
pub mod request;
pub mod runtime;


pub use self::core::Backoffice;
pub use request::{Dashboard, FormContext, Listing, Request, Response};
pub use runtime::{Change, CrudRuntime, ExecContext, Executed, Runtime};
