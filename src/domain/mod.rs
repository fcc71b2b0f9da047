//! Domain entities: CRM, catalog, bookings and staff, plus the forms that
//! validate input for each of them.

pub mod booking;
pub mod catalog;
pub mod crm;
pub mod forms;
pub mod staff;

pub use booking::{Reservation, ReservationStatus};
pub use catalog::{Destination, Package, PaymentMethod, Product, ProductKind, Supplier, SupplierKind};
pub use crm::{Client, Interaction, InteractionKind};
pub use forms::Form;
pub use staff::{Employee, Position, Role};
