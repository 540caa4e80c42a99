pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::Order;
pub use errors::{DomainError, DomainResult};
pub use value_objects::{Money, OrderStatus, PaymentMethod};
