pub mod adapters;
pub mod config;
pub mod signature;

pub use adapters::{MySqlCartRepository, MySqlOrderRepository, PayOsAdapter};
pub use config::PayOsConfig;
