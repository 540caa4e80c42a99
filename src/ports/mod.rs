pub mod cart_port;
pub mod order_repository_port;
pub mod payos_port;

pub use cart_port::CartPort;
pub use order_repository_port::OrderRepositoryPort;
pub use payos_port::PayOsPort;
