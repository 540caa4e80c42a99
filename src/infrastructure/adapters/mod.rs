pub mod mysql_cart_repository;
pub mod mysql_order_repository;
pub mod payos_adapter;

pub use mysql_cart_repository::MySqlCartRepository;
pub use mysql_order_repository::MySqlOrderRepository;
pub use payos_adapter::PayOsAdapter;
