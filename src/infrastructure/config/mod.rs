pub mod payos_config;

pub use payos_config::PayOsConfig;
